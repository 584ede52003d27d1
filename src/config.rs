//! Configuration handling for the reconciler.
//!
//! Configuration is stored in `.custos/config.yaml` and includes:
//! - The GitHub repository the issues live in (owner + repo)
//! - The API base URL (overridable for GitHub Enterprise or tests)
//! - The HTTP timeout applied to every gateway request
//! - The authentication token (environment variable takes precedence)

use std::env;
use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{CustosError, Result};
use crate::types::STORE_DIR;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for remote API requests, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Authentication tokens
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Config {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            auth: AuthConfig::default(),
        }
    }

    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(STORE_DIR).join("config.yaml")
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Err(CustosError::Config(format!(
                "no configuration found at {}. Run: custos init <owner> <repo>",
                path.display()
            )));
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get the GitHub token from the environment or the config file.
    ///
    /// The value is wrapped so it never appears in debug output; it is
    /// injected into the gateway at construction rather than read ad hoc
    /// inside request-building code.
    pub fn github_token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var("GITHUB_TOKEN")
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }

        self.auth
            .token
            .as_ref()
            .map(|t| SecretString::from(t.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = Config::new("octo", "widgets");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let mut config = Config::new("octo", "widgets");
        config.auth.token = Some("ghp_test123".to_string());
        config.timeout_secs = 5;

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(parsed.owner, "octo");
        assert_eq!(parsed.repo, "widgets");
        assert_eq!(parsed.timeout_secs, 5);
        assert_eq!(parsed.auth.token, Some("ghp_test123".to_string()));
    }

    #[test]
    fn test_config_defaults_filled_on_parse() {
        let yaml = "owner: octo\nrepo: widgets\n";
        let parsed: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(parsed.api_url, DEFAULT_API_URL);
        assert_eq!(parsed.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_env_token_takes_precedence() {
        let mut config = Config::new("octo", "widgets");
        config.auth.token = Some("from-file".to_string());

        unsafe { env::set_var("GITHUB_TOKEN", "from-env") };
        let token = config.github_token().unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        unsafe { env::remove_var("GITHUB_TOKEN") };
        let token = config.github_token().unwrap();
        assert_eq!(token.expose_secret(), "from-file");
    }

    #[test]
    #[serial]
    fn test_no_token_configured() {
        unsafe { env::remove_var("GITHUB_TOKEN") };
        let config = Config::new("octo", "widgets");
        assert!(config.github_token().is_none());
    }
}
