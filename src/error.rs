use thiserror::Error;

#[derive(Error, Debug)]
pub enum CustosError {
    #[error("record '{0}' not found")]
    RecordNotFound(String),

    #[error("title of '{0}' is immutable once set")]
    TitleImmutable(String),

    #[error("remote issue '{0}' has no number")]
    MissingIssueNumber(String),

    #[error("{op} '{title}': {method} request failed: {source}")]
    Transport {
        op: &'static str,
        title: String,
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op} '{title}': {method} returned {status}, expected {expected}")]
    UnexpectedStatus {
        op: &'static str,
        title: String,
        method: String,
        status: u16,
        expected: u16,
    },

    #[error("failed to persist '{name}': {reason}")]
    Persistence { name: String, reason: String },

    #[error("reconcile failed for {0} record(s)")]
    ReconcileFailed(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("invalid issue state '{0}'")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, CustosError>;
