//! GitHub Issues gateway over the REST API.
//!
//! All four operations go through one transport primitive: build the
//! request with the injected bearer credential, send it, and treat the
//! response as success only when its status matches the operation's
//! contract. Anything else comes back as a typed, retryable error carrying
//! the operation name, the issue title and the HTTP method, so the caller
//! can log it without re-wrapping.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::Config;
use crate::error::{CustosError, Result};
use crate::record::DesiredIssue;
use crate::sync::needs_edit;
use crate::types::IssueState;

use super::{IssueLookup, RemoteIssue, RemoteIssues};

const USER_AGENT: &str = concat!("custos/", env!("CARGO_PKG_VERSION"));

/// Creation request body: `POST .../issues`.
#[derive(Debug, Serialize)]
struct CreatePayload<'a> {
    title: &'a str,
    body: &'a str,
}

/// Edit/close request body: `PATCH .../issues/{number}`.
#[derive(Debug, Serialize)]
struct EditPayload<'a> {
    title: &'a str,
    body: &'a str,
    state: IssueState,
}

/// Stateless GitHub gateway for a single repository.
pub struct GithubGateway {
    client: Client,
    token: SecretString,
    issues_url: String,
}

impl GithubGateway {
    /// Build a gateway from configuration. Fails if no credential is
    /// configured or the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.github_token().ok_or_else(|| {
            CustosError::Auth(
                "GitHub token not configured. Set GITHUB_TOKEN or add auth.token to .custos/config.yaml".to_string(),
            )
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CustosError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            issues_url: issues_url(&config.api_url, &config.owner, &config.repo),
        })
    }

    fn issue_url(&self, number: u64) -> String {
        format!("{}/{}", self.issues_url, number)
    }

    /// Shared transport primitive: send one request, succeed only on the
    /// expected status.
    async fn send<T: Serialize>(
        &self,
        op: &'static str,
        title: &str,
        method: Method,
        url: String,
        payload: Option<&T>,
        expected: StatusCode,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.request(method.clone(), &url).header(
            header::AUTHORIZATION,
            format!("token {}", self.token.expose_secret()),
        );
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|source| CustosError::Transport {
            op,
            title: title.to_string(),
            method: method.to_string(),
            source,
        })?;

        if response.status() != expected {
            return Err(CustosError::UnexpectedStatus {
                op,
                title: title.to_string(),
                method: method.to_string(),
                status: response.status().as_u16(),
                expected: expected.as_u16(),
            });
        }

        Ok(response)
    }
}

impl RemoteIssues for GithubGateway {
    async fn find_by_title(&self, title: &str) -> Result<IssueLookup> {
        let url = format!("{}?state=all", self.issues_url);
        let response = self
            .send::<()>("list issues", title, Method::GET, url, None, StatusCode::OK)
            .await?;
        let issues: Vec<RemoteIssue> = response.json().await?;

        Ok(match first_title_match(issues, title) {
            Some(issue) => IssueLookup::Found(issue),
            None => IssueLookup::Missing,
        })
    }

    async fn create(&self, desired: &DesiredIssue) -> Result<RemoteIssue> {
        let payload = CreatePayload {
            title: &desired.title,
            body: &desired.description,
        };
        let response = self
            .send(
                "create issue",
                &desired.title,
                Method::POST,
                self.issues_url.clone(),
                Some(&payload),
                StatusCode::CREATED,
            )
            .await?;

        let created: RemoteIssue = response.json().await?;
        tracing::info!(title = %desired.title, number = ?created.number, "created remote issue");
        Ok(created)
    }

    async fn edit_if_needed(
        &self,
        desired: &DesiredIssue,
        current: RemoteIssue,
    ) -> Result<RemoteIssue> {
        if !needs_edit(desired, &current) {
            return Ok(current);
        }

        let number = current
            .number
            .ok_or_else(|| CustosError::MissingIssueNumber(current.title.clone()))?;

        // Every edit forces the issue open; this doubles as the re-open
        // path for issues closed outside this system.
        let payload = EditPayload {
            title: &desired.title,
            body: &desired.description,
            state: IssueState::Open,
        };
        let response = self
            .send(
                "edit issue",
                &desired.title,
                Method::PATCH,
                self.issue_url(number),
                Some(&payload),
                StatusCode::OK,
            )
            .await?;

        let updated: RemoteIssue = response.json().await?;
        tracing::info!(title = %desired.title, number, "edited remote issue");
        Ok(updated)
    }

    async fn close(&self, current: &RemoteIssue) -> Result<()> {
        let number = current
            .number
            .ok_or_else(|| CustosError::MissingIssueNumber(current.title.clone()))?;

        let payload = EditPayload {
            title: &current.title,
            body: &current.body,
            state: IssueState::Closed,
        };
        self.send(
            "close issue",
            &current.title,
            Method::PATCH,
            self.issue_url(number),
            Some(&payload),
            StatusCode::OK,
        )
        .await?;

        tracing::info!(title = %current.title, number, "closed remote issue");
        Ok(())
    }
}

/// Exact-title scan over a listing. The first listed issue wins when
/// titles collide, but the collision is surfaced in the log.
fn first_title_match(issues: Vec<RemoteIssue>, title: &str) -> Option<RemoteIssue> {
    let mut matches = issues.into_iter().filter(|issue| issue.title == title);
    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
        tracing::warn!(title, "multiple remote issues share this title; using the first");
    }
    first
}

fn issues_url(api_url: &str, owner: &str, repo: &str) -> String {
    format!("{}/repos/{}/{}/issues", api_url.trim_end_matches('/'), owner, repo)
}
