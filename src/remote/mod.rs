//! Remote issue gateway.
//!
//! This module models the external tracker's view of an issue and defines
//! the narrow interface the reconciler uses to talk to it: look up by
//! title, create, edit-if-needed, close. The real implementation lives in
//! [`github`]; tests substitute recording fakes.

pub mod github;

pub use github::GithubGateway;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::record::DesiredIssue;
use crate::types::IssueState;

/// The remote tracker's representation of an issue, field names matching
/// the GitHub wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub title: String,

    /// Issue body text ("description" on the desired record). GitHub
    /// reports `null` for issues created without one.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub body: String,

    /// Remote-assigned identifier; present only once created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,

    #[serde(default)]
    pub state: IssueState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn null_to_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Result of a find-by-title lookup. Used within a single reconciliation
/// pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueLookup {
    Found(RemoteIssue),
    Missing,
}

impl IssueLookup {
    pub fn found(&self) -> Option<&RemoteIssue> {
        match self {
            IssueLookup::Found(issue) => Some(issue),
            IssueLookup::Missing => None,
        }
    }
}

/// The four operations the reconciler needs from the remote tracker.
///
/// Implementations translate transport and status-code failures into the
/// crate error type; they never panic on a failed request.
pub trait RemoteIssues: Send + Sync {
    /// Fetch the full issue list (all states) and return the first issue
    /// whose title exactly equals `title`.
    fn find_by_title(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = Result<IssueLookup>> + Send;

    /// Create a new issue from the desired record's title and description.
    fn create(
        &self,
        desired: &DesiredIssue,
    ) -> impl std::future::Future<Output = Result<RemoteIssue>> + Send;

    /// Patch `current` to match `desired`, forcing the issue open. A no-op
    /// returning `current` unchanged when nothing differs.
    fn edit_if_needed(
        &self,
        desired: &DesiredIssue,
        current: RemoteIssue,
    ) -> impl std::future::Future<Output = Result<RemoteIssue>> + Send;

    /// Close the issue on the remote tracker.
    fn close(
        &self,
        current: &RemoteIssue,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
