//! Desired-state records.
//!
//! A `DesiredIssue` declares the issue an external owner wants to exist on
//! the remote tracker. The reconciler reads the spec fields (`title`,
//! `description`) and writes back only the finalizer list and the status
//! sub-record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::types::IssueState;

/// A declarative issue record, stored as YAML by the file store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredIssue {
    /// Identity key within the local store.
    pub name: String,

    /// Desired issue title. Immutable once set: it is the sole matching
    /// key against remote issues.
    pub title: String,

    /// Desired issue body text.
    #[serde(default)]
    pub description: String,

    /// Set when deletion has been requested; the record is only removed
    /// from storage once its finalizers are gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<Timestamp>,

    /// Guard tokens blocking removal until external cleanup completes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,

    /// Last observed remote state, written after a successful mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
}

/// Cache of the last known remote state. Informational only; nothing in
/// the reconciler reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub state: IssueState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl DesiredIssue {
    pub fn new(name: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            deletion_timestamp: None,
            finalizers: Vec::new(),
            status: None,
        }
    }

    /// Whether the external owner has asked for this record to go away.
    pub fn deletion_requested(&self) -> bool {
        self.deletion_timestamp.is_some()
    }

    pub fn has_finalizer(&self, token: &str) -> bool {
        self.finalizers.iter().any(|f| f == token)
    }

    /// Adds the token if not already present.
    pub fn add_finalizer(&mut self, token: &str) {
        if !self.has_finalizer(token) {
            self.finalizers.push(token.to_string());
        }
    }

    /// Removes every occurrence of the token.
    pub fn remove_finalizer(&mut self, token: &str) {
        self.finalizers.retain(|f| f != token);
    }
}
