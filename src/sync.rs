//! Sync decision engine.
//!
//! Pure logic: given a desired record and the result of the remote lookup,
//! decide which mutation (if any) a pass must issue. The branching is
//! deliberately simple; the interesting part of reconciliation is failure
//! handling, which lives with the orchestrator and the gateway.

use crate::record::DesiredIssue;
use crate::remote::{IssueLookup, RemoteIssue};
use crate::types::IssueState;

/// The mutation a reconciliation pass needs against the remote tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// No matching remote issue: create one from the desired record.
    Create,
    /// A match exists: patch it if it differs (a no-op when unchanged).
    EditIfNeeded(RemoteIssue),
}

/// Decide the action for a pass. Title matching already happened in the
/// lookup; exact, case-sensitive, first match wins.
pub fn plan(lookup: IssueLookup) -> SyncAction {
    match lookup {
        IssueLookup::Missing => SyncAction::Create,
        IssueLookup::Found(current) => SyncAction::EditIfNeeded(current),
    }
}

/// Whether an edit request must actually be sent.
///
/// True when the body differs, or when the remote issue is closed while a
/// live desired record still matches it — every edit forces the issue
/// open, which is the re-open path for issues closed outside this system.
pub fn needs_edit(desired: &DesiredIssue, current: &RemoteIssue) -> bool {
    current.body != desired.description || current.state == IssueState::Closed
}
