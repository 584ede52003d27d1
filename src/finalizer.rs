//! Finalizer lifecycle manager.
//!
//! A finalizer token on a desired record blocks its removal from storage
//! until the matching remote issue has been closed. The lifecycle is an
//! explicit state machine over deletion intent and finalizer presence, so
//! an illegal transition (removing the token before a required close has
//! succeeded) is unrepresentable rather than guarded by conditionals.

use crate::error::Result;
use crate::record::DesiredIssue;
use crate::remote::{IssueLookup, RemoteIssues};
use crate::store::IssueStore;

/// The guard token this reconciler registers on records it manages.
pub const FINALIZER: &str = "custos.io/close-remote-issue";

/// Where a record stands in its finalizer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerPhase {
    /// Not being deleted, token absent: register it.
    Registering,
    /// Not being deleted, token present: nothing to do.
    Steady,
    /// Deletion requested, token present: close the remote issue, then
    /// release the token.
    Closing,
    /// Deletion requested, token absent: nothing blocks removal; hand the
    /// record back to the store for garbage collection.
    Removed,
}

impl FinalizerPhase {
    pub fn of(record: &DesiredIssue) -> Self {
        match (record.deletion_requested(), record.has_finalizer(FINALIZER)) {
            (false, false) => FinalizerPhase::Registering,
            (false, true) => FinalizerPhase::Steady,
            (true, true) => FinalizerPhase::Closing,
            (true, false) => FinalizerPhase::Removed,
        }
    }
}

/// Whether the pass should keep reconciling after the lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerOutcome {
    Continue,
    /// The record is on its way out; the pass ends here.
    Stop,
}

/// Advance the lifecycle one step.
///
/// In the closing phase the remote close must succeed before the token is
/// released: any close or persistence failure propagates with the token
/// still in place, keeping the record blocked until a retry succeeds. A
/// record whose remote issue never existed goes straight to release.
pub async fn advance<S: IssueStore, G: RemoteIssues>(
    store: &S,
    gateway: &G,
    record: &mut DesiredIssue,
) -> Result<FinalizerOutcome> {
    match FinalizerPhase::of(record) {
        FinalizerPhase::Registering => {
            record.add_finalizer(FINALIZER);
            store.update(record).await?;
            tracing::debug!(name = %record.name, "registered finalizer");
            Ok(FinalizerOutcome::Continue)
        }
        FinalizerPhase::Steady => Ok(FinalizerOutcome::Continue),
        FinalizerPhase::Closing => {
            if let IssueLookup::Found(current) = gateway.find_by_title(&record.title).await? {
                gateway.close(&current).await?;
            }
            record.remove_finalizer(FINALIZER);
            store.update(record).await?;
            tracing::info!(name = %record.name, "remote cleanup complete, finalizer released");
            Ok(FinalizerOutcome::Stop)
        }
        FinalizerPhase::Removed => {
            // A record deleted before its first pass never registered a
            // finalizer; persisting it with deletion pending and no
            // finalizers lets the store garbage-collect it.
            store.update(record).await?;
            Ok(FinalizerOutcome::Stop)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn record(deleting: bool, finalizer: bool) -> DesiredIssue {
        let mut record = DesiredIssue::new("bug-1", "bug-1", "v1");
        if deleting {
            record.deletion_timestamp = Some(Timestamp::now());
        }
        if finalizer {
            record.add_finalizer(FINALIZER);
        }
        record
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(FinalizerPhase::of(&record(false, false)), FinalizerPhase::Registering);
        assert_eq!(FinalizerPhase::of(&record(false, true)), FinalizerPhase::Steady);
        assert_eq!(FinalizerPhase::of(&record(true, true)), FinalizerPhase::Closing);
        assert_eq!(FinalizerPhase::of(&record(true, false)), FinalizerPhase::Removed);
    }

    #[test]
    fn test_foreign_finalizers_do_not_count() {
        let mut record = record(true, false);
        record.add_finalizer("other.io/some-guard");
        assert_eq!(FinalizerPhase::of(&record), FinalizerPhase::Removed);
    }
}
