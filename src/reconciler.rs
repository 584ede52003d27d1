//! Reconcile orchestrator.
//!
//! One pass per change notification: load the record, run the finalizer
//! lifecycle (deletion takes priority), look up the remote counterpart,
//! decide and apply the needed mutation, and write the observed remote
//! state back to status. Every failure is returned to the caller, which
//! logs it and retries by re-delivering the notification; a failed pass
//! never takes the process down.

use crate::error::Result;
use crate::finalizer::{self, FinalizerOutcome};
use crate::record::IssueStatus;
use crate::remote::RemoteIssues;
use crate::store::IssueStore;
use crate::sync::{self, SyncAction};

/// Sequences one reconciliation pass over its two collaborators.
///
/// Passes for different records may run concurrently; the invoking
/// scheduler must not run passes for the same record concurrently (the
/// watch loop satisfies this by processing notifications sequentially).
pub struct Reconciler<S, G> {
    store: S,
    gateway: G,
}

impl<S: IssueStore, G: RemoteIssues> Reconciler<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run one pass for the named record.
    ///
    /// A record that no longer exists is a terminal no-op. Once a mutation
    /// request has been sent it is not retried within the pass; retry
    /// happens across passes.
    pub async fn reconcile(&self, name: &str) -> Result<()> {
        let Some(mut record) = self.store.get(name).await? else {
            tracing::debug!(name, "record no longer exists, nothing to do");
            return Ok(());
        };

        if finalizer::advance(&self.store, &self.gateway, &mut record).await?
            == FinalizerOutcome::Stop
        {
            return Ok(());
        }

        let lookup = self.gateway.find_by_title(&record.title).await?;
        let observed = match sync::plan(lookup) {
            SyncAction::Create => self.gateway.create(&record).await?,
            SyncAction::EditIfNeeded(current) => {
                self.gateway.edit_if_needed(&record, current).await?
            }
        };

        let status = IssueStatus {
            state: observed.state,
            last_updated: observed.updated_at.clone(),
        };
        self.store.patch_status(name, status).await?;

        tracing::debug!(name, state = %observed.state, "pass complete");
        Ok(())
    }
}
