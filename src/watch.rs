//! Change-notification loop.
//!
//! Watches the record directory with `notify` and re-reconciles on change,
//! with a periodic full resync as a safety net for missed events. Passes
//! run sequentially, which is what gives the reconciler its per-record
//! non-concurrency guarantee.

use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};

use crate::error::Result;
use crate::reconciler::Reconciler;
use crate::remote::RemoteIssues;
use crate::store::{FileStore, IssueStore};

/// Window for coalescing bursts of filesystem events into one resync.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Capacity of the channel bridging `notify` callbacks to the tokio loop.
/// Overflow is harmless: a pending notification already guarantees a pass.
const CHANNEL_CAPACITY: usize = 64;

/// Reconcile every stored record once, sequentially. Failed passes are
/// logged and skipped; the next notification or resync retries them.
/// Returns how many passes failed, so one-shot callers can surface a
/// non-zero exit.
pub async fn reconcile_all<S: IssueStore, G: RemoteIssues>(reconciler: &Reconciler<S, G>) -> usize {
    let names = match reconciler.store().list().await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!("failed to list records: {e}");
            return 1;
        }
    };

    let mut failed = 0;
    for name in names {
        if let Err(e) = reconciler.reconcile(&name).await {
            tracing::error!(name = %name, "reconcile failed: {e}");
            failed += 1;
        }
    }
    failed
}

/// Run the watch loop until the process is stopped.
pub async fn run<G: RemoteIssues>(
    reconciler: &Reconciler<FileStore, G>,
    resync_secs: u64,
) -> Result<()> {
    let root = reconciler.store().root().to_path_buf();
    std::fs::create_dir_all(&root)?;

    let (bridge_tx, mut bridge_rx) = tokio::sync::mpsc::channel::<()>(CHANNEL_CAPACITY);
    let mut watcher = notify::RecommendedWatcher::new(
        move |res: std::result::Result<notify::Event, notify::Error>| {
            if let Ok(event) = res
                && matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                )
            {
                let _ = bridge_tx.try_send(());
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::NonRecursive)?;

    tracing::info!(root = %root.display(), resync_secs, "watching for record changes");

    // First tick fires immediately, giving a full pass on startup.
    let mut resync = tokio::time::interval(Duration::from_secs(resync_secs));
    loop {
        tokio::select! {
            _ = resync.tick() => {}
            notified = bridge_rx.recv() => {
                if notified.is_none() {
                    return Ok(());
                }
                tokio::time::sleep(DEBOUNCE).await;
                while bridge_rx.try_recv().is_ok() {}
            }
        }
        reconcile_all(reconciler).await;
    }
}
