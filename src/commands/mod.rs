//! CLI command implementations.

use crate::config::Config;
use crate::error::{CustosError, Result};
use crate::reconciler::Reconciler;
use crate::remote::GithubGateway;
use crate::store::{FileStore, IssueStore};
use crate::watch;

/// Write the initial configuration file.
pub fn cmd_init(owner: &str, repo: &str) -> Result<()> {
    let config = Config::new(owner, repo);
    config.save()?;
    println!(
        "Initialized {} for {}/{}",
        Config::config_path().display(),
        owner,
        repo
    );
    Ok(())
}

/// Create or update a desired record. The title defaults to the record
/// name and cannot change once set.
pub fn cmd_apply(name: &str, title: Option<&str>, description: &str) -> Result<()> {
    let store = FileStore::open_default();
    let record = store.apply(name, title.unwrap_or(name), description)?;
    println!("Applied {} (title: {})", record.name, record.title);
    Ok(())
}

/// Mark a record for deletion. The matching remote issue is closed and the
/// record removed on the next reconcile pass.
pub fn cmd_delete(name: &str) -> Result<()> {
    let store = FileStore::open_default();
    store.mark_deleted(name)?;
    println!("Marked {name} for deletion; reconcile to complete cleanup");
    Ok(())
}

/// List stored records with their last observed remote state.
pub async fn cmd_ls() -> Result<()> {
    let store = FileStore::open_default();
    for name in store.list().await? {
        let Some(record) = store.get(&name).await? else {
            continue;
        };
        let state = record
            .status
            .as_ref()
            .map(|s| s.state.to_string())
            .unwrap_or_else(|| "unsynced".to_string());
        let deleting = if record.deletion_requested() {
            " (deleting)"
        } else {
            ""
        };
        println!("{name}  [{state}]{deleting}  {}", record.title);
    }
    Ok(())
}

fn build_reconciler() -> Result<Reconciler<FileStore, GithubGateway>> {
    let config = Config::load()?;
    let gateway = GithubGateway::from_config(&config)?;
    Ok(Reconciler::new(FileStore::open_default(), gateway))
}

/// Run one reconcile pass for one record, or for all of them. Unlike the
/// watch loop, a one-shot run reports failed passes through its exit code.
pub async fn cmd_reconcile(name: Option<&str>) -> Result<()> {
    let reconciler = build_reconciler()?;
    match name {
        Some(name) => reconciler.reconcile(name).await,
        None => match watch::reconcile_all(&reconciler).await {
            0 => Ok(()),
            failed => Err(CustosError::ReconcileFailed(failed)),
        },
    }
}

/// Watch the record directory and reconcile on change.
pub async fn cmd_watch(resync_secs: u64) -> Result<()> {
    let reconciler = build_reconciler()?;
    watch::run(&reconciler, resync_secs).await
}
