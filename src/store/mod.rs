//! Desired-state storage.
//!
//! The reconciler talks to storage through the [`IssueStore`] trait: load a
//! record by name, persist finalizer changes, and patch the status
//! sub-record. [`FileStore`] is the file-backed implementation, keeping one
//! YAML record per issue under `.custos/issues/`.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;

use crate::error::{CustosError, Result};
use crate::record::{DesiredIssue, IssueStatus};
use crate::types::RECORDS_DIR;

/// Interface between the reconciler and whatever owns the desired-state
/// records. Failed reads and saves surface as persistence errors; a failed
/// save must never be treated as success.
pub trait IssueStore: Send + Sync {
    /// Load a record, or `None` if it no longer exists.
    fn get(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<DesiredIssue>>> + Send;

    /// Persist the record, including finalizer changes. When deletion was
    /// requested and no finalizers remain, the store garbage-collects the
    /// record instead of saving it.
    fn update(
        &self,
        record: &DesiredIssue,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Persist observed remote state onto the record's status sub-record.
    fn patch_status(
        &self,
        name: &str,
        status: IssueStatus,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Names of all stored records.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

/// One YAML file per record under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `.custos/issues` in the working directory.
    pub fn open_default() -> Self {
        Self::new(RECORDS_DIR)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.yaml"))
    }

    fn persistence_error(name: &str, err: impl std::fmt::Display) -> CustosError {
        CustosError::Persistence {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }

    fn read_record(&self, name: &str) -> Result<Option<DesiredIssue>> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).map_err(|e| Self::persistence_error(name, e))?;
        let record: DesiredIssue =
            serde_yaml_ng::from_str(&content).map_err(|e| Self::persistence_error(name, e))?;
        Ok(Some(record))
    }

    fn write_record(&self, record: &DesiredIssue) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Self::persistence_error(&record.name, e))?;
        let content = serde_yaml_ng::to_string(record)
            .map_err(|e| Self::persistence_error(&record.name, e))?;
        fs::write(self.record_path(&record.name), content)
            .map_err(|e| Self::persistence_error(&record.name, e))
    }

    fn remove_record(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.record_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::persistence_error(name, e)),
        }
    }

    /// Create a record, or update the description of an existing one.
    /// The title is the remote matching key and cannot change once set.
    pub fn apply(&self, name: &str, title: &str, description: &str) -> Result<DesiredIssue> {
        let record = match self.read_record(name)? {
            Some(mut existing) => {
                if existing.title != title {
                    return Err(CustosError::TitleImmutable(name.to_string()));
                }
                existing.description = description.to_string();
                existing
            }
            None => DesiredIssue::new(name, title, description),
        };
        self.write_record(&record)?;
        Ok(record)
    }

    /// Mark a record for deletion by stamping its deletion timestamp. The
    /// file stays on disk until reconciliation releases its finalizers.
    pub fn mark_deleted(&self, name: &str) -> Result<DesiredIssue> {
        let mut record = self
            .read_record(name)?
            .ok_or_else(|| CustosError::RecordNotFound(name.to_string()))?;
        if record.deletion_timestamp.is_none() {
            record.deletion_timestamp = Some(Timestamp::now());
            self.write_record(&record)?;
        }
        Ok(record)
    }
}

impl IssueStore for FileStore {
    async fn get(&self, name: &str) -> Result<Option<DesiredIssue>> {
        self.read_record(name)
    }

    async fn update(&self, record: &DesiredIssue) -> Result<()> {
        if record.deletion_requested() && record.finalizers.is_empty() {
            // Nothing blocks removal any more: garbage-collect the record.
            tracing::info!(name = %record.name, "removing record from store");
            return self.remove_record(&record.name);
        }
        self.write_record(record)
    }

    async fn patch_status(&self, name: &str, status: IssueStatus) -> Result<()> {
        let mut record = self
            .read_record(name)?
            .ok_or_else(|| CustosError::RecordNotFound(name.to_string()))?;
        record.status = Some(status);
        self.write_record(&record)
    }

    async fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
