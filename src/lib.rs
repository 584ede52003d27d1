pub mod commands;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod reconciler;
pub mod record;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;
pub mod watch;

pub use config::Config;
pub use error::{CustosError, Result};
pub use finalizer::{FINALIZER, FinalizerOutcome, FinalizerPhase};
pub use reconciler::Reconciler;
pub use record::{DesiredIssue, IssueStatus};
pub use remote::{GithubGateway, IssueLookup, RemoteIssue, RemoteIssues};
pub use store::{FileStore, IssueStore};
pub use sync::{SyncAction, needs_edit, plan};
pub use types::IssueState;
