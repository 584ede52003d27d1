//! In-memory fakes for the reconciler's two collaborators, with call
//! recording so tests can assert exactly which remote mutations a pass
//! issued and in what order.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use custos::{
    CustosError, DesiredIssue, IssueLookup, IssueState, IssueStatus, IssueStore, RemoteIssue,
    RemoteIssues, Result, needs_edit,
};

pub const UPDATED_AT: &str = "2026-01-05T10:00:00Z";

#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<HashMap<String, DesiredIssue>>,
    /// Snapshots passed to `update`, in order.
    pub updates: Mutex<Vec<DesiredIssue>>,
    pub fail_update: AtomicBool,
}

impl FakeStore {
    pub fn with_record(record: DesiredIssue) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.name.clone(), record);
        store
    }

    pub fn record(&self, name: &str) -> Option<DesiredIssue> {
        self.records.lock().unwrap().get(name).cloned()
    }

    /// Mutate a stored record in place, as the external owner would.
    pub fn edit_record(&self, name: &str, f: impl FnOnce(&mut DesiredIssue)) {
        let mut records = self.records.lock().unwrap();
        f(records.get_mut(name).expect("record present"));
    }
}

impl IssueStore for FakeStore {
    async fn get(&self, name: &str) -> Result<Option<DesiredIssue>> {
        Ok(self.records.lock().unwrap().get(name).cloned())
    }

    async fn update(&self, record: &DesiredIssue) -> Result<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(CustosError::Persistence {
                name: record.name.clone(),
                reason: "injected update failure".to_string(),
            });
        }
        self.updates.lock().unwrap().push(record.clone());
        let mut records = self.records.lock().unwrap();
        if record.deletion_requested() && record.finalizers.is_empty() {
            records.remove(&record.name);
        } else {
            records.insert(record.name.clone(), record.clone());
        }
        Ok(())
    }

    async fn patch_status(&self, name: &str, status: IssueStatus) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(name)
            .ok_or_else(|| CustosError::RecordNotFound(name.to_string()))?;
        record.status = Some(status);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.records.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Every gateway call a pass issued, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    List,
    Create {
        title: String,
        body: String,
    },
    Edit {
        number: u64,
        title: String,
        body: String,
        state: IssueState,
    },
    Close {
        number: u64,
    },
}

impl GatewayCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, GatewayCall::List)
    }
}

pub struct FakeGateway {
    pub issues: Mutex<Vec<RemoteIssue>>,
    pub calls: Mutex<Vec<GatewayCall>>,
    pub fail_close: AtomicBool,
    next_number: AtomicU64,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_close: AtomicBool::new(false),
            next_number: AtomicU64::new(1),
        }
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers assigned to created issues start at `n`.
    pub fn numbering_from(self, n: u64) -> Self {
        self.next_number.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_issue(self, issue: RemoteIssue) -> Self {
        self.issues.lock().unwrap().push(issue);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    pub fn issue(&self, title: &str) -> Option<RemoteIssue> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.title == title)
            .cloned()
    }
}

pub fn open_issue(title: &str, body: &str, number: u64) -> RemoteIssue {
    RemoteIssue {
        title: title.to_string(),
        body: body.to_string(),
        number: Some(number),
        state: IssueState::Open,
        updated_at: Some(UPDATED_AT.to_string()),
    }
}

pub fn closed_issue(title: &str, body: &str, number: u64) -> RemoteIssue {
    RemoteIssue {
        state: IssueState::Closed,
        ..open_issue(title, body, number)
    }
}

impl RemoteIssues for FakeGateway {
    async fn find_by_title(&self, title: &str) -> Result<IssueLookup> {
        self.calls.lock().unwrap().push(GatewayCall::List);
        let found = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.title == title)
            .cloned();
        Ok(match found {
            Some(issue) => IssueLookup::Found(issue),
            None => IssueLookup::Missing,
        })
    }

    async fn create(&self, desired: &DesiredIssue) -> Result<RemoteIssue> {
        self.calls.lock().unwrap().push(GatewayCall::Create {
            title: desired.title.clone(),
            body: desired.description.clone(),
        });
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let issue = RemoteIssue {
            title: desired.title.clone(),
            body: desired.description.clone(),
            number: Some(number),
            state: IssueState::Open,
            updated_at: Some(UPDATED_AT.to_string()),
        };
        self.issues.lock().unwrap().push(issue.clone());
        Ok(issue)
    }

    async fn edit_if_needed(
        &self,
        desired: &DesiredIssue,
        current: RemoteIssue,
    ) -> Result<RemoteIssue> {
        if !needs_edit(desired, &current) {
            return Ok(current);
        }
        let number = current.number.expect("edited issue has a number");
        self.calls.lock().unwrap().push(GatewayCall::Edit {
            number,
            title: desired.title.clone(),
            body: desired.description.clone(),
            state: IssueState::Open,
        });
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.number == Some(number))
            .expect("edited issue exists");
        issue.body = desired.description.clone();
        issue.state = IssueState::Open;
        Ok(issue.clone())
    }

    async fn close(&self, current: &RemoteIssue) -> Result<()> {
        let number = current.number.expect("closed issue has a number");
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(CustosError::UnexpectedStatus {
                op: "close issue",
                title: current.title.clone(),
                method: "PATCH".to_string(),
                status: 500,
                expected: 200,
            });
        }
        self.calls.lock().unwrap().push(GatewayCall::Close { number });
        let mut issues = self.issues.lock().unwrap();
        if let Some(issue) = issues.iter_mut().find(|i| i.number == Some(number)) {
            issue.state = IssueState::Closed;
        }
        Ok(())
    }
}
