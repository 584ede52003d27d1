use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CustosError;

pub const STORE_DIR: &str = ".custos";
pub const RECORDS_DIR: &str = ".custos/issues";

/// Remote issue state as the tracker reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for IssueState {
    type Err = CustosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            _ => Err(CustosError::InvalidState(s.to_string())),
        }
    }
}
