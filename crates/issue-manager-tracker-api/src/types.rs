//! Tracker data model

use chrono::{DateTime, Utc};
use issue_manager_util::IssueNumber;
use serde::{Deserialize, Serialize};

/// Open/closed state of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// Issue or pull request, as listed by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: IssueNumber,
    pub title: String,
    pub state: IssueState,
    /// Current label names
    pub labels: Vec<String>,
    pub is_pull_request: bool,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

/// Kind of an issue timeline event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueEventKind {
    Labeled { label: String },
    Unlabeled { label: String },
    Other { name: String },
}

/// Discrete state change on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    pub kind: IssueEventKind,
    pub created_at: DateTime<Utc>,
}

impl IssueEvent {
    pub fn labeled(label: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            kind: IssueEventKind::Labeled {
                label: label.into(),
            },
            created_at,
        }
    }

    /// Label applied by this event, if it is a "labeled" event
    pub fn applied_label(&self) -> Option<&str> {
        match &self.kind {
            IssueEventKind::Labeled { label } => Some(label),
            _ => None,
        }
    }
}

/// Issue comment or pull request review comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    /// Login of the author; absent for deleted accounts
    pub author: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Commit on a pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub committed_at: Option<DateTime<Utc>>,
}

/// Review on a pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author: Option<String>,
    /// Absent while the review is pending
    pub submitted_at: Option<DateTime<Utc>>,
}
