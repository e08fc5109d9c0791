//! Tracker trait

use async_trait::async_trait;
use issue_manager_util::IssueNumber;
use thiserror::Error;

use crate::{Comment, Commit, Issue, IssueEvent, Review};

/// Errors from tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Issue not found: {0}")]
    IssueNotFound(IssueNumber),

    #[error("Tracker API {operation} failed with status {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Tracker API {operation} request failed: {message}")]
    Transport { operation: String, message: String },

    #[error("Failed to decode tracker {operation} response: {message}")]
    Decode { operation: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Issue tracker - implemented by concrete backends.
///
/// List operations return the complete (paginated) history in chronological
/// order.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// List open issues and pull requests, optionally only those with `label`
    async fn list_open_issues(&self, label: Option<&str>) -> TrackerResult<Vec<Issue>>;

    /// Get a single issue or pull request
    async fn get_issue(&self, number: IssueNumber) -> TrackerResult<Issue>;

    async fn list_events(&self, number: IssueNumber) -> TrackerResult<Vec<IssueEvent>>;

    async fn list_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>>;

    async fn list_commits(&self, number: IssueNumber) -> TrackerResult<Vec<Commit>>;

    async fn list_reviews(&self, number: IssueNumber) -> TrackerResult<Vec<Review>>;

    async fn list_review_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>>;

    /// Append a comment
    async fn add_comment(&self, number: IssueNumber, body: &str) -> TrackerResult<()>;

    /// Transition the issue to closed
    async fn close_issue(&self, number: IssueNumber) -> TrackerResult<()>;

    /// Remove a label; removing an absent label succeeds
    async fn remove_label(&self, number: IssueNumber, label: &str) -> TrackerResult<()>;
}
