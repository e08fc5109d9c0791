//! In-memory tracker for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use issue_manager_util::IssueNumber;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    Comment, Commit, Issue, IssueEvent, IssueState, Review, Tracker, TrackerError, TrackerResult,
};

/// Login used for comments written through the mock
pub const MOCK_BOT_LOGIN: &str = "issue-manager[bot]";

/// Mock issue with its full history
#[derive(Debug, Clone)]
pub struct MockIssue {
    pub issue: Issue,
    pub events: Vec<IssueEvent>,
    pub comments: Vec<Comment>,
    pub commits: Vec<Commit>,
    pub reviews: Vec<Review>,
    pub review_comments: Vec<Comment>,
}

impl MockIssue {
    /// An open issue carrying `labels`, with no history
    pub fn open(number: u64, labels: &[&str]) -> Self {
        Self {
            issue: Issue {
                number: IssueNumber::new(number),
                title: format!("Issue {}", number),
                state: IssueState::Open,
                labels: labels.iter().map(|l| l.to_string()).collect(),
                is_pull_request: false,
            },
            events: Vec::new(),
            comments: Vec::new(),
            commits: Vec::new(),
            reviews: Vec::new(),
            review_comments: Vec::new(),
        }
    }

    pub fn pull_request(mut self) -> Self {
        self.issue.is_pull_request = true;
        self
    }

    pub fn closed(mut self) -> Self {
        self.issue.state = IssueState::Closed;
        self
    }

    pub fn labeled(mut self, label: &str, at: DateTime<Utc>) -> Self {
        self.events.push(IssueEvent::labeled(label, at));
        self
    }

    pub fn comment(mut self, author: &str, body: &str, at: DateTime<Utc>) -> Self {
        let id = self.comments.len() as u64 + 1;
        self.comments.push(Comment {
            id,
            author: Some(author.to_string()),
            body: body.to_string(),
            created_at: at,
        });
        self
    }

    pub fn commit(mut self, sha: &str, at: DateTime<Utc>) -> Self {
        self.commits.push(Commit {
            sha: sha.to_string(),
            committed_at: Some(at),
        });
        self
    }

    pub fn review(mut self, author: &str, at: DateTime<Utc>) -> Self {
        let id = self.reviews.len() as u64 + 1;
        self.reviews.push(Review {
            id,
            author: Some(author.to_string()),
            submitted_at: Some(at),
        });
        self
    }

    pub fn review_comment(mut self, author: &str, body: &str, at: DateTime<Utc>) -> Self {
        let id = self.review_comments.len() as u64 + 1;
        self.review_comments.push(Comment {
            id,
            author: Some(author.to_string()),
            body: body.to_string(),
            created_at: at,
        });
        self
    }
}

/// Call recorded by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    ListOpenIssues { label: Option<String> },
    GetIssue { number: IssueNumber },
    ListEvents { number: IssueNumber },
    ListComments { number: IssueNumber },
    ListCommits { number: IssueNumber },
    ListReviews { number: IssueNumber },
    ListReviewComments { number: IssueNumber },
    AddComment { number: IssueNumber, body: String },
    CloseIssue { number: IssueNumber },
    RemoveLabel { number: IssueNumber, label: String },
}

impl TrackerCall {
    /// Whether the call changes tracker state
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            TrackerCall::AddComment { .. }
                | TrackerCall::CloseIssue { .. }
                | TrackerCall::RemoveLabel { .. }
        )
    }
}

/// Mock tracker for unit/integration testing
pub struct MockTracker {
    issues: Arc<Mutex<BTreeMap<IssueNumber, MockIssue>>>,
    calls: Arc<Mutex<Vec<TrackerCall>>>,
    next_comment_id: AtomicU64,
    clock: Arc<Mutex<DateTime<Utc>>>,

    /// Configure writes to fail
    pub fail_writes: Arc<Mutex<bool>>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            issues: Arc::new(Mutex::new(BTreeMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_comment_id: AtomicU64::new(1000),
            clock: Arc::new(Mutex::new(Utc::now())),
            fail_writes: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_issue(self, issue: MockIssue) -> Self {
        self.insert_issue(issue);
        self
    }

    pub fn insert_issue(&self, issue: MockIssue) {
        self.issues
            .lock()
            .unwrap()
            .insert(issue.issue.number, issue);
    }

    /// Timestamp given to comments added through the mock
    pub fn set_clock(&self, now: DateTime<Utc>) {
        *self.clock.lock().unwrap() = now;
    }

    pub fn issue(&self, number: u64) -> Option<MockIssue> {
        self.issues
            .lock()
            .unwrap()
            .get(&IssueNumber::new(number))
            .cloned()
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<TrackerCall> {
        self.calls().into_iter().filter(TrackerCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: TrackerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writable(&self) -> TrackerResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(TrackerError::Api {
                operation: "write".into(),
                status: 500,
                message: "Mock write failure".into(),
            });
        }
        Ok(())
    }

    fn read<T>(
        &self,
        number: IssueNumber,
        f: impl FnOnce(&MockIssue) -> T,
    ) -> TrackerResult<T> {
        let issues = self.issues.lock().unwrap();
        issues
            .get(&number)
            .map(f)
            .ok_or(TrackerError::IssueNotFound(number))
    }

    fn write(
        &self,
        number: IssueNumber,
        f: impl FnOnce(&mut MockIssue),
    ) -> TrackerResult<()> {
        self.check_writable()?;
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .get_mut(&number)
            .ok_or(TrackerError::IssueNotFound(number))?;
        f(issue);
        Ok(())
    }
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tracker for MockTracker {
    async fn list_open_issues(&self, label: Option<&str>) -> TrackerResult<Vec<Issue>> {
        self.record(TrackerCall::ListOpenIssues {
            label: label.map(str::to_string),
        });
        let issues = self.issues.lock().unwrap();
        Ok(issues
            .values()
            .map(|m| &m.issue)
            .filter(|i| i.is_open())
            .filter(|i| label.is_none_or(|l| i.has_label(l)))
            .cloned()
            .collect())
    }

    async fn get_issue(&self, number: IssueNumber) -> TrackerResult<Issue> {
        self.record(TrackerCall::GetIssue { number });
        self.read(number, |m| m.issue.clone())
    }

    async fn list_events(&self, number: IssueNumber) -> TrackerResult<Vec<IssueEvent>> {
        self.record(TrackerCall::ListEvents { number });
        self.read(number, |m| m.events.clone())
    }

    async fn list_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>> {
        self.record(TrackerCall::ListComments { number });
        self.read(number, |m| m.comments.clone())
    }

    async fn list_commits(&self, number: IssueNumber) -> TrackerResult<Vec<Commit>> {
        self.record(TrackerCall::ListCommits { number });
        self.read(number, |m| m.commits.clone())
    }

    async fn list_reviews(&self, number: IssueNumber) -> TrackerResult<Vec<Review>> {
        self.record(TrackerCall::ListReviews { number });
        self.read(number, |m| m.reviews.clone())
    }

    async fn list_review_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>> {
        self.record(TrackerCall::ListReviewComments { number });
        self.read(number, |m| m.review_comments.clone())
    }

    async fn add_comment(&self, number: IssueNumber, body: &str) -> TrackerResult<()> {
        self.record(TrackerCall::AddComment {
            number,
            body: body.to_string(),
        });
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        let created_at = *self.clock.lock().unwrap();
        self.write(number, |m| {
            m.comments.push(Comment {
                id,
                author: Some(MOCK_BOT_LOGIN.to_string()),
                body: body.to_string(),
                created_at,
            })
        })
    }

    async fn close_issue(&self, number: IssueNumber) -> TrackerResult<()> {
        self.record(TrackerCall::CloseIssue { number });
        self.write(number, |m| m.issue.state = IssueState::Closed)
    }

    async fn remove_label(&self, number: IssueNumber, label: &str) -> TrackerResult<()> {
        self.record(TrackerCall::RemoveLabel {
            number,
            label: label.to_string(),
        });
        self.write(number, |m| m.issue.labels.retain(|l| l != label))
    }
}
