//! Applies decided actions to the tracker

use issue_manager_tracker_api::{Issue, Tracker, TrackerResult};
use issue_manager_util::IssueNumber;
use tracing::info;

use crate::{Action, reminder_body};

/// Whether actions reach the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Live,
    /// Log actions without writing anything
    DryRun,
}

/// Executes actions against a tracker.
///
/// There is no rollback: an error stops the remaining actions and is returned
/// as is. A later run re-derives whatever is still due.
pub struct ActionExecutor<'a> {
    tracker: &'a dyn Tracker,
    mode: ExecutionMode,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(tracker: &'a dyn Tracker, mode: ExecutionMode) -> Self {
        Self { tracker, mode }
    }

    /// Apply `actions` in order
    pub async fn execute(&self, issue: &Issue, actions: &[Action]) -> TrackerResult<()> {
        for action in actions {
            match action {
                Action::RemoveLabel { keyword } => {
                    self.remove_label(issue.number, keyword.as_str()).await?;
                }
                Action::SendReminder { message, .. } => {
                    self.post_reminder(issue.number, message).await?;
                }
                Action::Close { message, .. } => {
                    self.close_issue(issue.number, message).await?;
                }
            }
        }
        Ok(())
    }

    /// Remove `label`; an absent label is not an error
    pub async fn remove_label(&self, number: IssueNumber, label: &str) -> TrackerResult<()> {
        info!(issue = %number, label, dry_run = self.is_dry_run(), "Removing label");
        if self.is_dry_run() {
            return Ok(());
        }
        self.tracker.remove_label(number, label).await
    }

    pub async fn post_comment(&self, number: IssueNumber, body: &str) -> TrackerResult<()> {
        if self.is_dry_run() {
            info!(issue = %number, body, "Dry run: would post comment");
            return Ok(());
        }
        self.tracker.add_comment(number, body).await
    }

    /// Post `message` behind the reminder marker
    pub async fn post_reminder(&self, number: IssueNumber, message: &str) -> TrackerResult<()> {
        info!(issue = %number, dry_run = self.is_dry_run(), "Sending reminder");
        self.post_comment(number, &reminder_body(message)).await
    }

    /// Post `message` verbatim, then close
    pub async fn close_issue(&self, number: IssueNumber, message: &str) -> TrackerResult<()> {
        info!(issue = %number, dry_run = self.is_dry_run(), "Closing issue");
        self.post_comment(number, message).await?;
        if self.is_dry_run() {
            return Ok(());
        }
        self.tracker.close_issue(number).await
    }

    fn is_dry_run(&self) -> bool {
        self.mode == ExecutionMode::DryRun
    }
}
