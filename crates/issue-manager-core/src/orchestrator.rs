//! Run orchestration
//!
//! Selects the issues a run looks at, then drives history extraction,
//! decisions and execution for each of them.

use chrono::{DateTime, Utc};
use issue_manager_tracker_api::{Issue, Tracker, TrackerResult};
use issue_manager_util::IssueNumber;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{Action, ActionExecutor, DecisionEngine, ExecutionMode, InteractionHistory};

/// What started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// An event about one issue or pull request
    SingleIssue(IssueNumber),
    /// Scheduled run over every open issue carrying a configured label
    Sweep,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub evaluated: usize,
    /// Issues that were already closed
    pub skipped: usize,
    pub closed: usize,
    pub reminded: usize,
    pub labels_removed: usize,
}

impl RunSummary {
    fn record(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::RemoveLabel { .. } => self.labels_removed += 1,
                Action::SendReminder { .. } => self.reminded += 1,
                Action::Close { .. } => self.closed += 1,
            }
        }
    }
}

pub struct RunOrchestrator {
    tracker: Arc<dyn Tracker>,
    engine: DecisionEngine,
    mode: ExecutionMode,
}

impl RunOrchestrator {
    pub fn new(tracker: Arc<dyn Tracker>, engine: DecisionEngine, mode: ExecutionMode) -> Self {
        Self {
            tracker,
            engine,
            mode,
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Run once. The first tracker error aborts the run.
    pub async fn run(&self, trigger: Trigger, now: DateTime<Utc>) -> TrackerResult<RunSummary> {
        let mut summary = RunSummary::default();

        match trigger {
            Trigger::SingleIssue(number) => {
                info!(issue = %number, "Processing single issue");
                let issue = self.tracker.get_issue(number).await?;
                if issue.is_open() {
                    self.process_issue(&issue, now, &mut summary).await?;
                } else {
                    debug!(issue = %number, "Issue is closed, nothing to do");
                    summary.skipped += 1;
                }
            }
            Trigger::Sweep => {
                let mut seen = HashSet::new();
                for keyword in self.engine.policy_set().keywords() {
                    let issues = self.tracker.list_open_issues(Some(keyword.as_str())).await?;
                    info!(keyword = %keyword, count = issues.len(), "Sweeping labeled issues");

                    for issue in issues {
                        // An issue with several configured labels is evaluated once
                        if !seen.insert(issue.number) {
                            continue;
                        }
                        self.process_issue(&issue, now, &mut summary).await?;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Evaluate one open issue and apply the resulting actions
    pub async fn process_issue(
        &self,
        issue: &Issue,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> TrackerResult<()> {
        let history = InteractionHistory::collect(self.tracker.as_ref(), issue).await?;
        let actions = self.engine.decide(now, &issue.labels, &history);

        debug!(
            issue = %issue.number,
            pull_request = issue.is_pull_request,
            last_interaction = ?history.last_interaction(),
            last_reminder = ?history.last_reminder(),
            action_count = actions.len(),
            "Evaluated issue"
        );

        summary.evaluated += 1;
        if actions.is_empty() {
            return Ok(());
        }

        ActionExecutor::new(self.tracker.as_ref(), self.mode)
            .execute(issue, &actions)
            .await?;
        summary.record(&actions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use issue_manager_config::{KeywordPolicy, PolicySet};
    use issue_manager_tracker_api::{MockIssue, MockTracker, TrackerCall};

    fn day(days: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + TimeDelta::days(days)
    }

    fn orchestrator(tracker: Arc<MockTracker>, keywords: &[&str]) -> RunOrchestrator {
        let policies = keywords.iter().map(|k| KeywordPolicy::new(*k)).collect();
        let engine = DecisionEngine::new(PolicySet { policies }, None);
        RunOrchestrator::new(tracker, engine, ExecutionMode::Live)
    }

    #[tokio::test]
    async fn single_issue_skips_closed() {
        let tracker = Arc::new(
            MockTracker::new()
                .with_issue(MockIssue::open(1, &["waiting"]).labeled("waiting", day(0)).closed()),
        );
        let orchestrator = orchestrator(tracker.clone(), &["waiting"]);

        let summary = orchestrator
            .run(Trigger::SingleIssue(IssueNumber::new(1)), day(30))
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.evaluated, 0);
        assert!(tracker.write_calls().is_empty());
    }

    #[tokio::test]
    async fn sweep_lists_each_keyword() {
        let tracker = Arc::new(MockTracker::new());
        let orchestrator = orchestrator(tracker.clone(), &["waiting", "question"]);

        let summary = orchestrator.run(Trigger::Sweep, day(0)).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(
            tracker.calls(),
            vec![
                TrackerCall::ListOpenIssues {
                    label: Some("waiting".into())
                },
                TrackerCall::ListOpenIssues {
                    label: Some("question".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_issue_is_an_error() {
        let tracker = Arc::new(MockTracker::new());
        let orchestrator = orchestrator(tracker, &["waiting"]);

        let result = orchestrator
            .run(Trigger::SingleIssue(IssueNumber::new(404)), day(0))
            .await;
        assert!(result.is_err());
    }
}
