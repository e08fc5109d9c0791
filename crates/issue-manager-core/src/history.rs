//! Interaction history extraction
//!
//! Reduces an issue's comments, commits, reviews and events to the handful of
//! timestamps the decision engine compares.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use issue_manager_tracker_api::{Issue, IssueEvent, Tracker, TrackerResult};
use issue_manager_util::IssueNumber;
use std::collections::HashMap;

use crate::REMINDER_MARKER;

/// What kind of activity an interaction was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Comment,
    ReviewComment,
    Commit,
    Review,
}

/// Timestamped activity on an issue
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub author: Option<String>,
    /// Only comments carry a body
    pub body: Option<String>,
    pub at: DateTime<Utc>,
}

impl Interaction {
    pub fn comment(author: Option<String>, body: String, at: DateTime<Utc>) -> Self {
        Self {
            kind: InteractionKind::Comment,
            author,
            body: Some(body),
            at,
        }
    }

    /// A comment whose body starts with the reminder marker
    pub fn is_reminder(&self) -> bool {
        matches!(
            self.kind,
            InteractionKind::Comment | InteractionKind::ReviewComment
        ) && self
            .body
            .as_deref()
            .is_some_and(|b| b.starts_with(REMINDER_MARKER))
    }
}

/// Source of interactions for one issue
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn interactions(&self) -> TrackerResult<Vec<Interaction>>;
}

/// Plain issues: comments only
pub struct IssueHistorySource<'a> {
    tracker: &'a dyn Tracker,
    number: IssueNumber,
}

impl<'a> IssueHistorySource<'a> {
    pub fn new(tracker: &'a dyn Tracker, number: IssueNumber) -> Self {
        Self { tracker, number }
    }
}

#[async_trait]
impl HistorySource for IssueHistorySource<'_> {
    async fn interactions(&self) -> TrackerResult<Vec<Interaction>> {
        let comments = self.tracker.list_comments(self.number).await?;
        Ok(comments
            .into_iter()
            .map(|c| Interaction::comment(c.author, c.body, c.created_at))
            .collect())
    }
}

/// Pull requests: comments plus review comments, commits and reviews
pub struct PullRequestHistorySource<'a> {
    comments: IssueHistorySource<'a>,
}

impl<'a> PullRequestHistorySource<'a> {
    pub fn new(tracker: &'a dyn Tracker, number: IssueNumber) -> Self {
        Self {
            comments: IssueHistorySource::new(tracker, number),
        }
    }
}

#[async_trait]
impl HistorySource for PullRequestHistorySource<'_> {
    async fn interactions(&self) -> TrackerResult<Vec<Interaction>> {
        let tracker = self.comments.tracker;
        let number = self.comments.number;

        let mut interactions = self.comments.interactions().await?;

        interactions.extend(
            tracker
                .list_review_comments(number)
                .await?
                .into_iter()
                .map(|c| Interaction {
                    kind: InteractionKind::ReviewComment,
                    author: c.author,
                    body: Some(c.body),
                    at: c.created_at,
                }),
        );

        // Commits without a date and pending reviews are not activity yet
        interactions.extend(tracker.list_commits(number).await?.into_iter().filter_map(
            |c| {
                c.committed_at.map(|at| Interaction {
                    kind: InteractionKind::Commit,
                    author: None,
                    body: None,
                    at,
                })
            },
        ));

        interactions.extend(tracker.list_reviews(number).await?.into_iter().filter_map(
            |r| {
                r.submitted_at.map(|at| Interaction {
                    kind: InteractionKind::Review,
                    author: r.author,
                    body: None,
                    at,
                })
            },
        ));

        Ok(interactions)
    }
}

/// Pick the interaction source for an issue
pub fn history_source<'a>(
    tracker: &'a dyn Tracker,
    issue: &Issue,
) -> Box<dyn HistorySource + 'a> {
    if issue.is_pull_request {
        Box::new(PullRequestHistorySource::new(tracker, issue.number))
    } else {
        Box::new(IssueHistorySource::new(tracker, issue.number))
    }
}

/// Timestamps needed to decide what to do with one issue
#[derive(Debug, Clone, Default)]
pub struct InteractionHistory {
    last_interaction: Option<DateTime<Utc>>,
    last_reminder: Option<DateTime<Utc>>,
    last_comment: Option<Interaction>,
    label_applied: HashMap<String, DateTime<Utc>>,
}

impl InteractionHistory {
    /// Fetch and reduce the history of `issue`
    pub async fn collect(tracker: &dyn Tracker, issue: &Issue) -> TrackerResult<Self> {
        let interactions = history_source(tracker, issue).interactions().await?;
        let events = tracker.list_events(issue.number).await?;
        Ok(Self::from_parts(interactions, &events))
    }

    pub fn from_parts(
        interactions: impl IntoIterator<Item = Interaction>,
        events: &[IssueEvent],
    ) -> Self {
        let mut history = Self::default();

        for interaction in interactions {
            if interaction.is_reminder() {
                history.last_reminder = latest(history.last_reminder, interaction.at);
                continue;
            }

            history.last_interaction = latest(history.last_interaction, interaction.at);

            if interaction.kind == InteractionKind::Comment
                && history
                    .last_comment
                    .as_ref()
                    .is_none_or(|c| interaction.at > c.at)
            {
                history.last_comment = Some(interaction);
            }
        }

        for event in events {
            if let Some(label) = event.applied_label() {
                let entry = history
                    .label_applied
                    .entry(label.to_string())
                    .or_insert(event.created_at);
                if event.created_at > *entry {
                    *entry = event.created_at;
                }
            }
        }

        history
    }

    /// Latest regular comment, commit or review
    pub fn last_interaction(&self) -> Option<DateTime<Utc>> {
        self.last_interaction
    }

    /// Latest reminder comment
    pub fn last_reminder(&self) -> Option<DateTime<Utc>> {
        self.last_reminder
    }

    /// Latest regular issue comment
    pub fn last_comment(&self) -> Option<&Interaction> {
        self.last_comment.as_ref()
    }

    /// When `label` was last applied. `None` means the event was never seen,
    /// not that the label is absent.
    pub fn last_label_applied(&self, label: &str) -> Option<DateTime<Utc>> {
        self.label_applied.get(label).copied()
    }
}

fn latest(current: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(current.map_or(candidate, |c| c.max(candidate)))
}
