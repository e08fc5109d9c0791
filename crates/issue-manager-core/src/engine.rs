//! Decision engine

use chrono::{DateTime, Utc};
use issue_manager_config::{KeywordPolicy, PolicySet};
use tracing::{debug, info, warn};

use crate::{Action, InteractionHistory};

/// Outcome of evaluating one policy against an issue
#[derive(Debug)]
enum PolicyOutcome {
    /// Nothing to do for this policy, continue with the next
    Continue,
    /// Non-terminal actions, continue with the next policy
    Proceed(Vec<Action>),
    /// Terminal actions, stop evaluating this issue
    Stop(Vec<Action>),
}

/// Maps an issue's labels and history to the actions a run should take.
///
/// Evaluation is pure: the engine never talks to the tracker, and the same
/// inputs always give the same actions.
pub struct DecisionEngine {
    policy_set: PolicySet,
    owner: Option<String>,
}

impl DecisionEngine {
    /// Create a new decision engine.
    ///
    /// `owner` is the repository owner, always allowed to close an issue with
    /// a directive comment.
    pub fn new(policy_set: PolicySet, owner: Option<String>) -> Self {
        info!(
            policy_count = policy_set.len(),
            owner = owner.as_deref().unwrap_or("<unknown>"),
            "Decision engine initialized"
        );

        Self { policy_set, owner }
    }

    pub fn policy_set(&self) -> &PolicySet {
        &self.policy_set
    }

    /// Decide what to do with an issue carrying `labels`.
    ///
    /// Policies are evaluated in configuration order. The first reminder or
    /// close ends evaluation; label removals accumulate.
    pub fn decide(
        &self,
        now: DateTime<Utc>,
        labels: &[String],
        history: &InteractionHistory,
    ) -> Vec<Action> {
        let mut actions = Vec::new();

        for policy in self.policy_set.iter() {
            match self.evaluate_policy(policy, now, labels, history) {
                PolicyOutcome::Continue => {}
                PolicyOutcome::Proceed(mut more) => actions.append(&mut more),
                PolicyOutcome::Stop(mut more) => {
                    actions.append(&mut more);
                    break;
                }
            }
        }

        actions
    }

    fn evaluate_policy(
        &self,
        policy: &KeywordPolicy,
        now: DateTime<Utc>,
        labels: &[String],
        history: &InteractionHistory,
    ) -> PolicyOutcome {
        let keyword = &policy.keyword;
        // Out of range means the delay reaches past any representable time
        let threshold = now.checked_sub_signed(policy.delay);

        let idle = threshold.is_some_and(|threshold| {
            history
                .last_interaction()
                .is_none_or(|last| threshold > last)
        });

        if !labels.iter().any(|l| l == keyword.as_str()) {
            return self.evaluate_directive(policy, idle, history);
        }

        let Some(applied_at) = history.last_label_applied(keyword.as_str()) else {
            // Labeling event was never seen: only inactivity can close
            warn!(
                keyword = %keyword,
                "No labeled event found, falling back to inactivity rule"
            );
            if idle {
                return PolicyOutcome::Stop(close_actions(policy));
            }
            return self.evaluate_directive(policy, idle, history);
        };

        if history
            .last_interaction()
            .is_some_and(|last| last > applied_at)
        {
            debug!(keyword = %keyword, "Activity after labeling");
            if !policy.remove_label_on_comment {
                return self.evaluate_directive(policy, idle, history);
            }

            let mut actions = vec![Action::RemoveLabel {
                keyword: keyword.clone(),
            }];
            return match self.evaluate_directive(policy, idle, history) {
                PolicyOutcome::Stop(mut close) => {
                    actions.append(&mut close);
                    PolicyOutcome::Stop(actions)
                }
                _ => PolicyOutcome::Proceed(actions),
            };
        }

        if let Some(reminder) = &policy.reminder {
            let remind_at = applied_at
                .checked_add_signed(policy.delay)
                .and_then(|close_at| close_at.checked_sub_signed(reminder.delay));

            if let Some(remind_at) = remind_at {
                let already_reminded = history
                    .last_reminder()
                    .is_some_and(|sent| sent >= remind_at);

                if now > remind_at && !already_reminded {
                    debug!(keyword = %keyword, %remind_at, "Reminder due");
                    return PolicyOutcome::Stop(vec![Action::SendReminder {
                        keyword: keyword.clone(),
                        message: reminder.message.clone(),
                    }]);
                }
            }
        }

        if idle && threshold.is_some_and(|threshold| threshold > applied_at) {
            debug!(keyword = %keyword, %applied_at, "Delay elapsed");
            return PolicyOutcome::Stop(close_actions(policy));
        }

        self.evaluate_directive(policy, idle, history)
    }

    /// Close requested by an allowed user through a directive comment
    fn evaluate_directive(
        &self,
        policy: &KeywordPolicy,
        idle: bool,
        history: &InteractionHistory,
    ) -> PolicyOutcome {
        if !idle {
            return PolicyOutcome::Continue;
        }

        let Some(comment) = history.last_comment() else {
            return PolicyOutcome::Continue;
        };

        let directive = policy.directive();
        if !comment
            .body
            .as_deref()
            .is_some_and(|body| body.contains(&directive))
        {
            return PolicyOutcome::Continue;
        }

        let Some(author) = comment.author.as_deref() else {
            return PolicyOutcome::Continue;
        };

        let allowed = policy.users.iter().any(|u| u == author)
            || self.owner.as_deref() == Some(author);
        if !allowed {
            debug!(
                keyword = %policy.keyword,
                author,
                "Ignoring directive from user without permission"
            );
            return PolicyOutcome::Continue;
        }

        info!(keyword = %policy.keyword, author, "Close requested by directive");
        PolicyOutcome::Stop(vec![Action::Close {
            keyword: policy.keyword.clone(),
            message: policy.message.clone(),
        }])
    }
}

fn close_actions(policy: &KeywordPolicy) -> Vec<Action> {
    let mut actions = vec![Action::Close {
        keyword: policy.keyword.clone(),
        message: policy.message.clone(),
    }];
    if policy.remove_label_on_close {
        actions.push(Action::RemoveLabel {
            keyword: policy.keyword.clone(),
        });
    }
    actions
}
