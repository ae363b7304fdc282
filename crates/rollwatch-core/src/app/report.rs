//! Report - 判定結果を呼び出し側の後処理につなぐ
//!
//! classifier と poller は判定だけを返します。ここでは
//! 「次に何をするか」（abandon するか、エラーにするか）と
//! ユーザー向けの文面を組み立てます。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AttemptId, ChangeId, RollError, RollMode, RollOutcome, TaskOutcome, TaskResult,
};

/// What the caller should do with the change after a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FollowUp {
    /// Merged; nothing left to do.
    Nothing,

    /// Dry run finished; clean the change up.
    Abandon,

    /// Abandon the change and surface an error.
    AbandonAndFail { reason: String },
}

impl FollowUp {
    pub fn for_outcome(mode: RollMode, outcome: RollOutcome) -> Self {
        match (mode, outcome) {
            (RollMode::Production, RollOutcome::Success) => FollowUp::Nothing,
            (RollMode::DryRun, RollOutcome::Success) => FollowUp::Abandon,
            (_, RollOutcome::Failure) => FollowUp::AbandonAndFail {
                reason: "failed to roll changes".to_string(),
            },
            (_, RollOutcome::TimedOut) => FollowUp::AbandonAndFail {
                reason: "timed out waiting for the change to land".to_string(),
            },
        }
    }

    pub fn abandons(&self) -> bool {
        !matches!(self, FollowUp::Nothing)
    }
}

/// Link to a change in the review system's web UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLink(String);

impl ChangeLink {
    pub fn new(host: &str, change_id: &ChangeId) -> Self {
        let host = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Self(format!("https://{host}/c/{change_id}"))
    }

    /// Falls back to the bare change id when no host is configured.
    pub fn for_change(host: Option<&str>, change_id: &ChangeId) -> Self {
        match host {
            Some(host) => Self::new(host, change_id),
            None => Self(change_id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal state of one roll plus the follow-up it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollReport {
    pub attempt_id: AttemptId,
    pub change_id: ChangeId,
    pub mode: RollMode,
    pub outcome: RollOutcome,
    pub follow_up: FollowUp,
    pub link: ChangeLink,
}

impl RollReport {
    pub fn new(
        attempt_id: AttemptId,
        change_id: ChangeId,
        mode: RollMode,
        outcome: RollOutcome,
        link: ChangeLink,
    ) -> Self {
        Self {
            attempt_id,
            change_id,
            mode,
            outcome,
            follow_up: FollowUp::for_outcome(mode, outcome),
            link,
        }
    }

    /// `Err(RollFailed)` for the failing follow-ups.
    pub fn into_result(self) -> Result<RollReport, RollError> {
        match &self.follow_up {
            FollowUp::AbandonAndFail { reason } => Err(RollError::RollFailed {
                reason: reason.clone(),
                link: self.link.to_string(),
            }),
            FollowUp::Nothing | FollowUp::Abandon => Ok(self),
        }
    }
}

/// Last `n` lines of task output.
pub fn output_tail(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// User-facing text for a classified task.
///
/// `IoTimeout` carries only the tail of the output; other fatal outcomes
/// carry all of it.
pub fn describe_task_outcome(result: &TaskResult, outcome: TaskOutcome, tail_lines: usize) -> String {
    let id = &result.task_id;
    match outcome {
        TaskOutcome::Success => format!("task {id} passed"),
        TaskOutcome::IoTimeout => format!(
            "task {id} timed out; last {tail_lines} lines of output:\n{}",
            output_tail(&result.output, tail_lines)
        ),
        TaskOutcome::InfraFailure => format!("task {id} hit an infra failure:\n{}", result.output),
        TaskOutcome::NoResource => format!("task {id}: no bots available:\n{}", result.output),
        TaskOutcome::Expired => format!("task {id} expired before it ran:\n{}", result.output),
        TaskOutcome::TaskFailure => format!("task {id} failed:\n{}", result.output),
    }
}
