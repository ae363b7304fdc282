//! Outcome model: closed classifications for tasks and rolls.
//!
//! Both enums are exhaustive on purpose so every consumer has to handle every
//! case. Neither is an error type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a distributed task result.
///
/// Serialized as SCREAMING_SNAKE_CASE (SUCCESS / TASK_FAILURE / ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    /// The distribution system or the bot failed; output is meaningless.
    InfraFailure,

    /// No bot matched the task's dimensions.
    NoResource,

    /// The task was never picked up before its expiration.
    Expired,

    /// The task ran and failed because its watchdog fired.
    IoTimeout,

    /// The task ran and failed.
    TaskFailure,

    Success,
}

impl TaskOutcome {
    pub const ALL: [TaskOutcome; 6] = [
        TaskOutcome::InfraFailure,
        TaskOutcome::NoResource,
        TaskOutcome::Expired,
        TaskOutcome::IoTimeout,
        TaskOutcome::TaskFailure,
        TaskOutcome::Success,
    ];

    pub fn is_fatal(self) -> bool {
        !matches!(self, TaskOutcome::Success)
    }

    /// Whether the fix is on the fleet side (retry/escalate) rather than in the code.
    pub fn is_infra_side(self) -> bool {
        matches!(
            self,
            TaskOutcome::InfraFailure | TaskOutcome::NoResource | TaskOutcome::Expired
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskOutcome::InfraFailure => "INFRA_FAILURE",
            TaskOutcome::NoResource => "NO_RESOURCE",
            TaskOutcome::Expired => "EXPIRED",
            TaskOutcome::IoTimeout => "IO_TIMEOUT",
            TaskOutcome::TaskFailure => "TASK_FAILURE",
            TaskOutcome::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a roll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollOutcome {
    /// Production: merged. Dry run: the trial evaluation finished.
    Success,
    Failure,
    TimedOut,
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RollOutcome::Success => "SUCCESS",
            RollOutcome::Failure => "FAILURE",
            RollOutcome::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

/// Result of a single poll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Done(RollOutcome),
}

impl PollStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollStatus::Done(_))
    }
}
