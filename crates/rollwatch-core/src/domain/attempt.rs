//! Roll attempt model: one in-flight evaluation of one change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::ids::{AttemptId, ChangeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    /// Trial the change only; it is always abandoned afterwards.
    DryRun,
    /// Evaluate and land the change.
    Production,
}

/// Poll cadence and overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    interval: Duration,
    timeout: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self { interval, timeout })
    }

    pub fn from_secs(interval_secs: u64, timeout_secs: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `floor(timeout / interval)`, but at least one: a timeout shorter than
    /// the interval still gets a single immediate check.
    pub fn max_polls(&self) -> u64 {
        let polls = self.timeout.as_nanos() / self.interval.as_nanos();
        u64::try_from(polls).unwrap_or(u64::MAX).max(1)
    }
}

/// One roll attempt, owned by a single poll loop and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollAttempt {
    pub attempt_id: AttemptId,
    pub change_id: ChangeId,
    pub mode: RollMode,
    pub schedule: PollSchedule,
}

impl RollAttempt {
    pub fn new(
        attempt_id: AttemptId,
        change_id: ChangeId,
        mode: RollMode,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            attempt_id,
            change_id,
            mode,
            schedule,
        }
    }
}
