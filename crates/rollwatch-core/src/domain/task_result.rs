//! Task result model: what the task-distribution system reported for one task.
//!
//! A `TaskResult` is built once from the collaborator's response and never
//! mutated afterwards; the classifier only reads it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::ParseError;
use super::ids::TaskId;

/// Execution state as reported by the task-distribution system.
///
/// Unknown strings are kept in `Unrecognized` instead of failing the parse;
/// the classifier treats them as infrastructure failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskState {
    Completed,
    TimedOut,
    Expired,
    NoResource,
    BotDied,
    Canceled,
    Killed,
    Running,
    Unrecognized(String),
}

impl TaskState {
    pub fn parse(s: &str) -> Self {
        match s {
            "COMPLETED" => TaskState::Completed,
            "TIMED_OUT" => TaskState::TimedOut,
            "EXPIRED" => TaskState::Expired,
            "NO_RESOURCE" => TaskState::NoResource,
            "BOT_DIED" => TaskState::BotDied,
            "CANCELED" => TaskState::Canceled,
            "KILLED" => TaskState::Killed,
            "RUNNING" => TaskState::Running,
            other => TaskState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Completed => "COMPLETED",
            TaskState::TimedOut => "TIMED_OUT",
            TaskState::Expired => "EXPIRED",
            TaskState::NoResource => "NO_RESOURCE",
            TaskState::BotDied => "BOT_DIED",
            TaskState::Canceled => "CANCELED",
            TaskState::Killed => "KILLED",
            TaskState::Running => "RUNNING",
            TaskState::Unrecognized(s) => s,
        }
    }

    /// States in the distribution system's "internal failure" bucket.
    pub fn is_internal_failure(&self) -> bool {
        matches!(
            self,
            TaskState::BotDied
                | TaskState::Canceled
                | TaskState::Killed
                | TaskState::Running
                | TaskState::Unrecognized(_)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TaskState::parse(&s))
    }
}

/// Wire shape of one record returned by the task-distribution fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskRecord {
    pub id: TaskId,

    #[serde(default)]
    pub is_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<RawTaskResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskResults {
    pub state: TaskState,

    #[serde(default)]
    pub failure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,

    #[serde(default)]
    pub outputs: BTreeMap<String, PathBuf>,
}

/// The outcome of one distributed compute task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,

    /// The distribution system could not produce a normal result.
    pub is_error_record: bool,

    /// Ignored whenever `is_error_record` is set.
    pub raw_state: Option<TaskState>,

    /// Nonzero exit, or the system flagged `failure`.
    pub exit_signaled_failure: bool,

    /// stdout+stderr of the task, or the error message for error records.
    pub output: String,

    #[serde(default)]
    pub produced_files: BTreeMap<String, PathBuf>,
}

impl TaskResult {
    /// A record for a task the distribution system could not report on.
    pub fn error_record(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            is_error_record: true,
            raw_state: None,
            exit_signaled_failure: false,
            output: message.into(),
            produced_files: BTreeMap::new(),
        }
    }

    /// A normal record in the given state.
    pub fn completed(task_id: TaskId, state: TaskState, failed: bool) -> Self {
        Self {
            task_id,
            is_error_record: false,
            raw_state: Some(state),
            exit_signaled_failure: failed,
            output: String::new(),
            produced_files: BTreeMap::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.produced_files.insert(name.into(), path.into());
        self
    }

    /// Convert the collaborator's raw record.
    ///
    /// Error records keep only the error message; any results block on them is
    /// dropped.
    pub fn from_raw(raw: RawTaskRecord) -> Self {
        if raw.is_error {
            let message = raw.error.or(raw.output).unwrap_or_default();
            return Self::error_record(raw.id, message);
        }

        let output = raw.output.unwrap_or_default();
        match raw.results {
            Some(results) => {
                let nonzero_exit = results.exit_code.is_some_and(|code| code != 0);
                Self {
                    task_id: raw.id,
                    is_error_record: false,
                    raw_state: Some(results.state),
                    exit_signaled_failure: results.failure || nonzero_exit,
                    output,
                    produced_files: results.outputs,
                }
            }
            None => Self {
                task_id: raw.id,
                is_error_record: false,
                raw_state: None,
                exit_signaled_failure: false,
                output,
                produced_files: BTreeMap::new(),
            },
        }
    }

    pub fn from_json(s: &str) -> Result<Self, ParseError> {
        let raw: RawTaskRecord = serde_json::from_str(s)?;
        Ok(Self::from_raw(raw))
    }

    /// Parse either a single record or an array of records.
    pub fn many_from_json(s: &str) -> Result<Vec<Self>, ParseError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let raws: Vec<RawTaskRecord> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            vec![serde_json::from_value(value)?]
        };
        Ok(raws.into_iter().map(Self::from_raw).collect())
    }
}
