//! Domain model (IDs, task results, roll attempts, snapshots, outcomes, errors).

pub mod attempt;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod snapshot;
pub mod task_result;

pub use attempt::{PollSchedule, RollAttempt, RollMode};
pub use errors::{ConfigError, FetchError, ParseError, RollError};
pub use ids::{AttemptId, ChangeId, TaskId};
pub use outcome::{PollStatus, RollOutcome, TaskOutcome};
pub use snapshot::{ChangeSnapshot, LabelSelector, LabelState};
pub use task_result::{RawTaskRecord, RawTaskResults, TaskResult, TaskState};
