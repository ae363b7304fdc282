//! Errors - エラー型と分類
//!
//! 「タスクが失敗した」「roll がタイムアウトした」は CI では日常なので
//! エラーではなく値（`TaskOutcome` / `RollOutcome`）で返します。
//! ここにあるのは、判定そのものができなかったケースだけです。

use thiserror::Error;

use super::ids::ChangeId;

/// Failure while fetching a change snapshot from the review system.
///
/// Never retried by the poller; it surfaces to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("change not found: {0}")]
    NotFound(ChangeId),

    #[error("malformed review response: {0}")]
    Malformed(String),
}

/// Errors surfaced by a roll.
#[derive(Debug, Error)]
pub enum RollError {
    #[error("failed to fetch change {change_id}")]
    Fetch {
        change_id: ChangeId,
        #[source]
        source: FetchError,
    },

    /// The review system reached a failing verdict (or never reached one).
    #[error("{reason}: {link}")]
    RollFailed { reason: String, link: String },

    #[error("invalid roll configuration: {0}")]
    Config(String),
}

/// Errors while parsing a raw task-distribution record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid task record json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors while loading a `RollConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for RollError {
    fn from(err: ConfigError) -> Self {
        RollError::Config(err.to_string())
    }
}
