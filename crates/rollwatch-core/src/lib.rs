//! rollwatch-core
//!
//! Decision logic for CI pipelines that hand work to a task-distribution
//! service and land changes through a code-review system.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task_result, attempt, snapshot, outcome, errors）
//! - **ports**: 抽象化レイヤー（ChangeFetcher, Sleeper, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（classifier, poller, driver, report）
//! - **impls**: 実装（ScriptedChangeFetcher など開発用）
//! - **config**: TOML からの RollConfig 読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{CollectSummary, ReviewRollPoller, RollDriver, RollReport, classify};
pub use config::{LabelSelectors, RollConfig};
pub use domain::{RollError, RollMode, RollOutcome, TaskOutcome, TaskResult};
