//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **ScriptedChangeFetcher**: 台本どおりにスナップショットを返すレビューシステム
//! - **RecordingSleeper**: 待たずに sleep 時間を記録する Sleeper
//!
//! # 本番用実装
//! 実際のレビューシステムのクライアントは別クレートに置く想定です。
//! 本番用の Sleeper は `ports::TokioSleeper` です。

pub mod recording_sleeper;
pub mod scripted_review;

// 主要な型を再エクスポート
pub use self::recording_sleeper::RecordingSleeper;
pub use self::scripted_review::{ScriptStep, ScriptedChangeFetcher};
