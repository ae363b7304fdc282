//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（レビューシステム、タイマー、時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! タスク配信システムの結果取得は port にしていません。
//! 呼び出し側がパース済みの `TaskResult` を渡す前提です。

pub mod change_fetcher;
pub mod clock;
pub mod id_generator;
pub mod sleeper;

// 主要な trait を再エクスポート
pub use self::change_fetcher::ChangeFetcher;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sleeper::{Sleeper, TokioSleeper};
