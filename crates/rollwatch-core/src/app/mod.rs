//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **classifier**: タスク結果の分類（純粋関数）
//! - **ReviewRollPoller**: roll の完了待ちループ（fetch→poll_once→sleep）
//! - **RollDriver**: attempt 生成 → poll → report の配線
//! - **report**: follow-up の決定とユーザー向け文面

pub mod classifier;
pub mod driver;
pub mod poller;
pub mod report;

// 主要な型を再エクスポート
pub use self::classifier::{
    CollectSummary, classify, extract_outputs, is_expired, is_failure, is_infra_failure,
    is_no_resource, is_timed_out,
};
pub use self::driver::RollDriver;
pub use self::poller::{ReviewRollPoller, poll_once};
pub use self::report::{ChangeLink, FollowUp, RollReport, describe_task_outcome, output_tail};
