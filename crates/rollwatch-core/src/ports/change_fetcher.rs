//! ChangeFetcher port - レビューシステムからの状態取得
//!
//! 毎回の poll で必ず再取得します。キャッシュはしません
//! （ラベル状態はこのプロセスの外で勝手に変わるため）。

use async_trait::async_trait;

use crate::domain::{ChangeId, ChangeSnapshot, FetchError};

/// ChangeFetcher は change の status とラベル状態のスナップショットを返す
///
/// # エラー
/// - 通信エラーなどは FetchError で返す（リトライは呼び出し側の責任）
#[async_trait]
pub trait ChangeFetcher: Send + Sync {
    async fn fetch(&self, change_id: &ChangeId) -> Result<ChangeSnapshot, FetchError>;
}
