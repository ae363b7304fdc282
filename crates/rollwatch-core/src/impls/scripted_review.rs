//! ScriptedChangeFetcher - 開発用・テスト用のレビューシステム
//!
//! 事前に並べたスナップショット（またはエラー）を poll ごとに 1 つずつ返します。
//! 使い切ったら最後のスナップショットを返し続けます。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChangeId, ChangeSnapshot, FetchError};
use crate::ports::ChangeFetcher;

/// One scripted response.
pub type ScriptStep = Result<ChangeSnapshot, FetchError>;

/// # 使用例
/// ```ignore
/// let fetcher = ScriptedChangeFetcher::new(vec![
///     Ok(ChangeSnapshot::new("NEW").with_label("Commit-Queue", LabelState::new().with_key("approved"))),
///     Ok(ChangeSnapshot::new("MERGED")),
/// ]);
/// ```
pub struct ScriptedChangeFetcher {
    steps: Mutex<VecDeque<ScriptStep>>,
    last: Mutex<Option<ChangeSnapshot>>,
    fetches: AtomicUsize,
}

impl ScriptedChangeFetcher {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Every poll sees the same snapshot.
    pub fn repeating(snapshot: ChangeSnapshot) -> Self {
        Self::new(vec![Ok(snapshot)])
    }

    pub fn from_snapshots(snapshots: Vec<ChangeSnapshot>) -> Self {
        Self::new(snapshots.into_iter().map(Ok).collect())
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeFetcher for ScriptedChangeFetcher {
    async fn fetch(&self, change_id: &ChangeId) -> Result<ChangeSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let next = self.steps.lock().await.pop_front();
        let mut last = self.last.lock().await;
        match next {
            Some(Ok(snapshot)) => {
                *last = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(err)) => Err(err),
            None => last
                .clone()
                .ok_or_else(|| FetchError::NotFound(change_id.clone())),
        }
    }
}
