//! ReviewRollPoller - roll の完了待ちループ
//!
//! # フロー
//! 1. max_polls = max(1, floor(timeout / interval))
//! 2. ChangeFetcher::fetch() でスナップショット取得
//! 3. poll_once() で判定（純粋関数）
//! 4. 終端なら返す。そうでなければ Sleeper::sleep(interval) して 2 へ
//! 5. 回数を使い切ったら TimedOut
//!
//! タイムアウトは poll 回数だけで決まります（OS タイマーは使いません）。
//! fetch が遅いと実経過時間は timeout を最大 1 回分の fetch 時間だけ超えます。

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::LabelSelectors;
use crate::domain::{ChangeSnapshot, PollStatus, RollAttempt, RollError, RollMode, RollOutcome};
use crate::ports::{ChangeFetcher, Sleeper};

/// One transition of the roll state machine.
///
/// - DryRun: the trial label state is cleared when evaluation finishes,
///   pass or fail, so its absence means `Success` (evaluation done).
/// - Production: merged means `Success`. Otherwise a cleared approval label
///   state means `Failure`. Merge status is checked first because a merged
///   change does not necessarily still carry the approval label.
pub fn poll_once(
    mode: RollMode,
    snapshot: &ChangeSnapshot,
    selectors: &LabelSelectors,
) -> PollStatus {
    match mode {
        RollMode::DryRun => {
            if snapshot.has_label_state(&selectors.trial) {
                PollStatus::Pending
            } else {
                PollStatus::Done(RollOutcome::Success)
            }
        }
        RollMode::Production => {
            if snapshot.is_merged() {
                PollStatus::Done(RollOutcome::Success)
            } else if !snapshot.has_label_state(&selectors.approval) {
                PollStatus::Done(RollOutcome::Failure)
            } else {
                PollStatus::Pending
            }
        }
    }
}

/// Drives a `RollAttempt` from pending to a terminal `RollOutcome`.
///
/// One `run` owns its attempt exclusively; fetch, step and sleep strictly
/// alternate. Independent changes get independent `run` calls.
pub struct ReviewRollPoller {
    fetcher: Arc<dyn ChangeFetcher>,
    sleeper: Arc<dyn Sleeper>,
    selectors: LabelSelectors,
}

impl ReviewRollPoller {
    pub fn new(fetcher: Arc<dyn ChangeFetcher>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            fetcher,
            sleeper,
            selectors: LabelSelectors::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: LabelSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn selectors(&self) -> &LabelSelectors {
        &self.selectors
    }

    /// Poll until terminal or until the poll budget is spent.
    ///
    /// Fetch errors are returned immediately, without retry and without
    /// sleeping. They are distinct from `Failure`/`TimedOut`, which are the
    /// review system's own verdicts.
    pub async fn run(&self, attempt: &RollAttempt) -> Result<RollOutcome, RollError> {
        let span = info_span!(
            "roll_poll",
            attempt_id = %attempt.attempt_id,
            change_id = %attempt.change_id,
            mode = ?attempt.mode,
        );
        self.run_inner(attempt).instrument(span).await
    }

    async fn run_inner(&self, attempt: &RollAttempt) -> Result<RollOutcome, RollError> {
        let max_polls = attempt.schedule.max_polls();
        let interval = attempt.schedule.interval();

        for poll in 1..=max_polls {
            let snapshot = match self.fetcher.fetch(&attempt.change_id).await {
                Ok(snapshot) => snapshot,
                Err(source) => {
                    warn!(poll, error = %source, "failed to fetch change");
                    return Err(RollError::Fetch {
                        change_id: attempt.change_id.clone(),
                        source,
                    });
                }
            };

            let status = poll_once(attempt.mode, &snapshot, &self.selectors);
            debug!(poll, max_polls, change_status = %snapshot.status, ?status, "polled change");

            if let PollStatus::Done(outcome) = status {
                info!(poll, %outcome, "roll finished");
                return Ok(outcome);
            }

            self.sleeper.sleep(interval).await;
        }

        info!(max_polls, "roll timed out");
        Ok(RollOutcome::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{
        AttemptId, ChangeId, FetchError, LabelSelector, LabelState, PollSchedule,
    };
    use crate::impls::{RecordingSleeper, ScriptedChangeFetcher};
    use rstest::rstest;
    use ulid::Ulid;

    fn attempt(mode: RollMode, interval: u64, timeout: u64) -> RollAttempt {
        RollAttempt::new(
            AttemptId::from_ulid(Ulid::new()),
            ChangeId::new("I0123abcd"),
            mode,
            PollSchedule::from_secs(interval, timeout).unwrap(),
        )
    }

    fn cq(keys: &[&str]) -> LabelState {
        keys.iter()
            .fold(LabelState::new(), |state, key| state.with_key(*key))
    }

    fn new_with(status: &str, keys: &[&str]) -> ChangeSnapshot {
        ChangeSnapshot::new(status).with_label("Commit-Queue", cq(keys))
    }

    struct Harness {
        fetcher: Arc<ScriptedChangeFetcher>,
        sleeper: Arc<RecordingSleeper>,
        poller: ReviewRollPoller,
    }

    fn harness(fetcher: ScriptedChangeFetcher) -> Harness {
        let fetcher = Arc::new(fetcher);
        let sleeper = Arc::new(RecordingSleeper::new());
        let poller = ReviewRollPoller::new(fetcher.clone(), sleeper.clone());
        Harness {
            fetcher,
            sleeper,
            poller,
        }
    }

    #[rstest]
    #[case::dry_run_trial_cleared(RollMode::DryRun, new_with("NEW", &[]), PollStatus::Done(RollOutcome::Success))]
    #[case::dry_run_trial_set(RollMode::DryRun, new_with("NEW", &["recommended"]), PollStatus::Pending)]
    #[case::dry_run_ignores_approval(RollMode::DryRun, new_with("NEW", &["approved"]), PollStatus::Done(RollOutcome::Success))]
    #[case::prod_merged(RollMode::Production, new_with("MERGED", &[]), PollStatus::Done(RollOutcome::Success))]
    #[case::prod_merged_label_still_set(RollMode::Production, new_with("MERGED", &["approved"]), PollStatus::Done(RollOutcome::Success))]
    #[case::prod_approval_cleared(RollMode::Production, new_with("NEW", &[]), PollStatus::Done(RollOutcome::Failure))]
    #[case::prod_in_progress(RollMode::Production, new_with("NEW", &["approved"]), PollStatus::Pending)]
    fn poll_once_transitions(
        #[case] mode: RollMode,
        #[case] snapshot: ChangeSnapshot,
        #[case] expected: PollStatus,
    ) {
        assert_eq!(
            poll_once(mode, &snapshot, &LabelSelectors::default()),
            expected
        );
    }

    #[test]
    fn poll_once_uses_configured_selectors() {
        let selectors = LabelSelectors {
            trial: LabelSelector::new("Dry-Run", "value"),
            approval: LabelSelector::new("Auto-Submit", "approved"),
        };
        let snap = ChangeSnapshot::new("NEW")
            .with_label("Auto-Submit", cq(&["approved"]))
            .with_label("Dry-Run", cq(&["value"]));

        assert_eq!(poll_once(RollMode::Production, &snap, &selectors), PollStatus::Pending);
        assert_eq!(poll_once(RollMode::DryRun, &snap, &selectors), PollStatus::Pending);
    }

    #[tokio::test]
    async fn dry_run_completes_on_first_poll_when_trial_absent() {
        let h = harness(ScriptedChangeFetcher::repeating(new_with("NEW", &[])));

        let outcome = h.poller.run(&attempt(RollMode::DryRun, 10, 60)).await.unwrap();

        assert_eq!(outcome, RollOutcome::Success);
        assert_eq!(h.fetcher.fetch_count(), 1);
        assert!(h.sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn production_merged_on_first_poll() {
        let h = harness(ScriptedChangeFetcher::repeating(ChangeSnapshot::new("MERGED")));

        let outcome = h
            .poller
            .run(&attempt(RollMode::Production, 10, 60))
            .await
            .unwrap();

        assert_eq!(outcome, RollOutcome::Success);
        assert_eq!(h.fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn production_fails_when_approval_cleared() {
        let h = harness(ScriptedChangeFetcher::repeating(new_with("NEW", &[])));

        let outcome = h
            .poller
            .run(&attempt(RollMode::Production, 10, 60))
            .await
            .unwrap();

        assert_eq!(outcome, RollOutcome::Failure);
        assert_eq!(h.fetcher.fetch_count(), 1);
        assert!(h.sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn production_times_out_after_max_polls() {
        let h = harness(ScriptedChangeFetcher::repeating(new_with("NEW", &["approved"])));

        let outcome = h
            .poller
            .run(&attempt(RollMode::Production, 10, 60))
            .await
            .unwrap();

        assert_eq!(outcome, RollOutcome::TimedOut);
        assert_eq!(h.fetcher.fetch_count(), 6);
        assert_eq!(h.sleeper.calls(), vec![Duration::from_secs(10); 6]);
    }

    #[tokio::test]
    async fn timeout_shorter_than_interval_polls_once() {
        let h = harness(ScriptedChangeFetcher::repeating(new_with("NEW", &["approved"])));

        let outcome = h
            .poller
            .run(&attempt(RollMode::Production, 60, 5))
            .await
            .unwrap();

        assert_eq!(outcome, RollOutcome::TimedOut);
        assert_eq!(h.fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn merges_after_a_few_pending_polls() {
        let h = harness(ScriptedChangeFetcher::from_snapshots(vec![
            new_with("NEW", &["approved"]),
            new_with("NEW", &["approved"]),
            ChangeSnapshot::new("MERGED"),
        ]));

        let outcome = h
            .poller
            .run(&attempt(RollMode::Production, 30, 600))
            .await
            .unwrap();

        assert_eq!(outcome, RollOutcome::Success);
        assert_eq!(h.fetcher.fetch_count(), 3);
        assert_eq!(h.sleeper.total(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn dry_run_waits_for_trial_to_clear() {
        let h = harness(ScriptedChangeFetcher::from_snapshots(vec![
            new_with("NEW", &["recommended"]),
            new_with("NEW", &[]),
        ]));

        let outcome = h.poller.run(&attempt(RollMode::DryRun, 5, 60)).await.unwrap();

        assert_eq!(outcome, RollOutcome::Success);
        assert_eq!(h.fetcher.fetch_count(), 2);
        assert_eq!(h.sleeper.calls(), vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn fetch_error_propagates_without_retry() {
        let h = harness(ScriptedChangeFetcher::new(vec![
            Ok(new_with("NEW", &["approved"])),
            Err(FetchError::Transport("503".to_string())),
            Ok(ChangeSnapshot::new("MERGED")),
        ]));

        let err = h
            .poller
            .run(&attempt(RollMode::Production, 10, 60))
            .await
            .unwrap_err();

        match err {
            RollError::Fetch { change_id, source } => {
                assert_eq!(change_id, ChangeId::new("I0123abcd"));
                assert_eq!(source, FetchError::Transport("503".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.fetcher.fetch_count(), 2);
        assert_eq!(h.sleeper.calls().len(), 1);
    }
}
