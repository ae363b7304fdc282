//! RollDriver - attempt の生成から report までの配線
//!
//! # フロー
//! 1. IdGenerator で AttemptId を払い出して RollAttempt を作る
//! 2. ReviewRollPoller::run() で終端まで待つ
//! 3. RollReport（outcome + follow-up + link）を返す
//!
//! change の作成・ラベル設定・abandon 自体は呼び出し側の仕事です。

use std::sync::Arc;

use tracing::info;

use crate::app::poller::ReviewRollPoller;
use crate::app::report::{ChangeLink, RollReport};
use crate::config::RollConfig;
use crate::domain::{ChangeId, PollSchedule, RollAttempt, RollError, RollMode};
use crate::ports::{ChangeFetcher, IdGenerator, Sleeper};

pub struct RollDriver {
    poller: ReviewRollPoller,
    id_gen: Arc<dyn IdGenerator>,
    schedule: PollSchedule,
    review_host: Option<String>,
}

impl RollDriver {
    pub fn new(
        poller: ReviewRollPoller,
        id_gen: Arc<dyn IdGenerator>,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            poller,
            id_gen,
            schedule,
            review_host: None,
        }
    }

    /// Build everything from a `RollConfig`.
    ///
    /// Fails fast on an invalid schedule.
    pub fn from_config(
        config: &RollConfig,
        fetcher: Arc<dyn ChangeFetcher>,
        sleeper: Arc<dyn Sleeper>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Result<Self, RollError> {
        let schedule = config.schedule()?;
        let poller = ReviewRollPoller::new(fetcher, sleeper).with_selectors(config.selectors());
        Ok(Self {
            poller,
            id_gen,
            schedule,
            review_host: config.review_host.clone(),
        })
    }

    pub fn with_review_host(mut self, host: impl Into<String>) -> Self {
        self.review_host = Some(host.into());
        self
    }

    /// A fresh attempt for a change that was just pushed for evaluation.
    pub fn new_attempt(&self, change_id: ChangeId, mode: RollMode) -> RollAttempt {
        RollAttempt::new(
            self.id_gen.generate_attempt_id(),
            change_id,
            mode,
            self.schedule,
        )
    }

    /// Poll the change to a terminal outcome and report it.
    ///
    /// Only fetch errors are `Err` here; use `RollReport::into_result` to turn
    /// a failing follow-up into an error.
    pub async fn roll(&self, change_id: ChangeId, mode: RollMode) -> Result<RollReport, RollError> {
        let attempt = self.new_attempt(change_id, mode);
        let outcome = self.poller.run(&attempt).await?;
        let link = ChangeLink::for_change(self.review_host.as_deref(), &attempt.change_id);
        let report = RollReport::new(
            attempt.attempt_id,
            attempt.change_id,
            attempt.mode,
            outcome,
            link,
        );
        info!(
            attempt_id = %report.attempt_id,
            outcome = %report.outcome,
            follow_up = ?report.follow_up,
            "roll reported"
        );
        Ok(report)
    }
}
