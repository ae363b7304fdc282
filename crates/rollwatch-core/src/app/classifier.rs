//! TaskOutcomeClassifier - タスク結果の分類
//!
//! 純粋関数だけで構成されます（I/O なし、エラーなし、ログなし）。
//! 判定順序は固定で、より具体的な診断（リソース不足・期限切れ・タイムアウト）を
//! 汎用の失敗より先に返します。

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::{TaskId, TaskOutcome, TaskResult, TaskState};

/// Error record, internal-failure state, or a normal record with no state.
///
/// Checked before everything else: an infra failure invalidates the exit
/// code and the output.
pub fn is_infra_failure(result: &TaskResult) -> bool {
    if result.is_error_record {
        return true;
    }
    match &result.raw_state {
        Some(state) => state.is_internal_failure(),
        None => true,
    }
}

pub fn is_no_resource(result: &TaskResult) -> bool {
    has_state(result, &TaskState::NoResource)
}

pub fn is_expired(result: &TaskResult) -> bool {
    has_state(result, &TaskState::Expired)
}

pub fn is_timed_out(result: &TaskResult) -> bool {
    has_state(result, &TaskState::TimedOut)
}

/// Independent of the timeout/expiry checks; a record can be both.
pub fn is_failure(result: &TaskResult) -> bool {
    !result.is_error_record && result.exit_signaled_failure
}

/// First match wins:
/// infra failure, no resource, expired, timed out + failure, failure, success.
pub fn classify(result: &TaskResult) -> TaskOutcome {
    if is_infra_failure(result) {
        TaskOutcome::InfraFailure
    } else if is_no_resource(result) {
        TaskOutcome::NoResource
    } else if is_expired(result) {
        TaskOutcome::Expired
    } else if is_timed_out(result) && is_failure(result) {
        TaskOutcome::IoTimeout
    } else if is_failure(result) {
        TaskOutcome::TaskFailure
    } else {
        TaskOutcome::Success
    }
}

/// Produced files, unchanged. Empty for error records.
pub fn extract_outputs(result: &TaskResult) -> BTreeMap<String, PathBuf> {
    result.produced_files.clone()
}

fn has_state(result: &TaskResult, expected: &TaskState) -> bool {
    !result.is_error_record && result.raw_state.as_ref() == Some(expected)
}

/// Classification of one collect over several tasks, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    outcomes: Vec<(TaskId, TaskOutcome)>,
}

impl CollectSummary {
    pub fn from_results(results: &[TaskResult]) -> Self {
        let outcomes = results
            .iter()
            .map(|r| (r.task_id.clone(), classify(r)))
            .collect();
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(TaskId, TaskOutcome)] {
        &self.outcomes
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| !o.is_fatal())
    }

    pub fn count(&self, outcome: TaskOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn first_fatal(&self) -> Option<&(TaskId, TaskOutcome)> {
        self.outcomes.iter().find(|(_, o)| o.is_fatal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(state: TaskState, failed: bool) -> TaskResult {
        TaskResult::completed(TaskId::new("t"), state, failed)
    }

    #[rstest]
    #[case::completed_ok(TaskState::Completed, false, TaskOutcome::Success)]
    #[case::completed_failed(TaskState::Completed, true, TaskOutcome::TaskFailure)]
    #[case::timed_out_failed(TaskState::TimedOut, true, TaskOutcome::IoTimeout)]
    #[case::timed_out_not_failed(TaskState::TimedOut, false, TaskOutcome::Success)]
    #[case::no_resource(TaskState::NoResource, false, TaskOutcome::NoResource)]
    #[case::no_resource_failed(TaskState::NoResource, true, TaskOutcome::NoResource)]
    #[case::expired(TaskState::Expired, false, TaskOutcome::Expired)]
    #[case::expired_failed(TaskState::Expired, true, TaskOutcome::Expired)]
    #[case::bot_died(TaskState::BotDied, true, TaskOutcome::InfraFailure)]
    #[case::canceled(TaskState::Canceled, false, TaskOutcome::InfraFailure)]
    #[case::killed(TaskState::Killed, false, TaskOutcome::InfraFailure)]
    #[case::still_running(TaskState::Running, false, TaskOutcome::InfraFailure)]
    fn classify_follows_precedence(
        #[case] state: TaskState,
        #[case] failed: bool,
        #[case] expected: TaskOutcome,
    ) {
        assert_eq!(classify(&record(state, failed)), expected);
    }

    #[rstest]
    #[case(TaskState::Completed)]
    #[case(TaskState::TimedOut)]
    #[case(TaskState::NoResource)]
    #[case(TaskState::Expired)]
    fn error_record_is_always_infra_failure(#[case] state: TaskState) {
        let mut r = TaskResult::error_record(TaskId::new("t"), "rpc failed");
        // Garbage in the ignored fields must not leak into the verdict.
        r.raw_state = Some(state);
        r.exit_signaled_failure = true;

        assert!(is_infra_failure(&r));
        assert!(!is_no_resource(&r));
        assert!(!is_expired(&r));
        assert!(!is_timed_out(&r));
        assert!(!is_failure(&r));
        assert_eq!(classify(&r), TaskOutcome::InfraFailure);
    }

    #[test]
    fn unrecognized_state_fails_safe() {
        let r = record(TaskState::Unrecognized("ZOMBIE".to_string()), false);
        assert_eq!(classify(&r), TaskOutcome::InfraFailure);
    }

    #[test]
    fn missing_state_fails_safe() {
        let mut r = record(TaskState::Completed, false);
        r.raw_state = None;
        assert_eq!(classify(&r), TaskOutcome::InfraFailure);
    }

    #[test]
    fn timed_out_and_failure_are_independent_predicates() {
        let r = record(TaskState::TimedOut, true);
        assert!(is_timed_out(&r));
        assert!(is_failure(&r));
    }

    #[test]
    fn classify_is_idempotent() {
        let r = record(TaskState::TimedOut, true).with_output("slow\n");
        let first = classify(&r);
        let second = classify(&r);
        assert_eq!(first, second);
        assert_eq!(first, TaskOutcome::IoTimeout);
    }

    #[test]
    fn error_record_boom_has_no_outputs() {
        let r = TaskResult::error_record(TaskId::new("t"), "boom");
        assert_eq!(classify(&r), TaskOutcome::InfraFailure);
        assert!(extract_outputs(&r).is_empty());
    }

    #[test]
    fn extract_outputs_is_passthrough() {
        let r = record(TaskState::Completed, false)
            .with_file("summary.json", "/out/summary.json")
            .with_file("syslog.txt", "/out/syslog.txt");
        let outputs = extract_outputs(&r);
        assert_eq!(outputs, r.produced_files);
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn collect_summary_keeps_order_and_counts() {
        let results = vec![
            TaskResult::completed(TaskId::new("a"), TaskState::Completed, false),
            TaskResult::completed(TaskId::new("b"), TaskState::Completed, true),
            TaskResult::error_record(TaskId::new("c"), "boom"),
            TaskResult::completed(TaskId::new("d"), TaskState::Completed, false),
        ];
        let summary = CollectSummary::from_results(&results);

        assert!(!summary.all_succeeded());
        assert_eq!(summary.count(TaskOutcome::Success), 2);
        assert_eq!(summary.count(TaskOutcome::TaskFailure), 1);
        assert_eq!(summary.count(TaskOutcome::InfraFailure), 1);
        assert_eq!(
            summary.first_fatal(),
            Some(&(TaskId::new("b"), TaskOutcome::TaskFailure))
        );
        assert_eq!(summary.outcomes()[2].0, TaskId::new("c"));
    }

    #[test]
    fn empty_collect_succeeds() {
        let summary = CollectSummary::from_results(&[]);
        assert!(summary.all_succeeded());
        assert!(summary.first_fatal().is_none());
    }
}
