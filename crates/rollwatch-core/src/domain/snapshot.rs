//! Change snapshot: one observation of a review-system change.
//!
//! The review system's label state is shared and mutable outside this
//! process, so a snapshot is only valid for the poll that fetched it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// State keys present on one vote label, e.g. `{"approved": {...}}`.
///
/// Values are opaque; only presence of a key matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelState(BTreeMap<String, serde_json::Value>);

impl LabelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into(), serde_json::json!({}));
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// `{status, labels: {<name>: {approved?, recommended?, ...}}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSnapshot {
    pub status: String,

    #[serde(default)]
    pub labels: BTreeMap<String, LabelState>,
}

impl ChangeSnapshot {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, state: LabelState) -> Self {
        self.labels.insert(name.into(), state);
        self
    }

    pub fn is_merged(&self) -> bool {
        self.status.eq_ignore_ascii_case("MERGED")
    }

    pub fn has_label_state(&self, selector: &LabelSelector) -> bool {
        self.labels
            .get(&selector.label)
            .is_some_and(|state| state.has(&selector.state_key))
    }
}

/// Which label state key the poller watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    pub label: String,
    pub state_key: String,
}

impl LabelSelector {
    pub fn new(label: impl Into<String>, state_key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state_key: state_key.into(),
        }
    }

    /// Set while a dry-run evaluation is in progress.
    pub fn default_trial() -> Self {
        Self::new("Commit-Queue", "recommended")
    }

    /// Set while a submit evaluation is in progress; cleared on any failure.
    pub fn default_approval() -> Self {
        Self::new("Commit-Queue", "approved")
    }
}
