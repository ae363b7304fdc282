//! Roll configuration loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;
use crate::domain::{LabelSelector, PollSchedule};

fn default_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    3600
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollConfig {
    #[serde(default = "default_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub poll_timeout_secs: u64,

    /// Host used to build change links in failure reports.
    #[serde(default)]
    pub review_host: Option<String>,

    #[serde(default = "LabelSelector::default_trial")]
    pub trial_label: LabelSelector,

    #[serde(default = "LabelSelector::default_approval")]
    pub approval_label: LabelSelector,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_interval(),
            poll_timeout_secs: default_timeout(),
            review_host: None,
            trial_label: LabelSelector::default_trial(),
            approval_label: LabelSelector::default_approval(),
        }
    }
}

impl RollConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn schedule(&self) -> Result<PollSchedule, ConfigError> {
        PollSchedule::from_secs(self.poll_interval_secs, self.poll_timeout_secs)
    }

    pub fn selectors(&self) -> LabelSelectors {
        LabelSelectors {
            trial: self.trial_label.clone(),
            approval: self.approval_label.clone(),
        }
    }
}

/// The pair of label states the poller watches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSelectors {
    pub trial: LabelSelector,
    pub approval: LabelSelector,
}

impl Default for LabelSelectors {
    fn default() -> Self {
        Self {
            trial: LabelSelector::default_trial(),
            approval: LabelSelector::default_approval(),
        }
    }
}
