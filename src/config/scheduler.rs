//! Expiry scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::ExpirySchedulerConfig;

/// Expiry scheduler settings
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Run the scheduler in this process
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Days before expiry at which warnings go out
    #[serde(default = "default_warning_days")]
    pub warning_days: u32,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Timing handed to the scheduler task.
    pub fn scheduler_config(&self) -> ExpirySchedulerConfig {
        ExpirySchedulerConfig {
            interval: self.interval(),
            warning_days: self.warning_days,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidSchedulerInterval);
        }
        if !(1..=365).contains(&self.warning_days) {
            return Err(ValidationError::InvalidWarningDays);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval(),
            warning_days: default_warning_days(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    24 * 60 * 60
}

fn default_warning_days() -> u32 {
    14
}
