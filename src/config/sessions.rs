//! `[sessions]` section: idle expiry of tutor sessions

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionsConfig {
    /// Sessions untouched for this long are dropped. 0 keeps them forever.
    pub idle_timeout_secs: u64,
    /// How often the registry is swept
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSessionsConfig {
    pub idle_timeout_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

impl SessionsConfig {
    pub fn from_file(file: Option<FileSessionsConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            idle_timeout_secs: file.idle_timeout_secs.unwrap_or(defaults.idle_timeout_secs),
            // A zero interval would make tokio::time::interval panic
            sweep_interval_secs: file
                .sweep_interval_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval_secs),
        }
    }

    /// `None` when expiry is switched off
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
