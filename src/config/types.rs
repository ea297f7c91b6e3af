//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coqtop::{TimeoutSpec, DEFAULT_RETRY_DELAY, DEFAULT_SPAWN_RETRIES};

/// Configuration for splitting scripts with coqtop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Path to the coqtop binary.
    #[serde(default = "default_coqtop")]
    pub coqtop: PathBuf,
    /// Extra arguments passed to coqtop on every run (e.g. `-R . Top`).
    #[serde(default)]
    pub coqtop_args: Vec<String>,
    /// Timeout for the transcript run in seconds. Absent learns one from the
    /// first run; zero disables it.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Timeout for the proof-term capability check in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// How many times a failed spawn is retried.
    #[serde(default = "default_spawn_retries")]
    pub spawn_retries: u32,
    /// Delay between spawn retries in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Working directory for coqtop.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn default_coqtop() -> PathBuf {
    PathBuf::from("coqtop")
}

fn default_probe_timeout_secs() -> u64 {
    1
}

fn default_spawn_retries() -> u32 {
    DEFAULT_SPAWN_RETRIES
}

fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY.as_secs()
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            coqtop: default_coqtop(),
            coqtop_args: Vec::new(),
            timeout_secs: None,
            probe_timeout_secs: default_probe_timeout_secs(),
            spawn_retries: default_spawn_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            working_dir: None,
        }
    }
}

impl SplitterConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if `text` is not a valid configuration.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Timeout for the transcript run.
    #[must_use]
    pub fn timeout(&self) -> TimeoutSpec {
        TimeoutSpec::from_secs(self.timeout_secs)
    }

    /// Timeout for the proof-term check.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Delay between spawn retries.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
