//! Timeout handling for coqtop runs.

use std::time::Duration;

/// Timeout requested for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeoutSpec {
    /// Use the learned timeout, or none until one has been learned.
    #[default]
    Adaptive,
    /// Never time out.
    Unlimited,
    /// Time out after a fixed duration.
    Fixed(Duration),
}

impl TimeoutSpec {
    /// Map a configured value: absent is adaptive, zero is unlimited.
    #[must_use]
    pub fn from_secs(secs: Option<u64>) -> Self {
        match secs {
            None => Self::Adaptive,
            Some(0) => Self::Unlimited,
            Some(n) => Self::Fixed(Duration::from_secs(n)),
        }
    }
}

/// Process-lifetime timeout learned from the first successful adaptive run.
#[derive(Debug, Clone, Default)]
pub struct TimeoutPolicy {
    learned: Option<Duration>,
}

impl TimeoutPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The learned timeout, if any.
    #[must_use]
    pub fn learned(&self) -> Option<Duration> {
        self.learned
    }

    /// Effective limit for a run with the given spec.
    #[must_use]
    pub fn resolve(&self, spec: TimeoutSpec) -> Option<Duration> {
        match spec {
            TimeoutSpec::Unlimited => None,
            TimeoutSpec::Fixed(limit) => Some(limit),
            TimeoutSpec::Adaptive => self.learned,
        }
    }

    /// Record a completed run. Only the first adaptive run sets the value;
    /// later runs reuse it.
    pub fn record_run(&mut self, spec: TimeoutSpec, elapsed: Duration) {
        if self.learned.is_some() || spec != TimeoutSpec::Adaptive {
            return;
        }
        let learned = Self::scaled(elapsed);
        tracing::debug!(?elapsed, ?learned, "Learned coqtop timeout");
        self.learned = Some(learned);
    }

    /// Forget the learned value.
    pub fn reset(&mut self) {
        self.learned = None;
    }

    /// Three times the run time, rounded up to whole seconds, at least 3s.
    #[must_use]
    pub fn scaled(elapsed: Duration) -> Duration {
        let secs = elapsed.as_secs() + u64::from(elapsed.subsec_nanos() > 0);
        Duration::from_secs(3 * secs.max(1))
    }
}
