//! Cached, retrying transcript collection.

use std::time::Duration;

use super::{run, CollectError, CoqOutput, CoqtopCommand, MemoryStore, OutputStore, TimeoutPolicy};

/// Default number of times a failed spawn is retried.
pub const DEFAULT_SPAWN_RETRIES: u32 = 3;

/// Default delay between spawn retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Runs coqtop commands, reusing stored output for repeated invocations.
#[derive(Debug)]
pub struct TranscriptCollector<S = MemoryStore> {
    store: S,
    timeouts: TimeoutPolicy,
    spawn_retries: u32,
    retry_delay: Duration,
    runs: usize,
}

impl Default for TranscriptCollector<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: OutputStore> TranscriptCollector<S> {
    /// Create a collector backed by `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeouts: TimeoutPolicy::new(),
            spawn_retries: DEFAULT_SPAWN_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            runs: 0,
        }
    }

    /// Set how often and how long to wait when a spawn fails transiently.
    #[must_use]
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.spawn_retries = retries;
        self.retry_delay = delay;
        self
    }

    /// Return the output of `command`, running it only if the store has no
    /// entry for it.
    ///
    /// # Errors
    ///
    /// Returns `CollectError` if the process cannot be run.
    pub async fn collect(&mut self, command: &CoqtopCommand) -> Result<CoqOutput, CollectError> {
        if let Some(cached) = self.store.get(command) {
            tracing::debug!(command = %command.display(), "Using stored coqtop output");
            return Ok(cached);
        }

        let limit = self.timeouts.resolve(command.get_timeout());
        let output = self.run_with_retries(command, limit).await?;

        if !output.timed_out {
            self.timeouts
                .record_run(command.get_timeout(), output.elapsed);
        }
        self.store.insert(command.clone(), output.clone());
        Ok(output)
    }

    /// Drop the stored output for `command`.
    pub fn invalidate(&mut self, command: &CoqtopCommand) -> bool {
        self.store.invalidate(command)
    }

    /// Number of processes actually spawned.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.runs
    }

    #[must_use]
    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Forget the learned timeout.
    pub fn reset_timeout(&mut self) {
        self.timeouts.reset();
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    async fn run_with_retries(
        &mut self,
        command: &CoqtopCommand,
        limit: Option<Duration>,
    ) -> Result<CoqOutput, CollectError> {
        let mut attempt = 0;
        loop {
            self.runs += 1;
            match run(command, limit).await {
                Ok(output) => return Ok(output),
                Err(e) if e.is_transient() && attempt < self.spawn_retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay = ?self.retry_delay,
                        command = %command.display(),
                        "Running coqtop failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
