//! Strategy selection: transcript segmentation when coqtop supports it,
//! keyword segmentation otherwise.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::SplitterConfig;
use crate::coqtop::{
    Capabilities, CapabilityProbe, CollectError, CoqtopCommand, MemoryStore, OutputStore,
    TimeoutSpec, TranscriptCollector, TRANSCRIPT_FLAGS,
};
use crate::segment::{has_char_runs, join_statements, segment, DefinitionChunk, FallbackSegmenter};

/// Printed by coqtop versions that reject `-time` on the command line.
pub const TIME_FLAG_REJECTED: &str = "know what to do with -time";

/// How a split was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// From coqtop's prompt transcript.
    Transcript,
    /// From statement keywords alone.
    Fallback,
}

/// Result of [`DefinitionSplitter::split`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitOutcome {
    pub strategy: Strategy,
    pub chunks: Vec<DefinitionChunk>,
}

/// Errors from splitting a script.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("coqtop produced no offset information for {statements} statements")]
    NoParseableEvents { statements: usize },
}

/// Splits statements into definitions using a configured coqtop.
#[derive(Debug)]
pub struct DefinitionSplitter<S = MemoryStore> {
    coqtop: PathBuf,
    coqtop_args: Vec<String>,
    timeout: TimeoutSpec,
    working_dir: Option<PathBuf>,
    collector: TranscriptCollector<S>,
    probe: CapabilityProbe,
}

impl DefinitionSplitter<MemoryStore> {
    /// Create a splitter with an in-memory output cache.
    #[must_use]
    pub fn new(config: &SplitterConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }
}

impl<S: OutputStore> DefinitionSplitter<S> {
    /// Create a splitter caching coqtop output in `store`.
    #[must_use]
    pub fn with_store(config: &SplitterConfig, store: S) -> Self {
        Self {
            coqtop: config.coqtop.clone(),
            coqtop_args: config.coqtop_args.clone(),
            timeout: config.timeout(),
            working_dir: config.working_dir.clone(),
            collector: TranscriptCollector::new(store)
                .with_retries(config.spawn_retries, config.retry_delay()),
            probe: CapabilityProbe::new(config.probe_timeout()),
        }
    }

    /// Capabilities of the configured coqtop.
    ///
    /// # Errors
    ///
    /// Returns `CollectError` if coqtop cannot be run.
    pub async fn capabilities(&mut self) -> Result<Capabilities, CollectError> {
        self.probe
            .capabilities(&self.coqtop, &self.coqtop_args, &mut self.collector)
            .await
    }

    /// Split `statements` into top-level definitions.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::Collect` if coqtop cannot be run, and
    /// `SplitError::NoParseableEvents` if its transcript carries no offsets.
    pub async fn split(&mut self, statements: &[String]) -> Result<SplitOutcome, SplitError> {
        let capabilities = self.capabilities().await?;
        if !capabilities.supports_transcript() {
            tracing::info!(
                binary = %self.coqtop.display(),
                "coqtop cannot report offsets, splitting by keywords"
            );
            return Ok(Self::fallback(statements));
        }

        let mut command = CoqtopCommand::new(&self.coqtop)
            .args(TRANSCRIPT_FLAGS)
            .args(self.coqtop_args.iter().cloned())
            .input(join_statements(statements))
            .timeout(self.timeout);
        if let Some(ref dir) = self.working_dir {
            command = command.working_dir(dir);
        }

        let transcript = self.collector.collect(&command).await?.output;

        if transcript
            .lines()
            .next()
            .is_some_and(|line| line.contains(TIME_FLAG_REJECTED))
        {
            tracing::info!("coqtop rejected -time, splitting by keywords");
            return Ok(Self::fallback(statements));
        }

        if !statements.is_empty() && !has_char_runs(&transcript) {
            return Err(SplitError::NoParseableEvents {
                statements: statements.len(),
            });
        }

        let chunks = segment(statements, &transcript);
        tracing::info!(
            statements = statements.len(),
            chunks = chunks.len(),
            "Split script from transcript"
        );
        Ok(SplitOutcome {
            strategy: Strategy::Transcript,
            chunks,
        })
    }

    #[must_use]
    pub fn collector(&self) -> &TranscriptCollector<S> {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut TranscriptCollector<S> {
        &mut self.collector
    }

    #[must_use]
    pub fn probe(&self) -> &CapabilityProbe {
        &self.probe
    }

    fn fallback(statements: &[String]) -> SplitOutcome {
        SplitOutcome {
            strategy: Strategy::Fallback,
            chunks: FallbackSegmenter::new().segment(statements),
        }
    }
}
