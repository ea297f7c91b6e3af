//! Detecting whether a coqtop binary can echo statement offsets.
//!
//! The transcript strategy needs `-time`, and some coqtop versions break
//! proofs given as a term (`Proof (fun x => x).`) when `-time` is on. Both
//! are checked once per binary and the answer is kept for the lifetime of
//! the probe.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::{CollectError, CoqtopCommand, OutputStore, TimeoutSpec, TranscriptCollector};

/// Lemma whose proof term is lost by affected coqtop versions under `-time`.
pub const PROOF_TERM_LEMMA: &str = "Lemma foo : forall _ : Type, Type.\nProof (fun x => x).";

/// Error printed when the proof term was lost.
pub const INCOMPLETE_PROOF_ERROR: &str = "Error: Attempt to save an incomplete proof";

/// Default limit for the proof-term check.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// What a coqtop binary supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// `--help` lists `-time`.
    pub accepts_time: bool,
    /// The proof-term lemma is accepted under `-time`. Not checked, and
    /// false, when `-time` is not accepted.
    pub proof_term_works_with_time: bool,
}

impl Capabilities {
    /// Returns true if the transcript strategy can be used.
    #[must_use]
    pub fn supports_transcript(&self) -> bool {
        self.accepts_time && self.proof_term_works_with_time
    }
}

/// Per-binary capability cache.
#[derive(Debug)]
pub struct CapabilityProbe {
    known: HashMap<PathBuf, Capabilities>,
    probe_timeout: Duration,
}

impl Default for CapabilityProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl CapabilityProbe {
    #[must_use]
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            known: HashMap::new(),
            probe_timeout,
        }
    }

    /// Previously probed capabilities of `binary`.
    #[must_use]
    pub fn cached(&self, binary: &Path) -> Option<Capabilities> {
        self.known.get(binary).copied()
    }

    /// Probe `binary`, or return the remembered answer.
    ///
    /// `args` follow the probe flags on every run.
    ///
    /// # Errors
    ///
    /// Returns `CollectError` if coqtop cannot be run at all.
    pub async fn capabilities<S: OutputStore>(
        &mut self,
        binary: &Path,
        args: &[String],
        collector: &mut TranscriptCollector<S>,
    ) -> Result<Capabilities, CollectError> {
        if let Some(known) = self.cached(binary) {
            return Ok(known);
        }

        let help = CoqtopCommand::new(binary)
            .args(["-q", "--help"])
            .args(args.iter().cloned())
            .timeout(TimeoutSpec::Unlimited);
        let accepts_time = collector.collect(&help).await?.output.contains("-time");

        let proof_term_works_with_time = if accepts_time {
            let check = CoqtopCommand::new(binary)
                .args(["-time", "-q"])
                .args(args.iter().cloned())
                .input(PROOF_TERM_LEMMA)
                .timeout(TimeoutSpec::Fixed(self.probe_timeout));
            !collector
                .collect(&check)
                .await?
                .output
                .contains(INCOMPLETE_PROOF_ERROR)
        } else {
            false
        };

        let capabilities = Capabilities {
            accepts_time,
            proof_term_works_with_time,
        };
        tracing::info!(
            binary = %binary.display(),
            accepts_time,
            proof_term_works_with_time,
            "Probed coqtop capabilities"
        );
        self.known.insert(binary.to_path_buf(), capabilities);
        Ok(capabilities)
    }
}
