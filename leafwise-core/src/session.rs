//! Caller-side glue tying acquisition, diagnosis, and history together.
//!
//! A [`DiagnosisSession`] owns one [`ImageSource`], one
//! [`DiagnosisOrchestrator`], and one [`HistoryStore`], and enforces the
//! stale-result policy: every diagnosis is tagged with the generation of
//! the artifact it was issued for, and a result arriving after that
//! artifact was superseded is dropped as a no-op, never an error.

use thiserror::Error;
use tracing::warn;

use crate::artifact::ImageArtifact;
use crate::camera::FrameSource;
use crate::diagnose::{DiagnosisError, DiagnosisOrchestrator, DiagnosisResult};
use crate::history::{HistoryEntry, HistoryStore, StorageMedium};
use crate::source::ImageSource;

/// Why an analysis could not run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("no image artifact is ready")]
    NoArtifact,

    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),
}

/// What became of a completed diagnosis.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// The result is current and was recorded in history.
    Completed(DiagnosisResult),
    /// The artifact was superseded while the diagnosis was in flight; the
    /// result was discarded.
    Stale,
}

/// One user-facing diagnosis session. Methods take `&mut self`, so at most
/// one diagnosis is in flight at a time.
pub struct DiagnosisSession<S: FrameSource, M: StorageMedium> {
    source: ImageSource<S>,
    orchestrator: DiagnosisOrchestrator,
    history: HistoryStore<M>,
}

impl<S: FrameSource, M: StorageMedium> DiagnosisSession<S, M> {
    pub fn new(
        source: ImageSource<S>,
        orchestrator: DiagnosisOrchestrator,
        history: HistoryStore<M>,
    ) -> Self {
        Self {
            source,
            orchestrator,
            history,
        }
    }

    pub fn source(&self) -> &ImageSource<S> {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut ImageSource<S> {
        &mut self.source
    }

    pub fn history(&self) -> &HistoryStore<M> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<M> {
        &mut self.history
    }

    /// Diagnose the current artifact and commit the result.
    pub async fn analyze(&mut self) -> Result<AnalysisOutcome, AnalyzeError> {
        let (artifact, generation) = match self.source.artifact() {
            Some(artifact) => (artifact.clone(), self.source.generation()),
            None => return Err(AnalyzeError::NoArtifact),
        };

        let result = self.orchestrator.diagnose(&artifact).await?;
        Ok(self.commit(generation, &artifact, result).await)
    }

    /// Commit a diagnosis computed for the artifact of `generation`.
    ///
    /// A generation mismatch means the artifact was superseded while the
    /// diagnosis was in flight; the result is dropped without error. A
    /// failed history write is reported and does not undo the completed
    /// diagnosis.
    pub async fn commit(
        &mut self,
        generation: u64,
        artifact: &ImageArtifact,
        result: DiagnosisResult,
    ) -> AnalysisOutcome {
        if generation != self.source.generation() {
            warn!(
                issued = generation,
                current = self.source.generation(),
                "dropping stale diagnosis result"
            );
            return AnalysisOutcome::Stale;
        }

        let entry = HistoryEntry::new(artifact, result.clone());
        if let Err(e) = self.history.insert(entry).await {
            warn!(error = %e, "history write failed, entry kept in memory only");
        }
        AnalysisOutcome::Completed(result)
    }
}
