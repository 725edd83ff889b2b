//! Diagnosis pipeline orchestration.
//!
//! [`DiagnosisOrchestrator`] sequences one classification step and two
//! conditional enrichment calls into a single [`DiagnosisResult`]:
//!
//! 1. classify the artifact;
//! 2. on the low-confidence sentinel verdict, short-circuit without
//!    enrichment;
//! 3. otherwise run the summary and treatment calls concurrently and join
//!    them, all-or-nothing;
//! 4. assemble the result.
//!
//! There are no retries anywhere in this component; the caller decides
//! whether to re-invoke.

mod http;
mod mock;
mod services;

pub use http::{HttpDiagnosisServices, ServiceEndpoints};
pub use mock::{MockClassifier, MockSummarizer, MockTreatmentAdvisor};
pub use services::{
    sentinel, ClassificationVerdict, Classifier, ServiceUnavailable, Summarizer, TreatmentAdvice,
    TreatmentAdvisor,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::artifact::ImageArtifact;

/// Failure of one `diagnose` invocation.
///
/// Both variants are recoverable by re-invoking; a failed diagnosis never
/// leaves a partial result behind.
#[derive(Debug, Clone, Error)]
pub enum DiagnosisError {
    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),
}

/// A complete, user-presentable diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub disease_name: String,
    /// Confidence in [0, 1].
    pub confidence_score: f32,
    pub description: String,
    pub organic_recommendations: String,
    pub chemical_recommendations: String,
}

impl DiagnosisResult {
    /// True when this result was produced from the sentinel verdict.
    pub fn is_uncertain(&self) -> bool {
        self.disease_name == sentinel::UNCERTAIN_DIAGNOSIS
    }
}

/// Orchestrates the classifier and the enrichment services into one result.
pub struct DiagnosisOrchestrator {
    classifier: Arc<dyn Classifier>,
    summarizer: Arc<dyn Summarizer>,
    advisor: Arc<dyn TreatmentAdvisor>,
}

impl DiagnosisOrchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        summarizer: Arc<dyn Summarizer>,
        advisor: Arc<dyn TreatmentAdvisor>,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            advisor,
        }
    }

    /// Run one diagnosis over a normalized image artifact.
    ///
    /// Invariants: a sentinel verdict never triggers the enrichment
    /// services and always yields the not-applicable recommendation
    /// markers; otherwise the result exists only if both enrichment calls
    /// succeeded.
    #[instrument(level = "info", skip_all, fields(
        origin = %artifact.origin(),
        bytes = artifact.bytes().len()
    ))]
    pub async fn diagnose(
        &self,
        artifact: &ImageArtifact,
    ) -> Result<DiagnosisResult, DiagnosisError> {
        let verdict = self
            .classifier
            .classify(artifact.bytes(), artifact.mime_type())
            .await
            .map_err(|e| DiagnosisError::ClassificationUnavailable(e.to_string()))?;

        debug!(
            disease = %verdict.disease_name,
            confidence = verdict.confidence_score,
            "classifier verdict"
        );

        if verdict.is_uncertain() {
            // Low-confidence verdicts never get fabricated treatment advice.
            info!("uncertain verdict, skipping enrichment");
            return Ok(DiagnosisResult {
                disease_name: verdict.disease_name,
                confidence_score: verdict.confidence_score,
                description: verdict.raw_description,
                organic_recommendations: sentinel::NOT_APPLICABLE.to_string(),
                chemical_recommendations: sentinel::NOT_APPLICABLE.to_string(),
            });
        }

        // Both enrichment calls are independent reads over the same verdict,
        // so they run in flight together and join; either failure fails the
        // whole diagnosis rather than returning a half-enriched result.
        let (description, advice) = tokio::try_join!(
            async {
                self.summarizer
                    .summarize(&verdict.disease_name, &verdict.raw_description)
                    .await
                    .map_err(|e| DiagnosisError::EnrichmentUnavailable(e.to_string()))
            },
            async {
                self.advisor
                    .recommend(&verdict.disease_name, verdict.confidence_score)
                    .await
                    .map_err(|e| DiagnosisError::EnrichmentUnavailable(e.to_string()))
            },
        )?;

        info!(disease = %verdict.disease_name, "diagnosis assembled");
        Ok(DiagnosisResult {
            disease_name: verdict.disease_name,
            confidence_score: verdict.confidence_score,
            description,
            organic_recommendations: advice.organic_recommendations,
            chemical_recommendations: advice.chemical_recommendations,
        })
    }
}
