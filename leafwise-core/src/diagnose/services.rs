//! External service boundaries consumed by the diagnosis pipeline.
//!
//! Three collaborators sit behind these traits: the image classifier, the
//! summary generator, and the treatment-recommendation generator. The core
//! never classifies images or writes text itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved values tied to the external classifier's contract.
pub mod sentinel {
    /// Disease name reported for a low-confidence classification.
    ///
    /// "Uncertain" is conveyed by this name, not by a numeric confidence
    /// cutoff; swapping the classifier means honoring or remapping this
    /// value here.
    pub const UNCERTAIN_DIAGNOSIS: &str = "Uncertain Diagnosis";

    /// Marker stored in both recommendation fields when no treatment advice
    /// applies.
    pub const NOT_APPLICABLE: &str = "N/A - Diagnosis uncertain.";
}

/// Generic failure of an external service call.
#[derive(Debug, Clone, Error)]
#[error("{service} unavailable: {reason}")]
pub struct ServiceUnavailable {
    pub service: &'static str,
    pub reason: String,
}

impl ServiceUnavailable {
    pub fn new(service: &'static str, reason: impl Into<String>) -> Self {
        Self {
            service,
            reason: reason.into(),
        }
    }
}

/// Raw classifier output, consumed within one orchestration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    pub disease_name: String,
    /// Confidence in [0, 1].
    pub confidence_score: f32,
    pub raw_description: String,
}

impl ClassificationVerdict {
    /// True when the verdict carries the low-confidence sentinel name.
    pub fn is_uncertain(&self) -> bool {
        self.disease_name == sentinel::UNCERTAIN_DIAGNOSIS
    }
}

/// Organic and chemical treatment texts for one verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentAdvice {
    pub organic_recommendations: String,
    pub chemical_recommendations: String,
}

/// External image classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a leaf image into a disease verdict.
    async fn classify(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ClassificationVerdict, ServiceUnavailable>;
}

/// External summary generator turning a raw disease description into a
/// concise user-facing summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        disease_name: &str,
        raw_description: &str,
    ) -> Result<String, ServiceUnavailable>;
}

/// External treatment-recommendation generator.
#[async_trait]
pub trait TreatmentAdvisor: Send + Sync {
    async fn recommend(
        &self,
        disease_name: &str,
        confidence_score: f32,
    ) -> Result<TreatmentAdvice, ServiceUnavailable>;
}
