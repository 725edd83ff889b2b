//! Scripted service doubles for tests and the CLI mock path.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::services::{
    ClassificationVerdict, Classifier, ServiceUnavailable, Summarizer, TreatmentAdvice,
    TreatmentAdvisor,
};

/// Classifier double returning one scripted outcome and counting calls.
pub struct MockClassifier {
    outcome: Result<ClassificationVerdict, ServiceUnavailable>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Always return the given verdict.
    pub fn returning(verdict: ClassificationVerdict) -> Self {
        Self {
            outcome: Ok(verdict),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with a generic unavailable error.
    pub fn unavailable() -> Self {
        Self {
            outcome: Err(ServiceUnavailable::new("classifier", "mock outage")),
            calls: AtomicUsize::new(0),
        }
    }

    /// A plausible high-confidence verdict for demos.
    pub fn canned() -> Self {
        Self::returning(ClassificationVerdict {
            disease_name: "Maize Common Rust".to_string(),
            confidence_score: 0.92,
            raw_description: "Common rust appears as small, cinnamon-brown, powdery pustules \
                              scattered on both leaf surfaces. It thrives in cool, moist \
                              conditions and severe infections reduce photosynthesis and yield."
                .to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<ClassificationVerdict, ServiceUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Summarizer double returning one scripted outcome and counting calls.
pub struct MockSummarizer {
    outcome: Result<String, ServiceUnavailable>,
    calls: AtomicUsize,
}

impl MockSummarizer {
    pub fn returning(summary: impl Into<String>) -> Self {
        Self {
            outcome: Ok(summary.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: Err(ServiceUnavailable::new("summarizer", "mock outage")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        _disease_name: &str,
        _raw_description: &str,
    ) -> Result<String, ServiceUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Treatment advisor double returning one scripted outcome and counting calls.
pub struct MockTreatmentAdvisor {
    outcome: Result<TreatmentAdvice, ServiceUnavailable>,
    calls: AtomicUsize,
}

impl MockTreatmentAdvisor {
    pub fn returning(organic: impl Into<String>, chemical: impl Into<String>) -> Self {
        Self {
            outcome: Ok(TreatmentAdvice {
                organic_recommendations: organic.into(),
                chemical_recommendations: chemical.into(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: Err(ServiceUnavailable::new("treatment advisor", "mock outage")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TreatmentAdvisor for MockTreatmentAdvisor {
    async fn recommend(
        &self,
        _disease_name: &str,
        _confidence_score: f32,
    ) -> Result<TreatmentAdvice, ServiceUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
