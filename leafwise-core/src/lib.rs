//! LeafWise Core - plant leaf disease diagnosis pipeline
//!
//! This crate implements the device-independent core of LeafWise:
//!
//! - **Acquisition** ([`ImageSource`]): one state machine unifying file
//!   upload and live camera capture, producing a normalized
//!   [`ImageArtifact`] per acquisition and never leaking a camera handle.
//! - **Diagnosis** ([`DiagnosisOrchestrator`]): one classification step, a
//!   low-confidence short-circuit, and two concurrent enrichment calls
//!   joined all-or-nothing.
//! - **History** ([`HistoryStore`]): a bounded, persisted log of past
//!   diagnoses.
//!
//! The image classifier, the two text-generation services, and the camera
//! hardware are external collaborators behind traits; in-tree mocks make
//! the whole pipeline testable headlessly.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use leafwise_core::{
//!     DiagnosisOrchestrator, FileMedium, HistoryEntry, HistoryStore, ImageSource,
//!     MockCamera, MockClassifier, MockSummarizer, MockTreatmentAdvisor,
//!     DEFAULT_HISTORY_CAPACITY,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = ImageSource::new(MockCamera::new(640, 480));
//! source.select_file(std::fs::read("leaf.png")?).await?;
//!
//! let orchestrator = DiagnosisOrchestrator::new(
//!     Arc::new(MockClassifier::canned()),
//!     Arc::new(MockSummarizer::returning("Rust summary")),
//!     Arc::new(MockTreatmentAdvisor::returning("neem oil", "triazole fungicide")),
//! );
//!
//! let artifact = source.artifact().expect("artifact is ready");
//! let result = orchestrator.diagnose(artifact).await?;
//!
//! let mut history =
//!     HistoryStore::load(FileMedium::new("."), DEFAULT_HISTORY_CAPACITY).await;
//! history.insert(HistoryEntry::new(artifact, result)).await?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod camera;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod history;
pub mod session;
pub mod source;

// Re-export main types for convenience
pub use artifact::{ImageArtifact, ImageOrigin, ValidationError};
pub use camera::{CameraDevice, CameraError, FrameSource, LiveStream, MockCamera, RawFrame};
pub use config::Config;
pub use diagnose::{
    sentinel, ClassificationVerdict, Classifier, DiagnosisError, DiagnosisOrchestrator,
    DiagnosisResult, HttpDiagnosisServices, MockClassifier, MockSummarizer, MockTreatmentAdvisor,
    ServiceEndpoints, ServiceUnavailable, Summarizer, TreatmentAdvice, TreatmentAdvisor,
};
pub use error::{LeafwiseError, Result};
pub use history::{
    FileMedium, HistoryEntry, HistoryStore, MemoryMedium, PersistenceError, StorageMedium,
    DEFAULT_HISTORY_CAPACITY, HISTORY_STORAGE_KEY,
};
pub use session::{AnalysisOutcome, AnalyzeError, DiagnosisSession};
pub use source::{CameraPhase, ImageSource, SourceEvent, SourceState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([20, 160, 40, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Integration test: acquire an image, diagnose it, record history.
    #[tokio::test]
    async fn test_full_upload_workflow() {
        // Step 1: acquire through the upload path
        let mut source = ImageSource::new(MockCamera::new(64, 48));
        source.select_file(tiny_png()).await.expect("valid upload");
        let artifact = source.artifact().expect("artifact ready").clone();
        assert_eq!(artifact.origin(), ImageOrigin::Upload);

        // Step 2: diagnose against scripted services
        let orchestrator = DiagnosisOrchestrator::new(
            Arc::new(MockClassifier::canned()),
            Arc::new(MockSummarizer::returning("Rust summary")),
            Arc::new(MockTreatmentAdvisor::returning("neem oil", "triazole")),
        );
        let result = orchestrator
            .diagnose(&artifact)
            .await
            .expect("diagnosis succeeds");
        assert_eq!(result.disease_name, "Maize Common Rust");
        assert_eq!(result.description, "Rust summary");

        // Step 3: record and look the entry back up
        let mut history = HistoryStore::load(MemoryMedium::new(), DEFAULT_HISTORY_CAPACITY).await;
        let entry = HistoryEntry::new(&artifact, result);
        let id = entry.id.clone();
        history.insert(entry).await.expect("persisted");
        assert_eq!(
            history.select(&id).map(|e| e.result.disease_name.as_str()),
            Some("Maize Common Rust")
        );
    }

    /// Integration test: the capture path produces a PNG artifact and
    /// releases the camera immediately.
    #[tokio::test]
    async fn test_full_capture_workflow() {
        let backend = Arc::new(MockCamera::new(64, 48));
        let mut source = ImageSource::new(Arc::clone(&backend));

        source.enter_capture_mode().await.expect("camera opens");
        source.shoot().await.expect("snapshot succeeds");

        let artifact = source.artifact().expect("artifact ready");
        assert_eq!(artifact.origin(), ImageOrigin::Capture);
        assert_eq!(artifact.mime_type(), "image/png");
        assert_eq!(backend.open_count(), backend.stop_count());
    }
}
