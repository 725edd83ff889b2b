//! End-to-end workflow tests for the diagnosis pipeline.
//!
//! These exercise the public API across module boundaries: acquisition into
//! diagnosis into durable history, including restart round-trips over the
//! file medium.

use std::sync::Arc;

use leafwise_core::{
    sentinel, AnalysisOutcome, ClassificationVerdict, DiagnosisOrchestrator, DiagnosisSession,
    FileMedium, HistoryEntry, HistoryStore, ImageOrigin, ImageSource, MockCamera, MockClassifier,
    MockSummarizer, MockTreatmentAdvisor, Summarizer, TreatmentAdvisor, DEFAULT_HISTORY_CAPACITY,
};
use tempfile::TempDir;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([20, 160, 40, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn rust_orchestrator() -> DiagnosisOrchestrator {
    DiagnosisOrchestrator::new(
        Arc::new(MockClassifier::returning(ClassificationVerdict {
            disease_name: "Maize Common Rust".to_string(),
            confidence_score: 0.92,
            raw_description: "cinnamon-brown pustules".to_string(),
        })),
        Arc::new(MockSummarizer::returning("Rust summary")),
        Arc::new(MockTreatmentAdvisor::returning(
            "neem oil",
            "triazole fungicide",
        )),
    )
}

#[tokio::test]
async fn upload_diagnose_and_history_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    // First "process": acquire, diagnose, persist.
    let mut source = ImageSource::new(MockCamera::new(64, 48));
    source.select_file(tiny_png()).await.unwrap();
    let artifact = source.artifact().unwrap().clone();

    let result = rust_orchestrator().diagnose(&artifact).await.unwrap();
    let entry = HistoryEntry::new(&artifact, result);
    let expected = entry.clone();

    let mut history =
        HistoryStore::load(FileMedium::new(dir.path()), DEFAULT_HISTORY_CAPACITY).await;
    history.insert(entry).await.unwrap();
    drop(history);

    // Second "process": reload from the same directory.
    let reloaded =
        HistoryStore::load(FileMedium::new(dir.path()), DEFAULT_HISTORY_CAPACITY).await;
    assert_eq!(reloaded.entries().first(), Some(&expected));
}

#[tokio::test]
async fn capacity_is_enforced_across_reloads() {
    let dir = TempDir::new().unwrap();
    let mut source = ImageSource::new(MockCamera::new(64, 48));
    source.select_file(tiny_png()).await.unwrap();
    let artifact = source.artifact().unwrap().clone();
    let orchestrator = rust_orchestrator();

    let mut history = HistoryStore::load(FileMedium::new(dir.path()), 3).await;
    for _ in 0..5 {
        let result = orchestrator.diagnose(&artifact).await.unwrap();
        history
            .insert(HistoryEntry::new(&artifact, result))
            .await
            .unwrap();
    }
    assert_eq!(history.len(), 3);
    drop(history);

    let reloaded = HistoryStore::load(FileMedium::new(dir.path()), 3).await;
    assert_eq!(reloaded.len(), 3);
}

#[tokio::test]
async fn capture_to_diagnosis_releases_the_camera_every_time() {
    let backend = Arc::new(MockCamera::new(64, 48));
    let mut source = ImageSource::new(Arc::clone(&backend));
    let orchestrator = rust_orchestrator();

    for _ in 0..3 {
        source.enter_capture_mode().await.unwrap();
        source.shoot().await.unwrap();
        let artifact = source.artifact().unwrap().clone();
        assert_eq!(artifact.origin(), ImageOrigin::Capture);

        orchestrator.diagnose(&artifact).await.unwrap();
        source.clear();
        assert_eq!(backend.open_count(), backend.stop_count());
    }
}

#[tokio::test]
async fn uncertain_workflow_never_touches_enrichment() {
    let summarizer = Arc::new(MockSummarizer::returning("never used"));
    let advisor = Arc::new(MockTreatmentAdvisor::returning("never", "used"));
    let orchestrator = DiagnosisOrchestrator::new(
        Arc::new(MockClassifier::returning(ClassificationVerdict {
            disease_name: sentinel::UNCERTAIN_DIAGNOSIS.to_string(),
            confidence_score: 0.3,
            raw_description: "unclear".to_string(),
        })),
        Arc::clone(&summarizer) as Arc<dyn Summarizer>,
        Arc::clone(&advisor) as Arc<dyn TreatmentAdvisor>,
    );

    let mut source = ImageSource::new(MockCamera::new(64, 48));
    source.select_file(tiny_png()).await.unwrap();
    let result = orchestrator
        .diagnose(source.artifact().unwrap())
        .await
        .unwrap();

    assert_eq!(result.description, "unclear");
    assert_eq!(result.organic_recommendations, sentinel::NOT_APPLICABLE);
    assert_eq!(result.chemical_recommendations, sentinel::NOT_APPLICABLE);
    assert_eq!(summarizer.call_count(), 0);
    assert_eq!(advisor.call_count(), 0);
}

#[tokio::test]
async fn session_over_the_file_medium_records_current_results_only() {
    let dir = TempDir::new().unwrap();
    let mut session = DiagnosisSession::new(
        ImageSource::new(MockCamera::new(64, 48)),
        rust_orchestrator(),
        HistoryStore::load(FileMedium::new(dir.path()), DEFAULT_HISTORY_CAPACITY).await,
    );

    session.source_mut().select_file(tiny_png()).await.unwrap();
    let outcome = session.analyze().await.unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Completed(_)));
    assert_eq!(session.history().len(), 1);

    // A result issued for a superseded artifact is dropped on arrival.
    session.source_mut().select_file(tiny_png()).await.unwrap();
    let stale_generation = session.source().generation();
    let artifact = session.source().artifact().unwrap().clone();
    let result = rust_orchestrator().diagnose(&artifact).await.unwrap();
    session.source_mut().clear();

    let outcome = session.commit(stale_generation, &artifact, result).await;
    assert!(matches!(outcome, AnalysisOutcome::Stale));
    assert_eq!(session.history().len(), 1);
}
