//! Diagnose command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use leafwise_core::{
    Config, DiagnosisError, DiagnosisOrchestrator, DiagnosisResult, FileMedium, HistoryEntry,
    HistoryStore, HttpDiagnosisServices, ImageArtifact, MockClassifier, MockSummarizer,
    MockTreatmentAdvisor, PersistenceError, ValidationError,
};
use tracing::{debug, info, warn};

use crate::exit_codes;
use crate::utils::format_confidence;

/// Execute the diagnose command.
pub async fn execute(config: &Config, file: PathBuf, use_mock: bool, no_history: bool) -> Result<()> {
    match run(config, &file, use_mock, no_history).await {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            std::process::exit(exit_code_for(&err));
        }
    }
}

async fn run(config: &Config, file: &Path, use_mock: bool, no_history: bool) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    info!(path = %file.display(), bytes = bytes.len(), "read image file");

    let artifact = ImageArtifact::from_upload(bytes)?;
    debug!(mime = artifact.mime_type(), "image accepted");

    let orchestrator = if use_mock {
        eprintln!(
            "{}",
            "Using mock diagnosis services (results are canned)".yellow()
        );
        mock_services()
    } else {
        http_services(config)?
    };

    let result = orchestrator.diagnose(&artifact).await?;
    print_result(&result);

    if !no_history {
        record_history(config, &artifact, result).await;
    }

    Ok(())
}

fn mock_services() -> DiagnosisOrchestrator {
    DiagnosisOrchestrator::new(
        Arc::new(MockClassifier::canned()),
        Arc::new(MockSummarizer::returning(
            "Common rust shows as cinnamon-brown pustules on both leaf surfaces and can \
             reduce yield when infections are severe.",
        )),
        Arc::new(MockTreatmentAdvisor::returning(
            "Remove heavily infected leaves and apply neem oil weekly.",
            "Apply a triazole fungicide at first sign of pustules.",
        )),
    )
}

fn http_services(config: &Config) -> Result<DiagnosisOrchestrator> {
    let services = Arc::new(
        HttpDiagnosisServices::new(config.service_endpoints())
            .context("failed to create service client")?,
    );
    Ok(DiagnosisOrchestrator::new(
        Arc::clone(&services) as Arc<dyn leafwise_core::Classifier>,
        Arc::clone(&services) as Arc<dyn leafwise_core::Summarizer>,
        services as Arc<dyn leafwise_core::TreatmentAdvisor>,
    ))
}

fn print_result(result: &DiagnosisResult) {
    println!();
    if result.is_uncertain() {
        println!("{}", "Diagnosis uncertain".yellow().bold());
    } else {
        println!("{}", "Diagnosis complete".green().bold());
    }
    println!();
    println!("   {} {}", "Disease:".dimmed(), result.disease_name.bold());
    println!(
        "   {} {}",
        "Confidence:".dimmed(),
        format_confidence(result.confidence_score)
    );
    println!("   {} {}", "Summary:".dimmed(), result.description);
    println!(
        "   {} {}",
        "Organic treatment:".dimmed(),
        result.organic_recommendations
    );
    println!(
        "   {} {}",
        "Chemical treatment:".dimmed(),
        result.chemical_recommendations
    );
}

async fn record_history(config: &Config, artifact: &ImageArtifact, result: DiagnosisResult) {
    let mut history =
        HistoryStore::load(FileMedium::new(&config.data_dir), config.history_capacity).await;
    let entry = HistoryEntry::new(artifact, result);
    let id = entry.id.clone();

    // A failed write degrades history only; the diagnosis above stands.
    match history.insert(entry).await {
        Ok(()) => {
            info!(id = %id, "history entry recorded");
            println!();
            println!("   {} {}", "History id:".dimmed(), id);
        }
        Err(e) => {
            warn!(error = %e, "failed to persist history entry");
            eprintln!(
                "{}",
                format!("warning: history not persisted: {e}").yellow()
            );
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ValidationError>() || cause.is::<std::io::Error>() {
            return exit_codes::INPUT_ERROR;
        }
        if cause.is::<DiagnosisError>() || cause.is::<leafwise_core::ServiceUnavailable>() {
            return exit_codes::SERVICE_ERROR;
        }
        if cause.is::<PersistenceError>() {
            return exit_codes::IO_ERROR;
        }
    }
    exit_codes::GENERAL_ERROR
}
