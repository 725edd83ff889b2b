//! History command implementations.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use leafwise_core::{Config, FileMedium, HistoryStore};
use tracing::info;

use crate::utils::{format_confidence, format_timestamp};

async fn load(config: &Config) -> HistoryStore<FileMedium> {
    HistoryStore::load(FileMedium::new(&config.data_dir), config.history_capacity).await
}

/// List recorded diagnoses, newest first.
pub async fn list(config: &Config) -> Result<()> {
    let history = load(config).await;

    if history.is_empty() {
        println!("No analysis history yet.");
        return Ok(());
    }

    for entry in history.entries() {
        println!(
            "{}  {}  {:>4}  {}",
            entry.id.dimmed(),
            format_timestamp(&entry.timestamp),
            format_confidence(entry.result.confidence_score),
            entry.result.disease_name.bold()
        );
    }
    println!();
    println!("Showing {} most recent analyses.", history.len());
    Ok(())
}

/// Show one recorded diagnosis in full.
pub async fn show(config: &Config, id: &str) -> Result<()> {
    let history = load(config).await;
    let entry = history
        .select(id)
        .with_context(|| format!("no history entry with id {id}"))?;

    println!();
    println!(
        "   {} {}",
        "Recorded:".dimmed(),
        format_timestamp(&entry.timestamp)
    );
    println!(
        "   {} {}",
        "Disease:".dimmed(),
        entry.result.disease_name.bold()
    );
    println!(
        "   {} {}",
        "Confidence:".dimmed(),
        format_confidence(entry.result.confidence_score)
    );
    println!("   {} {}", "Summary:".dimmed(), entry.result.description);
    println!(
        "   {} {}",
        "Organic treatment:".dimmed(),
        entry.result.organic_recommendations
    );
    println!(
        "   {} {}",
        "Chemical treatment:".dimmed(),
        entry.result.chemical_recommendations
    );
    Ok(())
}

/// Delete all recorded diagnoses.
pub async fn clear(config: &Config, yes: bool) -> Result<()> {
    if !yes && !confirm("This permanently deletes all analysis history. Continue? [y/N] ")? {
        println!("Aborted.");
        return Ok(());
    }

    let mut history = load(config).await;
    let removed = history.len();
    history
        .clear()
        .await
        .context("failed to delete persisted history")?;

    info!(removed, "history cleared");
    println!("{}", "Analysis history cleared.".green());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
