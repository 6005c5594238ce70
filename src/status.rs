// System status display — database location and size, catalog contents.

use anyhow::Result;
use std::path::Path;

use crate::db::ClassifierRepository;

/// Display system status to the terminal.
///
/// `repo` is None when the database has not been created yet.
pub async fn show(repo: Option<&dyn ClassifierRepository>, db_display_path: &str) -> Result<()> {
    let repo = match repo {
        Some(repo) if Path::new(db_display_path).exists() => repo,
        _ => {
            println!("Database: not initialized");
            println!("\nRun `inkprint init` to set up the database.");
            return Ok(());
        }
    };

    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let summaries = repo.list_summaries().await?;
    if summaries.is_empty() {
        println!("Classifiers: none yet");
        println!("  Run `inkprint train --name <NAME> <PATHS>...` to create one");
        return Ok(());
    }

    let total_model: usize = summaries.iter().map(|s| s.model_size).sum();
    let total_texts: u64 = summaries.iter().map(|s| u64::from(s.training_texts)).sum();
    println!(
        "Classifiers: {} ({} fingerprints retained, trained on {} texts)",
        summaries.len(),
        total_model,
        total_texts
    );

    // Most recently trained
    if let Some(latest) = summaries.iter().max_by(|a, b| a.trained_at.cmp(&b.trained_at)) {
        println!("Last trained: {} ({})", latest.name, latest.trained_at);
    }

    Ok(())
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
