use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use inkprint::config;
use inkprint::db::ClassifierSummary;
use inkprint::output::terminal;
use inkprint::pipeline::catalog;

/// Inkprint: document-type classification by shingle fingerprints.
///
/// Train named classifiers from example documents, then rank new documents
/// by how closely they match each one.
#[derive(Parser)]
#[command(name = "inkprint", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Train a classifier from example documents and store it
    Train {
        /// Unique classifier name
        #[arg(long)]
        name: String,

        /// Training files, or directories of training files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Shingle size (default: INKPRINT_MULTIPLICITY, or 1)
        #[arg(long)]
        multiplicity: Option<usize>,

        /// TF-IDF cutoff; fingerprints at or below it are kept (default: 0.1)
        #[arg(long)]
        cutoff: Option<f64>,
    },

    /// List stored classifiers
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete a classifier by ID
    Delete {
        id: Uuid,
    },

    /// Classify a document against every stored classifier
    Classify {
        /// Text to classify (instead of a file)
        #[arg(long, conflicts_with = "path")]
        text: Option<String>,

        /// File to classify; reads stdin when neither this nor --text is given
        path: Option<PathBuf>,

        /// Score exponent before normalization (default: INKPRINT_SCORE_EXPONENT, or 2)
        #[arg(long)]
        exponent: Option<f64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one classifier's model in detail
    Inspect {
        id: Uuid,

        /// Max fingerprints to show (default: 20)
        #[arg(long, default_value = "20")]
        shingles: usize,

        /// Print the summary and pipeline configuration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show database and catalog status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inkprint=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Inkprint database...");
            let config = config::Config::load()?;
            let repo = inkprint::db::initialize_sqlite(&config.db_path)?;
            let table_count = repo.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nInkprint is ready. Next step: train a classifier");
            println!("  inkprint train --name <NAME> <FILES or DIRECTORIES>...");
        }

        Commands::Train {
            name,
            paths,
            multiplicity,
            cutoff,
        } => {
            let config = config::Config::load()?;
            let options = config.classifier_options(multiplicity, cutoff)?;
            let repo = inkprint::db::open_sqlite(&config.db_path)?;

            let texts = catalog::read_texts(&paths)?;
            println!("Training '{}' on {} texts...", name, texts.len());

            let classifier =
                catalog::create_classifier(repo.as_ref(), &name, texts, options).await?;

            println!(
                "{} Trained '{}' ({} of {} fingerprints retained)",
                "ok".green().bold(),
                classifier.name(),
                classifier.model_size(),
                classifier.vocabulary_size(),
            );
            println!("  ID: {}", classifier.id());
        }

        Commands::List { json } => {
            let config = config::Config::load()?;
            let repo = inkprint::db::open_sqlite(&config.db_path)?;
            let summaries = catalog::list_classifiers(repo.as_ref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                terminal::display_classifier_list(&summaries);
            }
        }

        Commands::Delete { id } => {
            let config = config::Config::load()?;
            let repo = inkprint::db::open_sqlite(&config.db_path)?;
            catalog::delete_classifier(repo.as_ref(), id).await?;
            println!("Deleted classifier {id}");
        }

        Commands::Classify {
            text,
            path,
            exponent,
            json,
        } => {
            let config = config::Config::load()?;
            let repo = inkprint::db::open_sqlite(&config.db_path)?;
            let text = match (text, path) {
                (Some(text), _) => text,
                (None, Some(path)) => read_document(&path)?,
                (None, None) => read_stdin()?,
            };

            let exponent = exponent.unwrap_or(config.score_exponent);
            let scores = catalog::classify_text(repo.as_ref(), &text, exponent).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else {
                terminal::display_scores(&scores);
            }
        }

        Commands::Inspect { id, shingles, json } => {
            let config = config::Config::load()?;
            let repo = inkprint::db::open_sqlite(&config.db_path)?;
            let classifier = catalog::get_classifier(repo.as_ref(), id).await?;
            if json {
                let detail = serde_json::json!({
                    "summary": ClassifierSummary::from(classifier.as_ref()),
                    "tfidf_cutoff": classifier.tfidf_cutoff(),
                    "normalization_factor": classifier.normalization_factor(),
                    "pipeline": classifier.pipeline().config(),
                });
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                terminal::display_classifier_detail(&classifier, shingles);
            }
        }

        Commands::Status => {
            let config = config::Config::load()?;
            let repo = if Path::new(&config.db_path).exists() {
                Some(inkprint::db::open_sqlite(&config.db_path)?)
            } else {
                None
            };
            inkprint::status::show(repo.as_deref(), &config.db_path).await?;
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read document from stdin")?;
    Ok(text)
}
