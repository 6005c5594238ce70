// Catalog pipeline: train, store, list, delete, and classify against the
// classifiers in a repository.
//
// These are the use-cases behind the CLI. They take the repository as a trait
// object so the same flow runs against SQLite or the in-memory backend.
// Training is CPU-bound and runs on a blocking worker so it never stalls the
// async runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::{Classifier, ClassifierOptions, ClassifierSet, Score};
use crate::db::{ClassifierRepository, ClassifierSummary};
use crate::error::EngineError;

/// Train a classifier and store it.
///
/// Rejects an empty name, an empty corpus, and a name already in the
/// repository before spending any time on training.
pub async fn create_classifier(
    repo: &dyn ClassifierRepository,
    name: &str,
    texts: Vec<String>,
    options: ClassifierOptions,
) -> Result<Arc<Classifier>> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(EngineError::validation("classifier name must not be empty").into());
    }
    if texts.is_empty() {
        return Err(EngineError::validation("training corpus is empty").into());
    }
    if repo.find_by_name(&name).await?.is_some() {
        return Err(
            EngineError::validation(format!("a classifier named '{name}' already exists")).into(),
        );
    }

    info!(
        name = %name,
        texts = texts.len(),
        multiplicity = options.multiplicity,
        "Training classifier"
    );

    let classifier =
        tokio::task::spawn_blocking(move || Classifier::train(name, texts.as_slice(), options))
            .await
            .context("Training task failed to complete")??;

    let stored = repo.create_classifier(classifier).await?;
    info!(id = %stored.id(), name = stored.name(), "Classifier stored");
    Ok(stored)
}

/// Summaries of every stored classifier, ordered by name.
pub async fn list_classifiers(repo: &dyn ClassifierRepository) -> Result<Vec<ClassifierSummary>> {
    repo.list_summaries().await
}

/// Load one classifier, or fail with NotFound.
pub async fn get_classifier(repo: &dyn ClassifierRepository, id: Uuid) -> Result<Arc<Classifier>> {
    repo.get_classifier(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(id.to_string()).into())
}

/// Delete a classifier, or fail with NotFound.
pub async fn delete_classifier(repo: &dyn ClassifierRepository, id: Uuid) -> Result<()> {
    if !repo.delete_classifier(id).await? {
        return Err(EngineError::NotFound(id.to_string()).into());
    }
    info!(id = %id, "Classifier deleted");
    Ok(())
}

/// Rank `text` against every stored classifier.
///
/// `exponent` is the score exponent of the ensemble (2.0 squares scores).
/// Fails with EmptySet when the repository holds no classifiers.
pub async fn classify_text(
    repo: &dyn ClassifierRepository,
    text: &str,
    exponent: f64,
) -> Result<Vec<Score>> {
    let mut set = ClassifierSet::with_exponent(exponent)?;
    for classifier in repo.list_classifiers().await? {
        set.add(classifier)?;
    }
    debug!(classifiers = set.len(), exponent, "Loaded classifier set");

    Ok(set.classify(text)?)
}

/// Expand paths into the list of files to read: files stay as given,
/// directories contribute their regular files and symlinks to regular files
/// (not recursively), sorted.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
            {
                // Follows symlinks, so linked training files are included
                let entry_path = entry?.path();
                if entry_path.is_file() {
                    entries.push(entry_path);
                }
            }
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read every text under `paths`, in order.
pub fn read_texts(paths: &[PathBuf]) -> Result<Vec<String>> {
    let files = expand_paths(paths)?;
    if files.is_empty() {
        anyhow::bail!("No input files found");
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar().template("  Reading [{bar:30}] {pos}/{len} ({eta})")?,
    );

    let mut texts = Vec::with_capacity(files.len());
    for file in &files {
        match read_text(file) {
            Ok(text) => texts.push(text),
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(files = texts.len(), "Read input texts");
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;

    const GROCERIES: [&str; 2] = ["total compra valor", "cupom fiscal valor total"];

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_and_classify() {
        let repo = MemoryRepository::new();
        create_classifier(&repo, "groceries", corpus(&GROCERIES), ClassifierOptions::default())
            .await
            .unwrap();

        let scores = classify_text(&repo, "valor total compra", 2.0).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].name, "groceries");
        assert!((scores[0].confidence - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = MemoryRepository::new();
        create_classifier(&repo, "groceries", corpus(&GROCERIES), ClassifierOptions::default())
            .await
            .unwrap();
        let err = create_classifier(
            &repo,
            " groceries ",
            corpus(&GROCERIES),
            ClassifierOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_training_errors_surface_unchanged() {
        let repo = MemoryRepository::new();
        let options = ClassifierOptions::default().with_multiplicity(5);
        let err = create_classifier(&repo, "short", corpus(&GROCERIES), options)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation(_))
        ));
        assert_eq!(repo.classifier_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let repo = MemoryRepository::new();
        assert!(create_classifier(&repo, "", corpus(&GROCERIES), ClassifierOptions::default())
            .await
            .is_err());
        assert!(create_classifier(&repo, "none", Vec::new(), ClassifierOptions::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = MemoryRepository::new();
        let id = Uuid::new_v4();
        let err = delete_classifier(&repo, id).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::NotFound(id.to_string()))
        );
        assert!(get_classifier(&repo, id).await.is_err());
    }

    #[tokio::test]
    async fn test_classify_without_classifiers() {
        let repo = MemoryRepository::new();
        let err = classify_text(&repo, "anything", 2.0).await.unwrap_err();
        assert_eq!(err.downcast_ref::<EngineError>(), Some(&EngineError::EmptySet));
    }

    #[test]
    fn test_read_texts_expands_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.txt"), "skipped").unwrap();

        let extra = dir.path().join("nested").join("c.txt");
        let texts = read_texts(&[dir.path().to_path_buf(), extra]).unwrap();
        assert_eq!(texts, vec!["first", "second", "skipped"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_paths_follows_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        let target = source.path().join("receipt.txt");
        std::fs::write(&target, "cupom fiscal").unwrap();
        std::fs::write(dir.path().join("a.txt"), "valor total").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("b.txt")).unwrap();
        std::os::unix::fs::symlink(source.path(), dir.path().join("linked_dir")).unwrap();

        let files = expand_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![dir.path().join("a.txt"), dir.path().join("b.txt")]);
        let texts = read_texts(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(texts, vec!["valor total", "cupom fiscal"]);
    }

    #[test]
    fn test_read_texts_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_texts(&[dir.path().join("nope.txt")]).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn test_read_texts_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_texts(&[dir.path().to_path_buf()]).is_err());
    }
}
