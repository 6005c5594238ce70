// Repository trait — backend-agnostic async interface to the classifier catalog.
//
// Implementors: SqliteRepository (wraps rusqlite), MemoryRepository (a map
// behind an RwLock, for tests and one-shot runs). All methods are async so a
// sync backend behind a Mutex and a natively async one fit the same interface.
//
// Classifiers come back as Arc<Classifier>: they are immutable once trained,
// so callers can share them across tasks and ClassifierSets freely.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::models::ClassifierSummary;
use crate::classifier::Classifier;

#[async_trait]
pub trait ClassifierRepository: Send + Sync {
    /// Persist a trained classifier. Names are unique; a duplicate is a
    /// validation error.
    async fn create_classifier(&self, classifier: Classifier) -> Result<Arc<Classifier>>;

    async fn get_classifier(&self, id: Uuid) -> Result<Option<Arc<Classifier>>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Arc<Classifier>>>;

    /// Every classifier, ordered by name.
    async fn list_classifiers(&self) -> Result<Vec<Arc<Classifier>>>;

    /// Listing rows, ordered by name, without loading models.
    async fn list_summaries(&self) -> Result<Vec<ClassifierSummary>>;

    /// Returns false when no classifier had that id.
    async fn delete_classifier(&self, id: Uuid) -> Result<bool>;

    async fn classifier_count(&self) -> Result<usize>;
}
