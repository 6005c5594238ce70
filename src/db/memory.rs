// MemoryRepository — in-process ClassifierRepository.
//
// Holds classifiers in a map behind a tokio RwLock. Nothing is persisted.
// Useful for tests and for classifying against classifiers trained in the
// same run.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::ClassifierSummary;
use super::traits::ClassifierRepository;
use crate::classifier::Classifier;
use crate::error::EngineError;

#[derive(Default)]
pub struct MemoryRepository {
    classifiers: RwLock<HashMap<Uuid, Arc<Classifier>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name(mut classifiers: Vec<Arc<Classifier>>) -> Vec<Arc<Classifier>> {
    classifiers.sort_by(|a, b| a.name().cmp(b.name()));
    classifiers
}

#[async_trait]
impl ClassifierRepository for MemoryRepository {
    async fn create_classifier(&self, classifier: Classifier) -> Result<Arc<Classifier>> {
        let mut map = self.classifiers.write().await;
        if map.values().any(|c| c.name() == classifier.name()) {
            return Err(EngineError::validation(format!(
                "a classifier named '{}' already exists",
                classifier.name()
            ))
            .into());
        }
        let classifier = Arc::new(classifier);
        map.insert(classifier.id(), classifier.clone());
        Ok(classifier)
    }

    async fn get_classifier(&self, id: Uuid) -> Result<Option<Arc<Classifier>>> {
        Ok(self.classifiers.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Arc<Classifier>>> {
        Ok(self
            .classifiers
            .read()
            .await
            .values()
            .find(|c| c.name() == name)
            .cloned())
    }

    async fn list_classifiers(&self) -> Result<Vec<Arc<Classifier>>> {
        let all = self.classifiers.read().await.values().cloned().collect();
        Ok(sorted_by_name(all))
    }

    async fn list_summaries(&self) -> Result<Vec<ClassifierSummary>> {
        Ok(self
            .list_classifiers()
            .await?
            .iter()
            .map(|c| ClassifierSummary::from(c.as_ref()))
            .collect())
    }

    async fn delete_classifier(&self, id: Uuid) -> Result<bool> {
        Ok(self.classifiers.write().await.remove(&id).is_some())
    }

    async fn classifier_count(&self) -> Result<usize> {
        Ok(self.classifiers.read().await.len())
    }
}
