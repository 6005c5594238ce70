// SqliteRepository — rusqlite backend implementing ClassifierRepository.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across an .await point.
//
// The free functions in queries.rs take a plain &Connection so they can be
// tested against an in-memory database directly.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::ClassifierSummary;
use super::traits::ClassifierRepository;
use crate::classifier::Classifier;

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Count the number of user-created tables in the database.
    pub async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }
}

#[async_trait]
impl ClassifierRepository for SqliteRepository {
    async fn create_classifier(&self, classifier: Classifier) -> Result<Arc<Classifier>> {
        let conn = self.conn.lock().await;
        super::queries::insert_classifier(&conn, &classifier)?;
        Ok(Arc::new(classifier))
    }

    async fn get_classifier(&self, id: Uuid) -> Result<Option<Arc<Classifier>>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::get_classifier(&conn, &id)?.map(Arc::new))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Arc<Classifier>>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::find_classifier_by_name(&conn, name)?.map(Arc::new))
    }

    async fn list_classifiers(&self) -> Result<Vec<Arc<Classifier>>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::list_classifiers(&conn)?
            .into_iter()
            .map(Arc::new)
            .collect())
    }

    async fn list_summaries(&self) -> Result<Vec<ClassifierSummary>> {
        let conn = self.conn.lock().await;
        super::queries::list_summaries(&conn)
    }

    async fn delete_classifier(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::delete_classifier(&conn, &id)
    }

    async fn classifier_count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::classifier_count(&conn)
    }
}
