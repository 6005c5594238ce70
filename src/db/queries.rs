// Database queries — CRUD operations for the classifier catalog.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use super::models::{ClassifierSummary, TIMESTAMP_FORMAT};
use crate::classifier::{codec, Classifier};
use crate::error::EngineError;

/// Store a trained classifier. Fails with a validation error if the name is
/// already taken.
pub fn insert_classifier(conn: &Connection, classifier: &Classifier) -> Result<()> {
    let payload = codec::encode(classifier)?;
    let result = conn.execute(
        "INSERT INTO classifiers
            (id, name, multiplicity, model_size, vocabulary_size, training_texts,
             format_version, payload, trained_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            classifier.id().to_string(),
            classifier.name(),
            classifier.multiplicity() as i64,
            classifier.model_size() as i64,
            classifier.vocabulary_size() as i64,
            classifier.training_texts(),
            codec::FORMAT_VERSION,
            payload,
            classifier.trained_at().format(TIMESTAMP_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(EngineError::validation(format!(
                "a classifier named '{}' already exists",
                classifier.name()
            ))
            .into())
        }
        Err(e) => Err(e).context("Failed to store classifier"),
    }
}

fn decode_payload(id: &str, payload: &[u8]) -> Result<Classifier> {
    codec::decode(payload).with_context(|| format!("Stored classifier {id} is unreadable"))
}

/// Load one classifier by id.
pub fn get_classifier(conn: &Connection, id: &Uuid) -> Result<Option<Classifier>> {
    let id = id.to_string();
    let mut stmt = conn.prepare("SELECT payload FROM classifiers WHERE id = ?1")?;
    let payload: Option<Vec<u8>> = stmt.query_row(params![id], |row| row.get(0)).optional()?;

    payload.map(|p| decode_payload(&id, &p)).transpose()
}

/// Load one classifier by its unique name.
pub fn find_classifier_by_name(conn: &Connection, name: &str) -> Result<Option<Classifier>> {
    let mut stmt = conn.prepare("SELECT id, payload FROM classifiers WHERE name = ?1")?;
    let row: Option<(String, Vec<u8>)> = stmt
        .query_row(params![name], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;

    row.map(|(id, p)| decode_payload(&id, &p)).transpose()
}

/// Load every classifier, ordered by name.
pub fn list_classifiers(conn: &Connection) -> Result<Vec<Classifier>> {
    let mut stmt = conn.prepare("SELECT id, payload FROM classifiers ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
    })?;

    let mut classifiers = Vec::new();
    for row in rows {
        let (id, payload) = row?;
        classifiers.push(decode_payload(&id, &payload)?);
    }
    Ok(classifiers)
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<(String, ClassifierSummary)> {
    let id: String = row.get(0)?;
    Ok((
        id,
        ClassifierSummary {
            id: Uuid::nil(),
            name: row.get(1)?,
            multiplicity: row.get::<_, i64>(2)? as usize,
            model_size: row.get::<_, i64>(3)? as usize,
            vocabulary_size: row.get::<_, i64>(4)? as usize,
            training_texts: row.get(5)?,
            trained_at: row.get(6)?,
        },
    ))
}

/// Summaries of every classifier, ordered by name. Does not decode models.
pub fn list_summaries(conn: &Connection) -> Result<Vec<ClassifierSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, multiplicity, model_size, vocabulary_size, training_texts, trained_at
         FROM classifiers
         ORDER BY name",
    )?;
    let rows = stmt.query_map([], summary_from_row)?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, mut summary) = row?;
        summary.id = Uuid::parse_str(&id)
            .with_context(|| format!("Stored classifier id is not a UUID: {id}"))?;
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Delete a classifier. Returns whether a row was removed.
pub fn delete_classifier(conn: &Connection, id: &Uuid) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM classifiers WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(deleted > 0)
}

pub fn classifier_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM classifiers", [], |row| row.get(0))?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierOptions;
    use crate::db::schema::create_tables;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn train(name: &str) -> Classifier {
        Classifier::train(
            name,
            &["total compra valor", "cupom fiscal valor total"],
            ClassifierOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_conn();
        let c = train("groceries");
        insert_classifier(&conn, &c).unwrap();

        let loaded = get_classifier(&conn, &c.id()).unwrap().unwrap();
        assert_eq!(loaded.name(), "groceries");
        assert_eq!(loaded.model(), c.model());
        assert_eq!(
            loaded.classify("valor total compra").unwrap(),
            c.classify("valor total compra").unwrap()
        );
    }

    #[test]
    fn test_get_missing() {
        let conn = test_conn();
        assert!(get_classifier(&conn, &Uuid::new_v4()).unwrap().is_none());
        assert!(find_classifier_by_name(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_find_by_name() {
        let conn = test_conn();
        let c = train("groceries");
        insert_classifier(&conn, &c).unwrap();
        let found = find_classifier_by_name(&conn, "groceries").unwrap().unwrap();
        assert_eq!(found.id(), c.id());
    }

    #[test]
    fn test_duplicate_name_is_validation_error() {
        let conn = test_conn();
        insert_classifier(&conn, &train("groceries")).unwrap();
        let err = insert_classifier(&conn, &train("groceries")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation(_))
        ));
        assert_eq!(classifier_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let conn = test_conn();
        insert_classifier(&conn, &train("zeta")).unwrap();
        insert_classifier(&conn, &train("alpha")).unwrap();

        let names: Vec<String> = list_classifiers(&conn)
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let summaries = list_summaries(&conn).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "alpha");
        assert_eq!(summaries[0].model_size, 2);
        assert_eq!(summaries[0].vocabulary_size, 5);
        assert_eq!(summaries[0].training_texts, 2);
    }

    #[test]
    fn test_summary_matches_classifier() {
        let conn = test_conn();
        let c = train("groceries");
        insert_classifier(&conn, &c).unwrap();
        let summaries = list_summaries(&conn).unwrap();
        assert_eq!(summaries[0], ClassifierSummary::from(&c));
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let c = train("groceries");
        insert_classifier(&conn, &c).unwrap();
        assert!(delete_classifier(&conn, &c.id()).unwrap());
        assert!(!delete_classifier(&conn, &c.id()).unwrap());
        assert_eq!(classifier_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_corrupt_payload_is_reported() {
        let conn = test_conn();
        let c = train("groceries");
        insert_classifier(&conn, &c).unwrap();
        conn.execute(
            "UPDATE classifiers SET payload = x'494E4B50' WHERE id = ?1",
            params![c.id().to_string()],
        )
        .unwrap();

        let err = get_classifier(&conn, &c.id()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation(_))
        ));
    }
}
