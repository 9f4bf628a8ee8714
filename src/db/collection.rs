//! Schemaless document collections on top of the SQLite `documents` table.
//!
//! Each document is a JSON object with a string `_id`. Queries are equality
//! filters on top-level fields, evaluated with `json_extract`, and results
//! come back in insertion order.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::models::{DeleteResult, InsertOneResult, UpdateResult};
use crate::state::DbPool;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Performing an update on the path '_id' would modify the immutable field '_id'")]
    ImmutableId,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionName {
    Users,
    Surveys,
    Votes,
    Comments,
    Reports,
    Payments,
}

impl CollectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Users => "allUser",
            CollectionName::Surveys => "survey",
            CollectionName::Votes => "vote",
            CollectionName::Comments => "comment",
            CollectionName::Reports => "report",
            CollectionName::Payments => "payment",
        }
    }
}

/// Conjunction of top-level field equalities. An empty filter matches every
/// document; a `null` value matches documents where the field is null or absent.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.push((field.to_string(), value.into()));
        self
    }

    fn where_clause(&self, collection: CollectionName) -> (String, Vec<SqlValue>) {
        let mut sql = String::from("collection = ?");
        let mut values = vec![SqlValue::Text(collection.as_str().to_string())];

        for (field, value) in &self.fields {
            let path = SqlValue::Text(format!("$.\"{}\"", field));
            values.push(path.clone());
            let bound = match value {
                Value::Null => None,
                Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
                Value::Number(n) => Some(match n.as_i64() {
                    Some(i) => SqlValue::Integer(i),
                    None => SqlValue::Real(n.as_f64().unwrap_or_default()),
                }),
                Value::String(s) => {
                    // json_extract returns arrays and objects as JSON text,
                    // so the stored value must itself be a string.
                    sql.push_str(
                        " AND json_extract(body, ?) = ? AND json_type(body, ?) = 'text'",
                    );
                    values.push(SqlValue::Text(s.clone()));
                    values.push(path);
                    continue;
                }
                Value::Array(_) | Value::Object(_) => {
                    // Nested values compare as minified JSON text.
                    sql.push_str(" AND json_extract(body, ?) = json(?)");
                    values.push(SqlValue::Text(value.to_string()));
                    continue;
                }
            };
            match bound {
                Some(bound) => {
                    sql.push_str(" AND json_extract(body, ?) = ?");
                    values.push(bound);
                }
                None => sql.push_str(" AND json_extract(body, ?) IS NULL"),
            }
        }

        (sql, values)
    }
}

/// Handle on one named collection. Cheap to create; it only holds the pool.
#[derive(Clone)]
pub struct Collection {
    pool: DbPool,
    name: CollectionName,
}

impl Collection {
    pub fn new(pool: DbPool, name: CollectionName) -> Self {
        Self { pool, name }
    }

    /// All matching documents in insertion order.
    pub fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        let conn = self.pool.get()?;
        let (clause, values) = filter.where_clause(self.name);

        let mut stmt = conn.prepare(&format!(
            "SELECT body FROM documents WHERE {} ORDER BY seq",
            clause
        ))?;
        let bodies = stmt
            .query_map(params_from_iter(values), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    pub fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        let conn = self.pool.get()?;
        let (clause, values) = filter.where_clause(self.name);

        let body: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT body FROM documents WHERE {} ORDER BY seq LIMIT 1",
                    clause
                ),
                params_from_iter(values),
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Insert the document as given. A string `_id` supplied by the caller is
    /// kept; otherwise a fresh one is generated.
    pub fn insert_one(&self, mut doc: Document) -> StoreResult<InsertOneResult> {
        let id = match doc.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            _ => generate_id(),
        };
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
            params![self.name.as_str(), id, serde_json::to_string(&doc)?],
        )?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Merge `set` into the first matching document, field by field.
    pub fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<UpdateResult> {
        let mut conn = self.pool.get()?;
        // Take the write lock up front; a read-then-upgrade in WAL mode fails
        // with SQLITE_BUSY without waiting on busy_timeout.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (clause, values) = filter.where_clause(self.name);

        let current: Option<(i64, String)> = tx
            .query_row(
                &format!(
                    "SELECT seq, body FROM documents WHERE {} ORDER BY seq LIMIT 1",
                    clause
                ),
                params_from_iter(values),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((seq, body)) = current else {
            return Ok(UpdateResult::matched(0, 0));
        };

        let original: Document = serde_json::from_str(&body)?;
        let mut updated = original.clone();
        for (field, value) in set {
            if field == ID_FIELD && original.get(ID_FIELD) != Some(&value) {
                return Err(StoreError::ImmutableId);
            }
            updated.insert(field, value);
        }

        if updated == original {
            return Ok(UpdateResult::matched(1, 0));
        }

        tx.execute(
            "UPDATE documents SET body = ?1, updated_at = datetime('now') WHERE seq = ?2",
            params![serde_json::to_string(&updated)?, seq],
        )?;
        tx.commit()?;

        Ok(UpdateResult::matched(1, 1))
    }

    pub fn delete_one(&self, filter: &Filter) -> StoreResult<DeleteResult> {
        let conn = self.pool.get()?;
        let (clause, values) = filter.where_clause(self.name);

        let deleted = conn.execute(
            &format!(
                "DELETE FROM documents WHERE seq = \
                 (SELECT seq FROM documents WHERE {} ORDER BY seq LIMIT 1)",
                clause
            ),
            params_from_iter(values),
        )?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: deleted as u64,
        })
    }
}

impl UpdateResult {
    fn matched(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

fn generate_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}
