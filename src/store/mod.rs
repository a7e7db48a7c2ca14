//! Document store: collections of JSON documents, each owned by a user.
//!
//! Business services never talk to a backend directly; they go through
//! [`DocumentStore`], which has a Postgres (JSONB) and an in-memory
//! implementation with the same filter semantics.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// A stored document. `data` is always a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub user_id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query filter: optional owner plus a JSON containment pattern.
///
/// A document matches when every key of `pattern` is present in its data
/// with a containing value (objects recursively, arrays by element).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub user_id: Option<Uuid>,
    pub pattern: Map<String, Value>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(user_id: Uuid) -> Self {
        Self { user_id: Some(user_id), pattern: Map::new() }
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.pattern.insert(field.to_string(), value.into());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(user_id) = self.user_id {
            if doc.user_id != user_id {
                return false;
            }
        }
        self.pattern.iter().all(|(key, expected)| {
            doc.data.get(key).is_some_and(|actual| json_contains(actual, expected))
        })
    }
}

/// JSONB `@>` semantics.
pub fn json_contains(actual: &Value, pattern: &Value) -> bool {
    match (actual, pattern) {
        (Value::Object(a), Value::Object(p)) => p
            .iter()
            .all(|(k, pv)| a.get(k).is_some_and(|av| json_contains(av, pv))),
        (Value::Array(a), Value::Array(p)) => {
            p.iter().all(|pv| a.iter().any(|av| json_contains(av, pv)))
        }
        (Value::Array(a), scalar) if !scalar.is_object() => a.iter().any(|av| av == scalar),
        (a, p) => a == p,
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, user_id: Uuid, data: Value) -> Result<Document, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Matching documents, oldest first.
    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Replaces the data of an existing document. `None` when it does not exist.
    async fn replace(&self, collection: &str, id: Uuid, data: Value) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;
}

fn ensure_object(data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument("document data must be a JSON object".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(user_id: Uuid, data: Value) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::now_v7(),
            collection: "things".into(),
            user_id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn containment_matches_nested_objects_and_arrays() {
        let actual = json!({
            "name": "Drywall",
            "classification": {"trade": "a", "section": "b"},
            "store_prices": [{"store_id": "s1", "sku": "1"}, {"store_id": "s2", "sku": "2"}]
        });
        assert!(json_contains(&actual, &json!({"classification": {"section": "b"}})));
        assert!(json_contains(&actual, &json!({"store_prices": [{"store_id": "s2"}]})));
        assert!(!json_contains(&actual, &json!({"store_prices": [{"store_id": "s3"}]})));
        assert!(!json_contains(&actual, &json!({"classification": {"trade": "z"}})));
    }

    #[test]
    fn filter_checks_owner_and_fields() {
        let owner = Uuid::now_v7();
        let d = doc(owner, json!({"status": "draft", "number": 3}));

        assert!(Filter::owned_by(owner).eq("status", "draft").matches(&d));
        assert!(!Filter::owned_by(owner).eq("status", "invoice").matches(&d));
        assert!(!Filter::owned_by(Uuid::now_v7()).matches(&d));
        assert!(Filter::all().eq("number", 3).matches(&d));
        assert!(!Filter::all().eq("missing", 1).matches(&d));
    }
}
