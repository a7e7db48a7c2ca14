use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use super::{ensure_object, Document, DocumentStore, Filter, StoreError};

/// Postgres-backed document store: one JSONB `documents` table.
///
/// Field filters are pushed down as `data @> $pattern`, which the GIN index
/// created by [`crate::database::ensure_schema`] serves.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    user_id: Uuid,
    data: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            collection: row.collection,
            user_id: row.user_id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, collection, user_id, data, created_at, updated_at";

fn backend(operation: &str, err: sqlx::Error) -> StoreError {
    error!(?err, operation, "Document store query failed");
    StoreError::Backend(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, user_id: Uuid, data: Value) -> Result<Document, StoreError> {
        ensure_object(&data)?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO documents (id, collection, user_id, data)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(collection)
        .bind(user_id)
        .bind(Json(data))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend("insert", e))?;

        Ok(row.into())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("get", e))?;

        Ok(row.map(Document::from))
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM documents
             WHERE collection = $1
               AND ($2::UUID IS NULL OR user_id = $2)
               AND data @> $3
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(collection)
        .bind(filter.user_id)
        .bind(Json(Value::Object(filter.pattern.clone())))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("query", e))?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn replace(&self, collection: &str, id: Uuid, data: Value) -> Result<Option<Document>, StoreError> {
        ensure_object(&data)?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "UPDATE documents SET data = $3, updated_at = NOW()
             WHERE collection = $1 AND id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("replace", e))?;

        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| backend("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
