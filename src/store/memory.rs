use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ensure_object, Document, DocumentStore, Filter, StoreError};

/// In-memory document store.
///
/// Used when no database is configured and by the tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<Uuid, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, user_id: Uuid, data: Value) -> Result<Document, StoreError> {
        ensure_object(&data)?;
        let now = Utc::now();
        let doc = Document {
            id: Uuid::now_v7(),
            collection: collection.to_string(),
            user_id,
            data,
            created_at: now,
            updated_at: now,
        };
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(&id)).cloned())
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|c| c.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        // v7 ids are time ordered, which keeps same-instant inserts stable.
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(docs)
    }

    async fn replace(&self, collection: &str, id: Uuid, data: Value) -> Result<Option<Document>, StoreError> {
        ensure_object(&data)?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
            return Ok(None);
        };
        doc.data = data;
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .map(|c| c.remove(&id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_get_replace_delete() {
        let store = MemoryDocumentStore::new();
        let user = Uuid::now_v7();

        let doc = store.insert("clients", user, json!({"name": "Acme"})).await.unwrap();
        let fetched = store.get("clients", doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["name"], "Acme");
        assert_eq!(fetched.user_id, user);

        let replaced = store
            .replace("clients", doc.id, json!({"name": "Acme Builders"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.data["name"], "Acme Builders");
        assert!(replaced.updated_at >= replaced.created_at);

        assert!(store.delete("clients", doc.id).await.unwrap());
        assert!(!store.delete("clients", doc.id).await.unwrap());
        assert!(store.get("clients", doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        let user = Uuid::now_v7();
        let doc = store.insert("stores", user, json!({"name": "Depot"})).await.unwrap();

        assert!(store.get("brands", doc.id).await.unwrap().is_none());
        assert!(store.replace("brands", doc.id, json!({})).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_is_scoped_and_ordered() {
        let store = MemoryDocumentStore::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        for n in 1..=3 {
            store.insert("estimates", alice, json!({"number": n, "status": "draft"})).await.unwrap();
        }
        store.insert("estimates", bob, json!({"number": 1, "status": "draft"})).await.unwrap();

        let mine = store.query("estimates", &Filter::owned_by(alice)).await.unwrap();
        let numbers: Vec<i64> = mine.iter().map(|d| d.data["number"].as_i64().unwrap()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let drafts = store.query("estimates", &Filter::all().eq("status", "draft")).await.unwrap();
        assert_eq!(drafts.len(), 4);
    }

    #[tokio::test]
    async fn non_object_documents_are_rejected() {
        let store = MemoryDocumentStore::new();
        let err = store.insert("clients", Uuid::now_v7(), json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }
}
