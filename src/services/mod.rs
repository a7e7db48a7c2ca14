//! Business services. Each one works on behalf of a single user and reaches
//! the document store through [`UserRepo`], which enforces that scoping.

pub mod categories;
pub mod category_cache;
pub mod contacts;
pub mod estimates;
pub mod extension;
pub mod labor;
pub mod pricing;
pub mod products;
pub mod projects;
pub mod suppliers;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{Document, DocumentStore, Filter};

/// A typed document kind living in one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages.
    const LABEL: &'static str;
}

/// A stored entity together with its document metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Record<T> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Entity> Record<T> {
    pub fn from_document(doc: Document) -> Result<Self, AppError> {
        let data = serde_json::from_value(doc.data).map_err(|e| {
            AppError::internal(format!("Corrupt {} document {}: {e}", T::LABEL, doc.id))
        })?;
        Ok(Self {
            id: doc.id,
            user_id: doc.user_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            data,
        })
    }
}

/// Store access scoped to one user. Documents owned by someone else are
/// indistinguishable from missing ones.
#[derive(Clone, Copy)]
pub struct UserRepo<'a> {
    store: &'a dyn DocumentStore,
    user_id: Uuid,
}

impl<'a> UserRepo<'a> {
    pub fn new(store: &'a dyn DocumentStore, user_id: Uuid) -> Self {
        Self { store, user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn filter(&self) -> Filter {
        Filter::owned_by(self.user_id)
    }

    pub async fn list<T: Entity>(&self) -> Result<Vec<Record<T>>, AppError> {
        self.find(self.filter()).await
    }

    /// Runs `filter` with the owner forced to this user.
    pub async fn find<T: Entity>(&self, mut filter: Filter) -> Result<Vec<Record<T>>, AppError> {
        filter.user_id = Some(self.user_id);
        self.store
            .query(T::COLLECTION, &filter)
            .await?
            .into_iter()
            .map(Record::from_document)
            .collect()
    }

    pub async fn exists<T: Entity>(&self, filter: Filter) -> Result<bool, AppError> {
        Ok(!self.find::<T>(filter).await?.is_empty())
    }

    pub async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<Record<T>>, AppError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) if doc.user_id == self.user_id => Ok(Some(Record::from_document(doc)?)),
            _ => Ok(None),
        }
    }

    pub async fn fetch<T: Entity>(&self, id: Uuid) -> Result<Record<T>, AppError> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} not found", T::LABEL)))
    }

    pub async fn insert<T: Entity>(&self, data: &T) -> Result<Record<T>, AppError> {
        let doc = self
            .store
            .insert(T::COLLECTION, self.user_id, serde_json::to_value(data)?)
            .await?;
        Record::from_document(doc)
    }

    /// Writes `data` over the document `id`, which must belong to this user.
    pub async fn save<T: Entity>(&self, id: Uuid, data: &T) -> Result<Record<T>, AppError> {
        self.fetch::<T>(id).await?;
        let doc = self
            .store
            .replace(T::COLLECTION, id, serde_json::to_value(data)?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} not found", T::LABEL)))?;
        Record::from_document(doc)
    }

    pub async fn delete<T: Entity>(&self, id: Uuid) -> Result<(), AppError> {
        self.fetch::<T>(id).await?;
        if !self.store.delete(T::COLLECTION, id).await? {
            return Err(AppError::not_found(format!("{} not found", T::LABEL)));
        }
        Ok(())
    }
}

/// Trims a required name, rejecting blanks.
pub fn required_name(raw: &str, what: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{what} is required")));
    }
    Ok(name.to_string())
}

/// Rejects negative (or non-finite) amounts.
pub fn non_negative(value: f64, what: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!("{what} cannot be negative")));
    }
    Ok(value)
}

/// Rounds a currency amount to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl Entity for Note {
        const COLLECTION: &'static str = "notes";
        const LABEL: &'static str = "Note";
    }

    #[tokio::test]
    async fn repo_hides_other_users_documents() {
        let store = MemoryDocumentStore::new();
        let alice = UserRepo::new(&store, Uuid::now_v7());
        let bob = UserRepo::new(&store, Uuid::now_v7());

        let note = alice.insert(&Note { text: "hi".into() }).await.unwrap();

        assert!(bob.get::<Note>(note.id).await.unwrap().is_none());
        assert!(matches!(bob.fetch::<Note>(note.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            bob.save(note.id, &Note { text: "mine now".into() }).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(bob.delete::<Note>(note.id).await, Err(AppError::NotFound(_))));
        assert!(bob.list::<Note>().await.unwrap().is_empty());

        let fetched = alice.fetch::<Note>(note.id).await.unwrap();
        assert_eq!(fetched.data.text, "hi");
    }

    #[tokio::test]
    async fn find_cannot_escape_the_owner() {
        let store = MemoryDocumentStore::new();
        let alice = UserRepo::new(&store, Uuid::now_v7());
        let bob = UserRepo::new(&store, Uuid::now_v7());
        alice.insert(&Note { text: "a".into() }).await.unwrap();

        let found = bob.find::<Note>(Filter::all().eq("text", "a")).await.unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn helpers() {
        assert_eq!(required_name("  Deck  ", "Name").unwrap(), "Deck");
        assert!(required_name("   ", "Name").is_err());
        assert!(non_negative(-0.01, "Price").is_err());
        assert!(non_negative(f64::NAN, "Price").is_err());
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
