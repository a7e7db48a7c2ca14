use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use uuid::Uuid;

use crate::models::category::{CategoryKind, CategoryLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: Uuid,
    pub kind: CategoryKind,
    pub level: CategoryLevel,
    pub parent_id: Option<Uuid>,
}

/// Memoized option lists, one entry per (user, kind, level, parent).
///
/// Writers must call [`CategoryCache::invalidate`] for the sibling list they
/// changed; nothing expires on its own. Each key carries a generation that
/// `invalidate` bumps, and a [`CategoryCache::put`] tagged with an older
/// generation is dropped.
#[derive(Debug, Default)]
pub struct CategoryCache {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    lists: HashMap<CacheKey, Vec<CategoryOption>>,
    generations: HashMap<CacheKey, u64>,
}

impl CategoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<CategoryOption>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.lists.get(key).cloned()
    }

    /// Read before loading a list from the store and hand back to `put`.
    pub fn generation(&self, key: &CacheKey) -> u64 {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.generations.get(key).copied().unwrap_or(0)
    }

    /// Stores `options` unless the key was invalidated after `generation`
    /// was read. Returns whether the list was stored.
    pub fn put(&self, key: CacheKey, options: Vec<CategoryOption>, generation: u64) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.generations.get(&key).copied().unwrap_or(0) != generation {
            return false;
        }
        inner.lists.insert(key, options);
        true
    }

    pub fn invalidate(&self, key: &CacheKey) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.lists.remove(key);
        *inner.generations.entry(*key).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user_id: Uuid, level: CategoryLevel, parent_id: Option<Uuid>) -> CacheKey {
        CacheKey { user_id, kind: CategoryKind::Product, level, parent_id }
    }

    #[test]
    fn put_get_invalidate() {
        let cache = CategoryCache::new();
        let user = Uuid::now_v7();
        let k = key(user, CategoryLevel::Trade, None);
        assert!(cache.get(&k).is_none());

        let option = CategoryOption { id: Uuid::now_v7(), name: "Plumbing".into() };
        assert!(cache.put(k, vec![option.clone()], cache.generation(&k)));
        assert_eq!(cache.get(&k), Some(vec![option]));

        cache.invalidate(&k);
        assert!(cache.get(&k).is_none());
    }

    #[test]
    fn keys_distinguish_parent_and_kind() {
        let cache = CategoryCache::new();
        let user = Uuid::now_v7();
        let parent = Some(Uuid::now_v7());
        let section = key(user, CategoryLevel::Section, parent);
        cache.put(section, vec![], cache.generation(&section));

        assert!(cache.get(&key(user, CategoryLevel::Section, Some(Uuid::now_v7()))).is_none());
        let labor = CacheKey { kind: CategoryKind::Labor, ..key(user, CategoryLevel::Section, parent) };
        assert!(cache.get(&labor).is_none());
    }

    #[test]
    fn put_after_concurrent_invalidate_is_dropped() {
        let cache = CategoryCache::new();
        let k = key(Uuid::now_v7(), CategoryLevel::Trade, None);
        let plumbing = CategoryOption { id: Uuid::now_v7(), name: "Plumbing".into() };
        let roofing = CategoryOption { id: Uuid::now_v7(), name: "Roofing".into() };

        // A reader loads the old list, then a writer adds an option and
        // invalidates before the reader stores what it loaded.
        let seen = cache.generation(&k);
        let stale = vec![plumbing.clone()];
        cache.invalidate(&k);
        assert!(!cache.put(k, stale, seen));
        assert!(cache.get(&k).is_none());

        // The next reader loads the fresh list and keeps it.
        let fresh = vec![plumbing, roofing];
        assert!(cache.put(k, fresh.clone(), cache.generation(&k)));
        assert_eq!(cache.get(&k), Some(fresh));
    }
}
