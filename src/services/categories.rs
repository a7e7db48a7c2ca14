//! Hierarchical category loader.
//!
//! Options are fetched level by level (trade, then sections of the trade,
//! and so on) and memoized per sibling list in [`CategoryCache`]. Adding or
//! deleting a node invalidates exactly the list it belongs to.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::{CategoryKind, CategoryLevel, CategoryNode, CategorySelection};
use crate::models::labor::LaborItem;
use crate::models::product::Product;
use crate::services::category_cache::{CacheKey, CategoryCache, CategoryOption};
use crate::services::{required_name, Record, UserRepo};

#[derive(Debug, Clone, Serialize)]
pub struct LevelOptions {
    pub level: CategoryLevel,
    pub options: Vec<CategoryOption>,
    pub selected: Option<Uuid>,
}

/// Result of resolving a partial selection against the stored tree.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedHierarchy {
    pub kind: CategoryKind,
    /// The input selection with unknown ids (and their descendants) dropped.
    pub selection: CategorySelection,
    pub levels: Vec<LevelOptions>,
}

pub struct CategoryService<'a> {
    repo: UserRepo<'a>,
    cache: &'a CategoryCache,
}

impl<'a> CategoryService<'a> {
    pub fn new(repo: UserRepo<'a>, cache: &'a CategoryCache) -> Self {
        Self { repo, cache }
    }

    fn key(&self, kind: CategoryKind, level: CategoryLevel, parent_id: Option<Uuid>) -> CacheKey {
        CacheKey { user_id: self.repo.user_id(), kind, level, parent_id }
    }

    fn check_shape(kind: CategoryKind, level: CategoryLevel, parent_id: Option<Uuid>) -> Result<(), AppError> {
        if !kind.allows(level) {
            return Err(AppError::validation(format!(
                "{} categories have no {level} level",
                kind.as_str()
            )));
        }
        match (level, parent_id) {
            (CategoryLevel::Trade, Some(_)) => Err(AppError::validation("Trades have no parent")),
            (CategoryLevel::Trade, None) => Ok(()),
            (_, None) => Err(AppError::validation(format!("A parent is required for {level} options"))),
            (_, Some(_)) => Ok(()),
        }
    }

    async fn siblings(
        &self,
        kind: CategoryKind,
        level: CategoryLevel,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<Record<CategoryNode>>, AppError> {
        let filter = self
            .repo
            .filter()
            .eq("kind", kind.as_str())
            .eq("level", level.as_str())
            .eq("parent_id", json!(parent_id));
        self.repo.find::<CategoryNode>(filter).await
    }

    /// Options at one level under one parent, sorted by name.
    #[instrument(skip(self))]
    pub async fn list_options(
        &self,
        kind: CategoryKind,
        level: CategoryLevel,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<CategoryOption>, AppError> {
        Self::check_shape(kind, level, parent_id)?;
        let key = self.key(kind, level, parent_id);
        if let Some(options) = self.cache.get(&key) {
            debug!("category cache hit");
            return Ok(options);
        }
        debug!("category cache miss");
        let generation = self.cache.generation(&key);

        let mut options: Vec<CategoryOption> = self
            .siblings(kind, level, parent_id)
            .await?
            .into_iter()
            .map(|r| CategoryOption { id: r.id, name: r.data.name })
            .collect();
        options.sort_by_key(|o| o.name.to_lowercase());

        if !self.cache.put(key, options.clone(), generation) {
            debug!("category list changed while loading, not cached");
        }
        Ok(options)
    }

    /// Walks the selection top-down, loading each level's options under the
    /// level above. Loading stops at the first unselected (or unknown) level.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        kind: CategoryKind,
        selection: &CategorySelection,
    ) -> Result<ResolvedHierarchy, AppError> {
        let mut normalized = CategorySelection::default();
        let mut levels = Vec::with_capacity(kind.levels().len());
        let mut parent: Option<Uuid> = None;
        let mut open = true;

        for &level in kind.levels() {
            if !open {
                levels.push(LevelOptions { level, options: Vec::new(), selected: None });
                continue;
            }
            let options = self.list_options(kind, level, parent).await?;
            let selected = selection
                .get(level)
                .filter(|id| options.iter().any(|o| o.id == *id));
            match selected {
                Some(id) => {
                    normalized.select(level, id);
                    parent = Some(id);
                }
                None => open = false,
            }
            levels.push(LevelOptions { level, options, selected });
        }

        Ok(ResolvedHierarchy { kind, selection: normalized, levels })
    }

    /// Inserts a new option after a case-insensitive duplicate check among
    /// its siblings.
    #[instrument(skip(self))]
    pub async fn add_option(
        &self,
        kind: CategoryKind,
        level: CategoryLevel,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<CategoryOption, AppError> {
        Self::check_shape(kind, level, parent_id)?;
        let name = required_name(name, "Category name")?;

        if let (Some(parent_id), Some(parent_level)) = (parent_id, level.parent()) {
            let parent = self
                .repo
                .get::<CategoryNode>(parent_id)
                .await?
                .ok_or_else(|| AppError::validation("Parent category not found"))?;
            if parent.data.kind != kind || parent.data.level != parent_level {
                return Err(AppError::validation(format!(
                    "Parent must be a {} {parent_level}",
                    kind.as_str()
                )));
            }
        }

        let lowered = name.to_lowercase();
        let duplicate = self
            .siblings(kind, level, parent_id)
            .await?
            .iter()
            .any(|s| s.data.name.to_lowercase() == lowered);
        if duplicate {
            return Err(AppError::conflict(format!("{level} '{name}' already exists")));
        }

        let node = self
            .repo
            .insert(&CategoryNode { kind, level, name, parent_id })
            .await?;
        self.cache.invalidate(&self.key(kind, level, parent_id));
        info!(id = %node.id, "category option added");

        Ok(CategoryOption { id: node.id, name: node.data.name })
    }

    /// Deletes a leaf node that no product or labor item uses.
    #[instrument(skip(self))]
    pub async fn delete_option(&self, id: Uuid) -> Result<(), AppError> {
        let node = self.repo.fetch::<CategoryNode>(id).await?;

        let has_children = self
            .repo
            .exists::<CategoryNode>(self.repo.filter().eq("parent_id", id.to_string()))
            .await?;
        if has_children {
            return Err(AppError::conflict("Category has sub-categories"));
        }

        let mut path = serde_json::Map::new();
        path.insert(node.data.level.as_str().to_string(), json!(id));
        let usage = self.repo.filter().eq("classification", path);
        let in_use = match node.data.kind {
            CategoryKind::Product => self.repo.exists::<Product>(usage).await?,
            CategoryKind::Labor => self.repo.exists::<LaborItem>(usage).await?,
        };
        if in_use {
            return Err(AppError::conflict("Category is in use"));
        }

        self.repo.delete::<CategoryNode>(id).await?;
        self.cache
            .invalidate(&self.key(node.data.kind, node.data.level, node.data.parent_id));
        info!("category option deleted");
        Ok(())
    }

    /// Checks that `selection` is a real path of the `kind` tree: contiguous
    /// from trade, each node at its level, each under the selected parent.
    pub async fn validate_selection(
        &self,
        kind: CategoryKind,
        selection: &CategorySelection,
    ) -> Result<(), AppError> {
        if let Some(deepest) = selection.deepest() {
            if !kind.allows(deepest) {
                return Err(AppError::validation(format!(
                    "{} classification cannot go below {}",
                    kind.as_str(),
                    kind.deepest()
                )));
            }
        }
        if !selection.is_contiguous() {
            return Err(AppError::validation("Classification must be selected from trade downwards"));
        }

        for (level, id) in selection.iter() {
            let node = self
                .repo
                .get::<CategoryNode>(id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown {level} in classification")))?;
            let expected_parent = level.parent().and_then(|p| selection.get(p));
            if node.data.kind != kind || node.data.level != level || node.data.parent_id != expected_parent {
                return Err(AppError::validation(format!(
                    "Selected {level} does not belong to the selected parent"
                )));
            }
        }
        Ok(())
    }
}
