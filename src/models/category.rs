use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::Entity;

/// Nesting levels of the classification tree, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryLevel {
    Trade,
    Section,
    Category,
    Subcategory,
    Type,
    Size,
}

impl CategoryLevel {
    pub const ALL: [CategoryLevel; 6] = [
        CategoryLevel::Trade,
        CategoryLevel::Section,
        CategoryLevel::Category,
        CategoryLevel::Subcategory,
        CategoryLevel::Type,
        CategoryLevel::Size,
    ];

    pub fn depth(self) -> usize {
        self as usize
    }

    pub fn parent(self) -> Option<Self> {
        self.depth().checked_sub(1).map(|d| Self::ALL[d])
    }

    /// Levels strictly below this one.
    pub fn descendants(self) -> &'static [CategoryLevel] {
        &Self::ALL[self.depth() + 1..]
    }

    /// Field name used in stored classifications.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryLevel::Trade => "trade",
            CategoryLevel::Section => "section",
            CategoryLevel::Category => "category",
            CategoryLevel::Subcategory => "subcategory",
            CategoryLevel::Type => "type",
            CategoryLevel::Size => "size",
        }
    }
}

impl fmt::Display for CategoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category level '{s}'"))
    }
}

/// Which tree a node belongs to. Products use all six levels, labor items
/// stop at `Category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Product,
    Labor,
}

impl CategoryKind {
    pub fn deepest(self) -> CategoryLevel {
        match self {
            CategoryKind::Product => CategoryLevel::Size,
            CategoryKind::Labor => CategoryLevel::Category,
        }
    }

    pub fn levels(self) -> &'static [CategoryLevel] {
        &CategoryLevel::ALL[..=self.deepest().depth()]
    }

    pub fn allows(self, level: CategoryLevel) -> bool {
        level <= self.deepest()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Product => "product",
            CategoryKind::Labor => "labor",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(CategoryKind::Product),
            "labor" | "labour" => Ok(CategoryKind::Labor),
            _ => Err(format!("unknown category kind '{s}'")),
        }
    }
}

/// A node of the classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub kind: CategoryKind,
    pub level: CategoryLevel,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl Entity for CategoryNode {
    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";
}

/// A partial path through the tree: one optional node id per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    #[serde(default)]
    pub trade: Option<Uuid>,
    #[serde(default)]
    pub section: Option<Uuid>,
    #[serde(default)]
    pub category: Option<Uuid>,
    #[serde(default)]
    pub subcategory: Option<Uuid>,
    #[serde(default, rename = "type")]
    pub kind: Option<Uuid>,
    #[serde(default)]
    pub size: Option<Uuid>,
}

impl CategorySelection {
    pub fn get(&self, level: CategoryLevel) -> Option<Uuid> {
        match level {
            CategoryLevel::Trade => self.trade,
            CategoryLevel::Section => self.section,
            CategoryLevel::Category => self.category,
            CategoryLevel::Subcategory => self.subcategory,
            CategoryLevel::Type => self.kind,
            CategoryLevel::Size => self.size,
        }
    }

    fn slot(&mut self, level: CategoryLevel) -> &mut Option<Uuid> {
        match level {
            CategoryLevel::Trade => &mut self.trade,
            CategoryLevel::Section => &mut self.section,
            CategoryLevel::Category => &mut self.category,
            CategoryLevel::Subcategory => &mut self.subcategory,
            CategoryLevel::Type => &mut self.kind,
            CategoryLevel::Size => &mut self.size,
        }
    }

    /// Selects `id` at `level`. Every descendant selection is cleared, since
    /// it hung under the previous choice.
    pub fn select(&mut self, level: CategoryLevel, id: Uuid) {
        *self.slot(level) = Some(id);
        for child in level.descendants() {
            *self.slot(*child) = None;
        }
    }

    /// Clears `level` and everything below it.
    pub fn clear(&mut self, level: CategoryLevel) {
        *self.slot(level) = None;
        for child in level.descendants() {
            *self.slot(*child) = None;
        }
    }

    /// Applies a partial update top-down. A level that changes clears its
    /// descendants, which the patch may then set again.
    pub fn apply(&mut self, patch: &CategorySelection) {
        for level in CategoryLevel::ALL {
            if let Some(id) = patch.get(level) {
                if self.get(level) != Some(id) {
                    self.select(level, id);
                }
            }
        }
    }

    pub fn deepest(&self) -> Option<CategoryLevel> {
        CategoryLevel::ALL.into_iter().rev().find(|l| self.get(*l).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.deepest().is_none()
    }

    /// True when no level is set below an unset one.
    pub fn is_contiguous(&self) -> bool {
        match self.deepest() {
            None => true,
            Some(deepest) => CategoryLevel::ALL[..=deepest.depth()]
                .iter()
                .all(|l| self.get(*l).is_some()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryLevel, Uuid)> + '_ {
        CategoryLevel::ALL
            .into_iter()
            .filter_map(|l| self.get(l).map(|id| (l, id)))
    }
}
