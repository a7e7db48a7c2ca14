use serde::{Deserialize, Serialize};

use crate::services::Entity;

/// A supplier store where products are bought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl Entity for Store {
    const COLLECTION: &'static str = "stores";
    const LABEL: &'static str = "Store";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl Entity for Brand {
    const COLLECTION: &'static str = "brands";
    const LABEL: &'static str = "Brand";
}

/// Lookup records identified by a case-insensitive name.
pub trait NamedRecord: Entity {
    fn name(&self) -> &str;
    fn website(&self) -> Option<&str>;
    fn with_name(name: String, website: Option<String>) -> Self;
}

impl NamedRecord for Store {
    fn name(&self) -> &str {
        &self.name
    }

    fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    fn with_name(name: String, website: Option<String>) -> Self {
        Self { name, website }
    }
}

impl NamedRecord for Brand {
    fn name(&self) -> &str {
        &self.name
    }

    fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    fn with_name(name: String, website: Option<String>) -> Self {
        Self { name, website }
    }
}
