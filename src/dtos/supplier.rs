use serde::Deserialize;

/// Body for creating a store or a brand.
#[derive(Debug, Deserialize)]
pub struct CreateNamedRequest {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNamedRequest {
    pub name: Option<String>,
    pub website: Option<String>,
}
