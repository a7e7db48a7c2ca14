use serde::{Deserialize, Serialize};

use crate::services::Entity;

pub const ROLES: [&str; 2] = ["admin", "member"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
}
