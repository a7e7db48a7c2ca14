use serde::{Deserialize, Serialize};

use crate::services::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for Client {
    const COLLECTION: &'static str = "clients";
    const LABEL: &'static str = "Client";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    pub active: bool,
}

impl Entity for Employee {
    const COLLECTION: &'static str = "employees";
    const LABEL: &'static str = "Employee";
}
