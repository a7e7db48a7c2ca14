use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::project::{Address, Project, ProjectStatus};
use crate::services::Record;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub client_id: Uuid,
    pub name: String,
    pub service_address: Address,
    #[serde(default)]
    pub budget: f64,
    pub status: Option<ProjectStatus>,
    pub completion_percentage: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub client_id: Option<Uuid>,
    pub name: Option<String>,
    pub service_address: Option<Address>,
    pub budget: Option<f64>,
    pub status: Option<ProjectStatus>,
    pub completion_percentage: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordCostRequest {
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub client_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Record<Project>,
    pub remaining_budget: f64,
}

impl From<Record<Project>> for ProjectResponse {
    fn from(project: Record<Project>) -> Self {
        let remaining_budget = project.data.remaining_budget();
        Self { project, remaining_budget }
    }
}
