use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::project::{CreateProjectRequest, ProjectQuery, RecordCostRequest, UpdateProjectRequest};
use crate::error::AppError;
use crate::models::contact::Client;
use crate::models::project::{Project, ProjectStatus};
use crate::services::{required_name, Record, UserRepo};

pub struct ProjectService<'a> {
    repo: UserRepo<'a>,
}

impl<'a> ProjectService<'a> {
    pub fn new(repo: UserRepo<'a>) -> Self {
        Self { repo }
    }

    async fn check_client(&self, client_id: Uuid) -> Result<(), AppError> {
        if self.repo.get::<Client>(client_id).await?.is_none() {
            return Err(AppError::validation("Client not found"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProjectQuery) -> Result<Vec<Record<Project>>, AppError> {
        let mut filter = self.repo.filter();
        if let Some(client_id) = query.client_id {
            filter = filter.eq("client_id", client_id.to_string());
        }
        if let Some(status) = query.status {
            filter = filter.eq("status", serde_json::to_value(status)?);
        }
        self.repo.find(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Record<Project>, AppError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateProjectRequest) -> Result<Record<Project>, AppError> {
        self.check_client(req.client_id).await?;
        let mut project = Project {
            client_id: req.client_id,
            name: required_name(&req.name, "Project name")?,
            service_address: req.service_address,
            budget: req.budget,
            actual_cost: 0.0,
            status: req.status.unwrap_or(ProjectStatus::Planning),
            completion_percentage: req.completion_percentage.unwrap_or(0.0),
            notes: req.notes,
        };
        project.validate()?;

        let record = self.repo.insert(&project).await?;
        info!(id = %record.id, client_id = %record.data.client_id, "project created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: UpdateProjectRequest) -> Result<Record<Project>, AppError> {
        let mut project = self.repo.fetch::<Project>(id).await?.data;

        if let Some(client_id) = req.client_id {
            self.check_client(client_id).await?;
            project.client_id = client_id;
        }
        if let Some(name) = req.name {
            project.name = required_name(&name, "Project name")?;
        }
        project.service_address = req.service_address.unwrap_or(project.service_address);
        project.budget = req.budget.unwrap_or(project.budget);
        project.status = req.status.unwrap_or(project.status);
        project.completion_percentage = req.completion_percentage.unwrap_or(project.completion_percentage);
        project.notes = req.notes.or(project.notes);
        project.validate()?;

        self.repo.save(id, &project).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete::<Project>(id).await
    }

    /// Adds a spend to the project's running actual cost.
    #[instrument(skip(self))]
    pub async fn record_cost(&self, id: Uuid, req: &RecordCostRequest) -> Result<Record<Project>, AppError> {
        let mut project = self.repo.fetch::<Project>(id).await?.data;
        project.record_cost(req.amount)?;
        let record = self.repo.save(id, &project).await?;
        info!(%id, actual_cost = record.data.actual_cost, "project cost recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Address;
    use crate::store::MemoryDocumentStore;

    async fn client(repo: UserRepo<'_>) -> Uuid {
        repo.insert(&Client {
            name: "Rivera Family".into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        })
        .await
        .unwrap()
        .id
    }

    fn request(client_id: Uuid) -> CreateProjectRequest {
        CreateProjectRequest {
            client_id,
            name: "Kitchen remodel".into(),
            service_address: Address { street: "12 Elm St".into(), ..Default::default() },
            budget: 25_000.0,
            status: None,
            completion_percentage: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn client_must_exist() {
        let store = MemoryDocumentStore::new();
        let svc = ProjectService::new(UserRepo::new(&store, Uuid::now_v7()));
        assert!(matches!(svc.create(request(Uuid::now_v7())).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn completing_forces_full_progress() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepo::new(&store, Uuid::now_v7());
        let svc = ProjectService::new(repo);
        let project = svc.create(request(client(repo).await)).await.unwrap();
        assert_eq!(project.data.status, ProjectStatus::Planning);

        let done = svc
            .update(
                project.id,
                UpdateProjectRequest { status: Some(ProjectStatus::Completed), completion_percentage: Some(40.0), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(done.data.completion_percentage, 100.0);

        let bad = svc
            .update(
                project.id,
                UpdateProjectRequest { status: Some(ProjectStatus::InProgress), completion_percentage: Some(140.0), ..Default::default() },
            )
            .await;
        assert!(matches!(bad, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn costs_accumulate_against_budget() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepo::new(&store, Uuid::now_v7());
        let svc = ProjectService::new(repo);
        let project = svc.create(request(client(repo).await)).await.unwrap();

        svc.record_cost(project.id, &RecordCostRequest { amount: 4_000.0 }).await.unwrap();
        let after = svc.record_cost(project.id, &RecordCostRequest { amount: 1_500.5 }).await.unwrap();
        assert_eq!(after.data.actual_cost, 5_500.5);
        assert_eq!(after.data.remaining_budget(), 19_499.5);

        let zero = svc.record_cost(project.id, &RecordCostRequest { amount: 0.0 }).await;
        assert!(matches!(zero, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn list_filters_by_client_and_status() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepo::new(&store, Uuid::now_v7());
        let svc = ProjectService::new(repo);
        let first = client(repo).await;
        let second = client(repo).await;
        svc.create(request(first)).await.unwrap();
        let mut active = request(second);
        active.status = Some(ProjectStatus::InProgress);
        svc.create(active).await.unwrap();

        let by_client = svc
            .list(&ProjectQuery { client_id: Some(first), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_client.len(), 1);
        let by_status = svc
            .list(&ProjectQuery { status: Some(ProjectStatus::InProgress), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].data.client_id, second);
    }
}
