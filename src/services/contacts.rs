//! Clients and employees.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::contact::{CreateClientRequest, CreateEmployeeRequest, UpdateClientRequest, UpdateEmployeeRequest};
use crate::error::AppError;
use crate::models::contact::{Client, Employee};
use crate::models::project::Project;
use crate::services::{non_negative, required_name, Record, UserRepo};

pub struct ContactService<'a> {
    repo: UserRepo<'a>,
}

impl<'a> ContactService<'a> {
    pub fn new(repo: UserRepo<'a>) -> Self {
        Self { repo }
    }

    pub async fn list_clients(&self) -> Result<Vec<Record<Client>>, AppError> {
        let mut clients = self.repo.list::<Client>().await?;
        clients.sort_by_key(|c| c.data.name.to_lowercase());
        Ok(clients)
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Record<Client>, AppError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn create_client(&self, req: CreateClientRequest) -> Result<Record<Client>, AppError> {
        let client = Client {
            name: required_name(&req.name, "Client name")?,
            email: req.email,
            phone: req.phone,
            address: req.address,
            notes: req.notes,
        };
        let record = self.repo.insert(&client).await?;
        info!(id = %record.id, "client created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update_client(&self, id: Uuid, req: UpdateClientRequest) -> Result<Record<Client>, AppError> {
        let mut client = self.repo.fetch::<Client>(id).await?.data;
        if let Some(name) = req.name {
            client.name = required_name(&name, "Client name")?;
        }
        client.email = req.email.or(client.email);
        client.phone = req.phone.or(client.phone);
        client.address = req.address.or(client.address);
        client.notes = req.notes.or(client.notes);
        self.repo.save(id, &client).await
    }

    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let has_projects = self
            .repo
            .exists::<Project>(self.repo.filter().eq("client_id", id.to_string()))
            .await?;
        if has_projects {
            return Err(AppError::conflict("Cannot delete a client with projects"));
        }
        self.repo.delete::<Client>(id).await
    }

    pub async fn list_employees(&self) -> Result<Vec<Record<Employee>>, AppError> {
        let mut employees = self.repo.list::<Employee>().await?;
        employees.sort_by_key(|e| e.data.name.to_lowercase());
        Ok(employees)
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<Record<Employee>, AppError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn create_employee(&self, req: CreateEmployeeRequest) -> Result<Record<Employee>, AppError> {
        if let Some(rate) = req.hourly_rate {
            non_negative(rate, "Hourly rate")?;
        }
        let employee = Employee {
            name: required_name(&req.name, "Employee name")?,
            title: req.title,
            email: req.email,
            phone: req.phone,
            hourly_rate: req.hourly_rate,
            active: req.active.unwrap_or(true),
        };
        let record = self.repo.insert(&employee).await?;
        info!(id = %record.id, "employee created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update_employee(&self, id: Uuid, req: UpdateEmployeeRequest) -> Result<Record<Employee>, AppError> {
        let mut employee = self.repo.fetch::<Employee>(id).await?.data;
        if let Some(name) = req.name {
            employee.name = required_name(&name, "Employee name")?;
        }
        if let Some(rate) = req.hourly_rate {
            employee.hourly_rate = Some(non_negative(rate, "Hourly rate")?);
        }
        employee.title = req.title.or(employee.title);
        employee.email = req.email.or(employee.email);
        employee.phone = req.phone.or(employee.phone);
        employee.active = req.active.unwrap_or(employee.active);
        self.repo.save(id, &employee).await
    }

    pub async fn delete_employee(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete::<Employee>(id).await
    }
}
