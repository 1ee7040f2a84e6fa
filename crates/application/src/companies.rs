//! Company use cases.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use talentgrid_domain::companies::{Company, CompanyRepository};
use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{CompanyId, DomainError};
use talentgrid_domain::AggregateRoot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub company_id: String,
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub active: bool,
}

impl CompanyResponse {
    fn from_company(company: &Company) -> Self {
        Self {
            company_id: company.id.to_string(),
            name: company.name().to_string(),
            website: company.website().map(|w| w.to_string()),
            description: company.description().map(|d| d.to_string()),
            active: company.is_active(),
        }
    }
}

/// Register a hiring company.
pub struct RegisterCompanyUseCase {
    company_repository: Arc<dyn CompanyRepository>,
}

impl RegisterCompanyUseCase {
    pub fn new(company_repository: Arc<dyn CompanyRepository>) -> Self {
        Self { company_repository }
    }

    pub async fn execute(
        &self,
        request: RegisterCompanyRequest,
    ) -> anyhow::Result<CompanyResponse> {
        let mut company =
            Company::register(request.name, request.website, request.description)?;

        let inserts = OutboxRecordInsert::from_events(company.uncommitted_events())?;
        self.company_repository
            .save_with_events(&company, &inserts)
            .await?;
        company.clear_events();

        tracing::info!(company_id = %company.id, "Company registered");
        Ok(CompanyResponse::from_company(&company))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompanyRequest {
    pub company_id: Uuid,
    pub name: Option<String>,
    /// `Some(None)` clears the field; `None` leaves it untouched.
    pub website: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

/// Update company details; identical values make the call a no-op.
pub struct UpdateCompanyUseCase {
    company_repository: Arc<dyn CompanyRepository>,
}

impl UpdateCompanyUseCase {
    pub fn new(company_repository: Arc<dyn CompanyRepository>) -> Self {
        Self { company_repository }
    }

    pub async fn execute(&self, request: UpdateCompanyRequest) -> anyhow::Result<CompanyResponse> {
        let company_id = CompanyId(request.company_id);
        let mut company = self
            .company_repository
            .find_by_id(&company_id)
            .await?
            .ok_or(DomainError::CompanyNotFound { company_id })?;

        company.update_details(request.name, request.website, request.description)?;

        if !company.uncommitted_events().is_empty() {
            let inserts = OutboxRecordInsert::from_events(company.uncommitted_events())?;
            self.company_repository
                .update_with_events(&company, &inserts)
                .await?;
            company.clear_events();
        }

        Ok(CompanyResponse::from_company(&company))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateCompanyRequest {
    pub company_id: Uuid,
}

/// Deactivate a company; re-deactivating is a no-op.
pub struct DeactivateCompanyUseCase {
    company_repository: Arc<dyn CompanyRepository>,
}

impl DeactivateCompanyUseCase {
    pub fn new(company_repository: Arc<dyn CompanyRepository>) -> Self {
        Self { company_repository }
    }

    pub async fn execute(
        &self,
        request: DeactivateCompanyRequest,
    ) -> anyhow::Result<CompanyResponse> {
        let company_id = CompanyId(request.company_id);
        let mut company = self
            .company_repository
            .find_by_id(&company_id)
            .await?
            .ok_or(DomainError::CompanyNotFound { company_id })?;

        company.deactivate();

        if !company.uncommitted_events().is_empty() {
            let inserts = OutboxRecordInsert::from_events(company.uncommitted_events())?;
            self.company_repository
                .update_with_events(&company, &inserts)
                .await?;
            company.clear_events();
        }

        Ok(CompanyResponse::from_company(&company))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCompanyRepository;

    #[tokio::test]
    async fn register_writes_one_outbox_row() {
        let repo = Arc::new(InMemoryCompanyRepository::new());
        RegisterCompanyUseCase::new(repo.clone())
            .execute(RegisterCompanyRequest {
                name: "Initech".to_string(),
                website: None,
                description: None,
            })
            .await
            .unwrap();

        let rows = repo.outbox_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_type, "CompanyRegistered");
    }

    #[tokio::test]
    async fn deactivate_twice_writes_one_row() {
        let repo = Arc::new(InMemoryCompanyRepository::new());
        let registered = RegisterCompanyUseCase::new(repo.clone())
            .execute(RegisterCompanyRequest {
                name: "Initech".to_string(),
                website: None,
                description: None,
            })
            .await
            .unwrap();
        let company_id: Uuid = registered.company_id.parse().unwrap();

        let deactivate = DeactivateCompanyUseCase::new(repo.clone());
        deactivate
            .execute(DeactivateCompanyRequest { company_id })
            .await
            .unwrap();
        deactivate
            .execute(DeactivateCompanyRequest { company_id })
            .await
            .unwrap();

        // Registration plus a single deactivation.
        assert_eq!(repo.outbox_rows().len(), 2);
    }
}
