//! Skill catalog use cases.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::search::{Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use talentgrid_domain::shared_kernel::DomainError;
use talentgrid_domain::skills::{Skill, SkillRepository};
use talentgrid_domain::AggregateRoot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillResponse {
    pub skill_id: String,
    pub name: String,
    pub category: Option<String>,
}

impl SkillResponse {
    fn from_skill(skill: &Skill) -> Self {
        Self {
            skill_id: skill.id.to_string(),
            name: skill.name().to_string(),
            category: skill.category().map(|c| c.to_string()),
        }
    }
}

/// Add a skill to the catalog. Names are unique.
pub struct CreateSkillUseCase {
    skill_repository: Arc<dyn SkillRepository>,
}

impl CreateSkillUseCase {
    pub fn new(skill_repository: Arc<dyn SkillRepository>) -> Self {
        Self { skill_repository }
    }

    pub async fn execute(&self, request: CreateSkillRequest) -> anyhow::Result<SkillResponse> {
        if self
            .skill_repository
            .find_by_name(&request.name)
            .await?
            .is_some()
        {
            return Err(DomainError::validation("name", "skill name already exists").into());
        }

        let mut skill = Skill::create(request.name, request.category)?;

        let inserts = OutboxRecordInsert::from_events(skill.uncommitted_events())?;
        self.skill_repository
            .save_with_events(&skill, &inserts)
            .await?;
        skill.clear_events();

        tracing::info!(skill_id = %skill.id, name = skill.name(), "Skill created");
        Ok(SkillResponse::from_skill(&skill))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSkillRequest {
    pub skill_id: Uuid,
    pub name: String,
}

/// Rename a catalog skill; renaming to the current name is a no-op.
pub struct RenameSkillUseCase {
    skill_repository: Arc<dyn SkillRepository>,
}

impl RenameSkillUseCase {
    pub fn new(skill_repository: Arc<dyn SkillRepository>) -> Self {
        Self { skill_repository }
    }

    pub async fn execute(&self, request: RenameSkillRequest) -> anyhow::Result<SkillResponse> {
        let skill_id = talentgrid_domain::shared_kernel::SkillId(request.skill_id);
        let mut skill = self
            .skill_repository
            .find_by_id(&skill_id)
            .await?
            .ok_or(DomainError::SkillNotFound { skill_id })?;

        skill.rename(request.name)?;

        if !skill.uncommitted_events().is_empty() {
            let inserts = OutboxRecordInsert::from_events(skill.uncommitted_events())?;
            self.skill_repository
                .update_with_events(&skill, &inserts)
                .await?;
            skill.clear_events();
        }

        Ok(SkillResponse::from_skill(&skill))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSkillsRequest {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Paginated catalog listing ordered by name.
pub struct ListSkillsUseCase {
    skill_repository: Arc<dyn SkillRepository>,
}

impl ListSkillsUseCase {
    pub fn new(skill_repository: Arc<dyn SkillRepository>) -> Self {
        Self { skill_repository }
    }

    pub async fn execute(&self, request: ListSkillsRequest) -> anyhow::Result<Page<SkillResponse>> {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let (skills, total) = self.skill_repository.find_all(limit, offset).await?;

        Ok(Page {
            data: skills.iter().map(SkillResponse::from_skill).collect(),
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySkillRepository;

    #[tokio::test]
    async fn create_skill_writes_one_outbox_row() {
        let repo = Arc::new(InMemorySkillRepository::new());
        let use_case = CreateSkillUseCase::new(repo.clone());

        use_case
            .execute(CreateSkillRequest {
                name: "Rust".to_string(),
                category: Some("Languages".to_string()),
            })
            .await
            .unwrap();

        let rows = repo.outbox_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_type, "SkillCreated");
    }

    #[tokio::test]
    async fn duplicate_skill_name_is_rejected() {
        let repo = Arc::new(InMemorySkillRepository::new());
        let use_case = CreateSkillUseCase::new(repo.clone());
        use_case
            .execute(CreateSkillRequest {
                name: "Rust".to_string(),
                category: None,
            })
            .await
            .unwrap();

        let result = use_case
            .execute(CreateSkillRequest {
                name: "Rust".to_string(),
                category: None,
            })
            .await;

        assert!(result.is_err());
        assert_eq!(repo.outbox_rows().len(), 1);
    }

    #[tokio::test]
    async fn list_skills_paginates() {
        let repo = Arc::new(InMemorySkillRepository::new());
        let create = CreateSkillUseCase::new(repo.clone());
        for name in ["Rust", "Go", "Python", "Kafka", "Postgres"] {
            create
                .execute(CreateSkillRequest {
                    name: name.to_string(),
                    category: None,
                })
                .await
                .unwrap();
        }

        let page = ListSkillsUseCase::new(repo)
            .execute(ListSkillsRequest {
                page: Some(2),
                limit: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 2);
    }
}
