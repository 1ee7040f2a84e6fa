//! Skill catalog bounded context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::outbox::OutboxRecordInsert;
use crate::shared_kernel::{
    require_max_len, require_non_empty, AggregateRoot, Result, SkillId,
};

const MAX_SKILL_NAME_LEN: usize = 80;
const MAX_CATEGORY_LEN: usize = 80;

/// A skill in the platform catalog, referenced by candidate profiles and
/// search filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    name: String,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Skill {
    pub fn create(name: String, category: Option<String>) -> Result<Self> {
        validate_name(&name)?;
        if let Some(ref c) = category {
            require_max_len("category", c, MAX_CATEGORY_LEN)?;
        }

        let now = Utc::now();
        let mut skill = Self {
            id: SkillId::new(),
            name,
            category,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        skill.record(DomainEvent::SkillCreated {
            skill_id: skill.id,
            name: skill.name.clone(),
            category: skill.category.clone(),
            occurred_at: now,
        });
        Ok(skill)
    }

    pub fn from_parts(
        id: SkillId,
        name: String,
        category: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category,
            created_at,
            updated_at,
            events: Vec::new(),
        }
    }

    /// Rename the skill. Renaming to the current name is a no-op.
    pub fn rename(&mut self, name: String) -> Result<()> {
        validate_name(&name)?;
        if name == self.name {
            return Ok(());
        }

        self.name = name;
        self.updated_at = Utc::now();
        self.record(DomainEvent::SkillRenamed {
            skill_id: self.id,
            name: self.name.clone(),
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl AggregateRoot for Skill {
    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn uncommitted_events(&self) -> &[DomainEvent] {
        &self.events
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }
}

fn validate_name(name: &str) -> Result<()> {
    require_non_empty("name", name)?;
    require_max_len("name", name, MAX_SKILL_NAME_LEN)
}

/// Persistence port for the skill catalog.
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn save_with_events(&self, skill: &Skill, events: &[OutboxRecordInsert]) -> Result<()>;

    async fn update_with_events(&self, skill: &Skill, events: &[OutboxRecordInsert])
        -> Result<()>;

    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Skill>>;

    /// Page of skills ordered by name, plus the total count.
    async fn find_all(&self, limit: usize, offset: usize) -> Result<(Vec<Skill>, usize)>;
}
