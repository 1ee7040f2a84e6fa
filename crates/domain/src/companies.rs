//! Company bounded context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::outbox::OutboxRecordInsert;
use crate::shared_kernel::{
    require_max_len, require_non_empty, AggregateRoot, CompanyId, Result,
};

const MAX_COMPANY_NAME_LEN: usize = 160;
const MAX_WEBSITE_LEN: usize = 300;
const MAX_DESCRIPTION_LEN: usize = 2000;

/// A hiring company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    name: String,
    website: Option<String>,
    description: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Company {
    pub fn register(
        name: String,
        website: Option<String>,
        description: Option<String>,
    ) -> Result<Self> {
        validate_fields(&name, website.as_deref(), description.as_deref())?;

        let now = Utc::now();
        let mut company = Self {
            id: CompanyId::new(),
            name,
            website,
            description,
            active: true,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        company.record(DomainEvent::CompanyRegistered {
            company_id: company.id,
            name: company.name.clone(),
            occurred_at: now,
        });
        Ok(company)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: CompanyId,
        name: String,
        website: Option<String>,
        description: Option<String>,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            website,
            description,
            active,
            created_at,
            updated_at,
            events: Vec::new(),
        }
    }

    /// Update company details. Identical values across every provided field
    /// make the call a no-op.
    pub fn update_details(
        &mut self,
        name: Option<String>,
        website: Option<Option<String>>,
        description: Option<Option<String>>,
    ) -> Result<()> {
        let new_name = name.unwrap_or_else(|| self.name.clone());
        let new_website = website.unwrap_or_else(|| self.website.clone());
        let new_description = description.unwrap_or_else(|| self.description.clone());
        validate_fields(&new_name, new_website.as_deref(), new_description.as_deref())?;

        if new_name == self.name
            && new_website == self.website
            && new_description == self.description
        {
            return Ok(());
        }

        self.name = new_name;
        self.website = new_website;
        self.description = new_description;
        self.updated_at = Utc::now();
        self.record(DomainEvent::CompanyUpdated {
            company_id: self.id,
            name: self.name.clone(),
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Deactivate the company. Re-deactivating is a no-op.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.updated_at = Utc::now();
        self.record(DomainEvent::CompanyDeactivated {
            company_id: self.id,
            occurred_at: self.updated_at,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl AggregateRoot for Company {
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

fn validate_fields(name: &str, website: Option<&str>, description: Option<&str>) -> Result<()> {
    require_non_empty("name", name)?;
    require_max_len("name", name, MAX_COMPANY_NAME_LEN)?;
    if let Some(w) = website {
        require_max_len("website", w, MAX_WEBSITE_LEN)?;
    }
    if let Some(d) = description {
        require_max_len("description", d, MAX_DESCRIPTION_LEN)?;
    }
    Ok(())
}

/// Persistence port for companies.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn save_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()>;

    async fn update_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()>;

    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>>;
}
