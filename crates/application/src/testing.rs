//! In-memory repository doubles shared by the use-case tests.

use async_trait::async_trait;
use std::sync::Mutex;

use talentgrid_domain::candidates::{CandidateProfile, CandidateProfileRepository};
use talentgrid_domain::companies::{Company, CompanyRepository};
use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{
    CompanyId, DomainError, ProfileId, Result, SkillId, UserId,
};
use talentgrid_domain::skills::{Skill, SkillRepository};
use talentgrid_domain::users::{User, UserRepository};

pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    outbox: Mutex<Vec<OutboxRecordInsert>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn outbox_rows(&self) -> Vec<OutboxRecordInsert> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save_with_events(&self, user: &User, events: &[OutboxRecordInsert]) -> Result<()> {
        self.users.lock().unwrap().push(user.clone());
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn update_with_events(&self, user: &User, events: &[OutboxRecordInsert]) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(DomainError::UserNotFound { user_id: user.id })?;
        *slot = user.clone();
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == *id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }
}

/// Repository whose writes always fail; used to verify that a failed
/// transactional write surfaces the error to the caller.
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn save_with_events(&self, _user: &User, _events: &[OutboxRecordInsert]) -> Result<()> {
        Err(DomainError::Conflict {
            message: "simulated serialization failure".to_string(),
        })
    }

    async fn update_with_events(&self, _user: &User, _events: &[OutboxRecordInsert]) -> Result<()> {
        Err(DomainError::Conflict {
            message: "simulated serialization failure".to_string(),
        })
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Ok(None)
    }
}

pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<CandidateProfile>>,
    outbox: Mutex<Vec<OutboxRecordInsert>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn outbox_rows(&self) -> Vec<OutboxRecordInsert> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandidateProfileRepository for InMemoryProfileRepository {
    async fn save_with_events(
        &self,
        profile: &CandidateProfile,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        self.profiles.lock().unwrap().push(profile.clone());
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn update_with_events(
        &self,
        profile: &CandidateProfile,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let slot = profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or(DomainError::ProfileNotFound {
                profile_id: profile.id,
            })?;
        *slot = profile.clone();
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<CandidateProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == *id)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<CandidateProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id() == *user_id)
            .cloned())
    }
}

pub struct InMemorySkillRepository {
    skills: Mutex<Vec<Skill>>,
    outbox: Mutex<Vec<OutboxRecordInsert>>,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self {
            skills: Mutex::new(Vec::new()),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, skill: Skill) {
        self.skills.lock().unwrap().push(skill);
    }

    pub fn outbox_rows(&self) -> Vec<OutboxRecordInsert> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl SkillRepository for InMemorySkillRepository {
    async fn save_with_events(&self, skill: &Skill, events: &[OutboxRecordInsert]) -> Result<()> {
        self.skills.lock().unwrap().push(skill.clone());
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn update_with_events(
        &self,
        skill: &Skill,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        let mut skills = self.skills.lock().unwrap();
        let slot = skills
            .iter_mut()
            .find(|s| s.id == skill.id)
            .ok_or(DomainError::SkillNotFound { skill_id: skill.id })?;
        *slot = skill.clone();
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>> {
        Ok(self
            .skills
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Skill>> {
        Ok(self
            .skills
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name() == name)
            .cloned())
    }

    async fn find_all(&self, limit: usize, offset: usize) -> Result<(Vec<Skill>, usize)> {
        let mut skills = self.skills.lock().unwrap().clone();
        skills.sort_by(|a, b| a.name().cmp(b.name()));
        let total = skills.len();
        let page = skills.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

pub struct InMemoryCompanyRepository {
    companies: Mutex<Vec<Company>>,
    outbox: Mutex<Vec<OutboxRecordInsert>>,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self {
            companies: Mutex::new(Vec::new()),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn outbox_rows(&self) -> Vec<OutboxRecordInsert> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn save_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        self.companies.lock().unwrap().push(company.clone());
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn update_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        let mut companies = self.companies.lock().unwrap();
        let slot = companies
            .iter_mut()
            .find(|c| c.id == company.id)
            .ok_or(DomainError::CompanyNotFound {
                company_id: company.id,
            })?;
        *slot = company.clone();
        self.outbox.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *id)
            .cloned())
    }
}
