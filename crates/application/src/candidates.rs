//! Candidate profile use cases.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use talentgrid_domain::candidates::{CandidateProfile, CandidateProfileRepository};
use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{
    DomainError, ExperienceLevel, Proficiency, ProfileId, SkillId, UserId,
};
use talentgrid_domain::skills::SkillRepository;
use talentgrid_domain::AggregateRoot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: Uuid,
    pub headline: String,
    pub summary: Option<String>,
    pub experience_level: ExperienceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntryResponse {
    pub skill_id: String,
    pub proficiency: String,
    pub years_experience: u32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile_id: String,
    pub user_id: String,
    pub headline: String,
    pub summary: Option<String>,
    pub experience_level: String,
    pub skills: Vec<SkillEntryResponse>,
    pub active: bool,
}

impl ProfileResponse {
    fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            profile_id: profile.id.to_string(),
            user_id: profile.user_id().to_string(),
            headline: profile.headline().to_string(),
            summary: profile.summary().map(|s| s.to_string()),
            experience_level: profile.experience_level().to_string(),
            skills: profile
                .skills()
                .iter()
                .map(|s| SkillEntryResponse {
                    skill_id: s.skill_id.to_string(),
                    proficiency: s.proficiency.to_string(),
                    years_experience: s.years_experience,
                    note: s.note.clone(),
                })
                .collect(),
            active: profile.is_active(),
        }
    }
}

/// Create a candidate profile for an existing user.
pub struct CreateProfileUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
}

impl CreateProfileUseCase {
    pub fn new(profile_repository: Arc<dyn CandidateProfileRepository>) -> Self {
        Self { profile_repository }
    }

    pub async fn execute(&self, request: CreateProfileRequest) -> anyhow::Result<ProfileResponse> {
        let mut profile = CandidateProfile::create(
            UserId(request.user_id),
            request.headline,
            request.summary,
            request.experience_level,
        )?;

        let inserts = OutboxRecordInsert::from_events(profile.uncommitted_events())?;
        self.profile_repository
            .save_with_events(&profile, &inserts)
            .await?;
        profile.clear_events();

        tracing::info!(profile_id = %profile.id, "Candidate profile created");
        Ok(ProfileResponse::from_profile(&profile))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub profile_id: Uuid,
    pub headline: Option<String>,
    /// `Some(None)` clears the summary; `None` leaves it untouched.
    pub summary: Option<Option<String>>,
    pub experience_level: Option<ExperienceLevel>,
}

/// Update profile details; identical values make the call a no-op.
pub struct UpdateProfileUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
}

impl UpdateProfileUseCase {
    pub fn new(profile_repository: Arc<dyn CandidateProfileRepository>) -> Self {
        Self { profile_repository }
    }

    pub async fn execute(&self, request: UpdateProfileRequest) -> anyhow::Result<ProfileResponse> {
        let profile_id = ProfileId(request.profile_id);
        let mut profile = self
            .profile_repository
            .find_by_id(&profile_id)
            .await?
            .ok_or(DomainError::ProfileNotFound { profile_id })?;

        profile.update_details(request.headline, request.summary, request.experience_level)?;

        if !profile.uncommitted_events().is_empty() {
            let inserts = OutboxRecordInsert::from_events(profile.uncommitted_events())?;
            self.profile_repository
                .update_with_events(&profile, &inserts)
                .await?;
            profile.clear_events();
        }

        Ok(ProfileResponse::from_profile(&profile))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSkillRequest {
    pub profile_id: Uuid,
    pub skill_id: Uuid,
    pub proficiency: Proficiency,
    pub years_experience: u32,
    pub note: Option<String>,
}

/// Attach a catalog skill to a profile.
pub struct AddSkillUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
    skill_repository: Arc<dyn SkillRepository>,
}

impl AddSkillUseCase {
    pub fn new(
        profile_repository: Arc<dyn CandidateProfileRepository>,
        skill_repository: Arc<dyn SkillRepository>,
    ) -> Self {
        Self {
            profile_repository,
            skill_repository,
        }
    }

    pub async fn execute(&self, request: AddSkillRequest) -> anyhow::Result<ProfileResponse> {
        let skill_id = SkillId(request.skill_id);
        // The skill must exist in the catalog before it can be claimed.
        self.skill_repository
            .find_by_id(&skill_id)
            .await?
            .ok_or(DomainError::SkillNotFound { skill_id })?;

        let profile_id = ProfileId(request.profile_id);
        let mut profile = self
            .profile_repository
            .find_by_id(&profile_id)
            .await?
            .ok_or(DomainError::ProfileNotFound { profile_id })?;

        profile.add_skill(
            skill_id,
            request.proficiency,
            request.years_experience,
            request.note,
        )?;

        let inserts = OutboxRecordInsert::from_events(profile.uncommitted_events())?;
        self.profile_repository
            .update_with_events(&profile, &inserts)
            .await?;
        profile.clear_events();

        Ok(ProfileResponse::from_profile(&profile))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSkillRequest {
    pub profile_id: Uuid,
    pub skill_id: Uuid,
    pub proficiency: Proficiency,
    pub years_experience: u32,
    pub note: Option<String>,
}

/// Update a skill entry on a profile; identical values are a no-op.
pub struct UpdateSkillUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
}

impl UpdateSkillUseCase {
    pub fn new(profile_repository: Arc<dyn CandidateProfileRepository>) -> Self {
        Self { profile_repository }
    }

    pub async fn execute(&self, request: UpdateSkillRequest) -> anyhow::Result<ProfileResponse> {
        let profile_id = ProfileId(request.profile_id);
        let mut profile = self
            .profile_repository
            .find_by_id(&profile_id)
            .await?
            .ok_or(DomainError::ProfileNotFound { profile_id })?;

        profile.update_skill(
            SkillId(request.skill_id),
            request.proficiency,
            request.years_experience,
            request.note,
        )?;

        if !profile.uncommitted_events().is_empty() {
            let inserts = OutboxRecordInsert::from_events(profile.uncommitted_events())?;
            self.profile_repository
                .update_with_events(&profile, &inserts)
                .await?;
            profile.clear_events();
        }

        Ok(ProfileResponse::from_profile(&profile))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSkillRequest {
    pub profile_id: Uuid,
    pub skill_id: Uuid,
}

/// Detach a skill from a profile.
pub struct RemoveSkillUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
}

impl RemoveSkillUseCase {
    pub fn new(profile_repository: Arc<dyn CandidateProfileRepository>) -> Self {
        Self { profile_repository }
    }

    pub async fn execute(&self, request: RemoveSkillRequest) -> anyhow::Result<ProfileResponse> {
        let profile_id = ProfileId(request.profile_id);
        let mut profile = self
            .profile_repository
            .find_by_id(&profile_id)
            .await?
            .ok_or(DomainError::ProfileNotFound { profile_id })?;

        profile.remove_skill(SkillId(request.skill_id))?;

        let inserts = OutboxRecordInsert::from_events(profile.uncommitted_events())?;
        self.profile_repository
            .update_with_events(&profile, &inserts)
            .await?;
        profile.clear_events();

        Ok(ProfileResponse::from_profile(&profile))
    }
}

/// Read a profile by id.
pub struct GetProfileUseCase {
    profile_repository: Arc<dyn CandidateProfileRepository>,
}

impl GetProfileUseCase {
    pub fn new(profile_repository: Arc<dyn CandidateProfileRepository>) -> Self {
        Self { profile_repository }
    }

    pub async fn execute(&self, profile_id: Uuid) -> anyhow::Result<ProfileResponse> {
        let profile_id = ProfileId(profile_id);
        let profile = self
            .profile_repository
            .find_by_id(&profile_id)
            .await?
            .ok_or(DomainError::ProfileNotFound { profile_id })?;
        Ok(ProfileResponse::from_profile(&profile))
    }
}
