//! Candidate bounded context: profiles and the skills attached to them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::outbox::OutboxRecordInsert;
use crate::shared_kernel::{
    require_max_len, require_non_empty, AggregateRoot, DomainError, ExperienceLevel, Proficiency,
    ProfileId, Result, SkillId, UserId,
};

const MAX_HEADLINE_LEN: usize = 160;
const MAX_SUMMARY_LEN: usize = 4000;
const MAX_NOTE_LEN: usize = 500;
const MAX_YEARS_EXPERIENCE: u32 = 80;

/// One skill on a candidate profile. At most one entry exists per
/// (profile, skill) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub skill_id: SkillId,
    pub proficiency: Proficiency,
    pub years_experience: u32,
    pub note: Option<String>,
}

/// A candidate's profile: headline, experience label and skill list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: ProfileId,
    user_id: UserId,
    headline: String,
    summary: Option<String>,
    experience_level: ExperienceLevel,
    skills: Vec<CandidateSkill>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl CandidateProfile {
    pub fn create(
        user_id: UserId,
        headline: String,
        summary: Option<String>,
        experience_level: ExperienceLevel,
    ) -> Result<Self> {
        validate_headline(&headline)?;
        if let Some(ref s) = summary {
            require_max_len("summary", s, MAX_SUMMARY_LEN)?;
        }

        let now = Utc::now();
        let mut profile = Self {
            id: ProfileId::new(),
            user_id,
            headline,
            summary,
            experience_level,
            skills: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        profile.record(DomainEvent::CandidateProfileCreated {
            profile_id: profile.id,
            user_id,
            headline: profile.headline.clone(),
            experience_level,
            occurred_at: now,
        });
        Ok(profile)
    }

    /// Rebuild a profile from stored fields. The event buffer starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ProfileId,
        user_id: UserId,
        headline: String,
        summary: Option<String>,
        experience_level: ExperienceLevel,
        skills: Vec<CandidateSkill>,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            headline,
            summary,
            experience_level,
            skills,
            active,
            created_at,
            updated_at,
            events: Vec::new(),
        }
    }

    /// Update headline, summary and/or experience label. Identical values
    /// across every provided field make the call a no-op.
    pub fn update_details(
        &mut self,
        headline: Option<String>,
        summary: Option<Option<String>>,
        experience_level: Option<ExperienceLevel>,
    ) -> Result<()> {
        let new_headline = match headline {
            Some(h) => {
                validate_headline(&h)?;
                h
            }
            None => self.headline.clone(),
        };
        let new_summary = match summary {
            Some(s) => {
                if let Some(ref text) = s {
                    require_max_len("summary", text, MAX_SUMMARY_LEN)?;
                }
                s
            }
            None => self.summary.clone(),
        };
        let new_level = experience_level.unwrap_or(self.experience_level);

        if new_headline == self.headline
            && new_summary == self.summary
            && new_level == self.experience_level
        {
            return Ok(());
        }

        self.headline = new_headline;
        self.summary = new_summary;
        self.experience_level = new_level;
        self.updated_at = Utc::now();
        self.record(DomainEvent::CandidateProfileUpdated {
            profile_id: self.id,
            headline: self.headline.clone(),
            experience_level: self.experience_level,
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Attach a skill. A second entry for the same skill is rejected.
    pub fn add_skill(
        &mut self,
        skill_id: SkillId,
        proficiency: Proficiency,
        years_experience: u32,
        note: Option<String>,
    ) -> Result<()> {
        if self.skills.iter().any(|s| s.skill_id == skill_id) {
            return Err(DomainError::DuplicateSkill {
                profile_id: self.id,
                skill_id,
            });
        }
        validate_years(years_experience)?;
        if let Some(ref n) = note {
            require_max_len("note", n, MAX_NOTE_LEN)?;
        }

        self.skills.push(CandidateSkill {
            skill_id,
            proficiency,
            years_experience,
            note,
        });
        self.updated_at = Utc::now();
        self.record(DomainEvent::CandidateSkillAdded {
            profile_id: self.id,
            skill_id,
            proficiency,
            years_experience,
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Update an existing skill entry. Identical values make the call a
    /// no-op; an unknown skill is an error.
    pub fn update_skill(
        &mut self,
        skill_id: SkillId,
        proficiency: Proficiency,
        years_experience: u32,
        note: Option<String>,
    ) -> Result<()> {
        validate_years(years_experience)?;
        if let Some(ref n) = note {
            require_max_len("note", n, MAX_NOTE_LEN)?;
        }

        let profile_id = self.id;
        let entry = self
            .skills
            .iter_mut()
            .find(|s| s.skill_id == skill_id)
            .ok_or(DomainError::SkillNotOnProfile {
                profile_id,
                skill_id,
            })?;

        if entry.proficiency == proficiency
            && entry.years_experience == years_experience
            && entry.note == note
        {
            return Ok(());
        }

        entry.proficiency = proficiency;
        entry.years_experience = years_experience;
        entry.note = note;
        self.updated_at = Utc::now();
        self.record(DomainEvent::CandidateSkillUpdated {
            profile_id: self.id,
            skill_id,
            proficiency,
            years_experience,
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Detach a skill. Removing a skill that is not listed is an error.
    pub fn remove_skill(&mut self, skill_id: SkillId) -> Result<()> {
        let before = self.skills.len();
        self.skills.retain(|s| s.skill_id != skill_id);
        if self.skills.len() == before {
            return Err(DomainError::SkillNotOnProfile {
                profile_id: self.id,
                skill_id,
            });
        }

        self.updated_at = Utc::now();
        self.record(DomainEvent::CandidateSkillRemoved {
            profile_id: self.id,
            skill_id,
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Deactivate the profile, hiding it from search. Re-deactivating is a
    /// no-op.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.updated_at = Utc::now();
        self.record(DomainEvent::CandidateProfileDeactivated {
            profile_id: self.id,
            occurred_at: self.updated_at,
        });
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        self.experience_level
    }

    /// Read-only view of the skill list. Callers cannot mutate the
    /// aggregate's state through it.
    pub fn skills(&self) -> &[CandidateSkill] {
        &self.skills
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

impl AggregateRoot for CandidateProfile {
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

fn validate_headline(headline: &str) -> Result<()> {
    require_non_empty("headline", headline)?;
    require_max_len("headline", headline, MAX_HEADLINE_LEN)
}

fn validate_years(years: u32) -> Result<()> {
    if years > MAX_YEARS_EXPERIENCE {
        return Err(DomainError::validation(
            "years_experience",
            format!("must be at most {MAX_YEARS_EXPERIENCE}"),
        ));
    }
    Ok(())
}

/// Persistence port for candidate profiles, including the candidate_skills
/// rows. Save/update are atomic with the given outbox rows.
#[async_trait]
pub trait CandidateProfileRepository: Send + Sync {
    async fn save_with_events(
        &self,
        profile: &CandidateProfile,
        events: &[OutboxRecordInsert],
    ) -> Result<()>;

    async fn update_with_events(
        &self,
        profile: &CandidateProfile,
        events: &[OutboxRecordInsert],
    ) -> Result<()>;

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<CandidateProfile>>;

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<CandidateProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CandidateProfile {
        let mut profile = CandidateProfile::create(
            UserId::new(),
            "Backend engineer".to_string(),
            None,
            ExperienceLevel::Senior,
        )
        .unwrap();
        profile.clear_events();
        profile
    }

    #[test]
    fn create_buffers_exactly_one_event() {
        let profile = CandidateProfile::create(
            UserId::new(),
            "Backend engineer".to_string(),
            Some("Ten years of distributed systems.".to_string()),
            ExperienceLevel::Senior,
        )
        .unwrap();

        assert_eq!(profile.uncommitted_events().len(), 1);
        assert!(matches!(
            profile.uncommitted_events()[0],
            DomainEvent::CandidateProfileCreated { .. }
        ));
    }

    #[test]
    fn add_skill_buffers_one_event_per_skill() {
        let mut profile = profile();
        profile
            .add_skill(SkillId::new(), Proficiency::Advanced, 5, None)
            .unwrap();
        profile
            .add_skill(SkillId::new(), Proficiency::Beginner, 1, None)
            .unwrap();

        assert_eq!(profile.uncommitted_events().len(), 2);
        assert_eq!(profile.skills().len(), 2);
    }

    #[test]
    fn duplicate_skill_is_rejected_without_event() {
        let mut profile = profile();
        let skill_id = SkillId::new();
        profile
            .add_skill(skill_id, Proficiency::Advanced, 5, None)
            .unwrap();

        let result = profile.add_skill(skill_id, Proficiency::Expert, 7, None);

        assert!(matches!(result, Err(DomainError::DuplicateSkill { .. })));
        assert_eq!(profile.uncommitted_events().len(), 1);
        assert_eq!(profile.skills().len(), 1);
    }

    #[test]
    fn update_skill_with_identical_values_is_a_noop() {
        let mut profile = profile();
        let skill_id = SkillId::new();
        profile
            .add_skill(skill_id, Proficiency::Advanced, 5, Some("prod".to_string()))
            .unwrap();
        profile.clear_events();
        let before = profile.updated_at();

        profile
            .update_skill(skill_id, Proficiency::Advanced, 5, Some("prod".to_string()))
            .unwrap();

        assert!(profile.uncommitted_events().is_empty());
        assert_eq!(profile.updated_at(), before);
    }

    #[test]
    fn update_unknown_skill_is_an_error() {
        let mut profile = profile();
        let result = profile.update_skill(SkillId::new(), Proficiency::Expert, 3, None);
        assert!(matches!(result, Err(DomainError::SkillNotOnProfile { .. })));
        assert!(profile.uncommitted_events().is_empty());
    }

    #[test]
    fn remove_skill_buffers_one_event() {
        let mut profile = profile();
        let skill_id = SkillId::new();
        profile
            .add_skill(skill_id, Proficiency::Intermediate, 2, None)
            .unwrap();
        profile.clear_events();

        profile.remove_skill(skill_id).unwrap();

        assert_eq!(profile.uncommitted_events().len(), 1);
        assert!(profile.skills().is_empty());
    }

    #[test]
    fn deactivate_twice_buffers_one_event() {
        let mut profile = profile();
        profile.deactivate();
        profile.deactivate();
        assert_eq!(profile.uncommitted_events().len(), 1);
    }

    #[test]
    fn excessive_years_are_rejected() {
        let mut profile = profile();
        let result = profile.add_skill(SkillId::new(), Proficiency::Expert, 81, None);
        assert!(result.is_err());
        assert!(profile.uncommitted_events().is_empty());
    }
}
