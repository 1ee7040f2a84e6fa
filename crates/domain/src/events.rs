//! Domain events: immutable facts describing state changes inside an
//! aggregate. Equality is by content, never by identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outbox::AggregateType;
use crate::shared_kernel::{
    CompanyId, ExperienceLevel, Proficiency, ProfileId, SkillId, UserId, UserRole,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    UserRegistered {
        user_id: UserId,
        email: String,
        full_name: String,
        role: UserRole,
        occurred_at: DateTime<Utc>,
    },
    UserProfileUpdated {
        user_id: UserId,
        email: String,
        full_name: String,
        occurred_at: DateTime<Utc>,
    },
    UserDeactivated {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    UserReactivated {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    CandidateProfileCreated {
        profile_id: ProfileId,
        user_id: UserId,
        headline: String,
        experience_level: ExperienceLevel,
        occurred_at: DateTime<Utc>,
    },
    CandidateProfileUpdated {
        profile_id: ProfileId,
        headline: String,
        experience_level: ExperienceLevel,
        occurred_at: DateTime<Utc>,
    },
    CandidateProfileDeactivated {
        profile_id: ProfileId,
        occurred_at: DateTime<Utc>,
    },
    CandidateSkillAdded {
        profile_id: ProfileId,
        skill_id: SkillId,
        proficiency: Proficiency,
        years_experience: u32,
        occurred_at: DateTime<Utc>,
    },
    CandidateSkillUpdated {
        profile_id: ProfileId,
        skill_id: SkillId,
        proficiency: Proficiency,
        years_experience: u32,
        occurred_at: DateTime<Utc>,
    },
    CandidateSkillRemoved {
        profile_id: ProfileId,
        skill_id: SkillId,
        occurred_at: DateTime<Utc>,
    },
    SkillCreated {
        skill_id: SkillId,
        name: String,
        category: Option<String>,
        occurred_at: DateTime<Utc>,
    },
    SkillRenamed {
        skill_id: SkillId,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    CompanyRegistered {
        company_id: CompanyId,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    CompanyUpdated {
        company_id: CompanyId,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    CompanyDeactivated {
        company_id: CompanyId,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Wire tag for the event, used as the outbox `event_type` column and
    /// the last segment of the published subject.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::UserRegistered { .. } => "UserRegistered",
            DomainEvent::UserProfileUpdated { .. } => "UserProfileUpdated",
            DomainEvent::UserDeactivated { .. } => "UserDeactivated",
            DomainEvent::UserReactivated { .. } => "UserReactivated",
            DomainEvent::CandidateProfileCreated { .. } => "CandidateProfileCreated",
            DomainEvent::CandidateProfileUpdated { .. } => "CandidateProfileUpdated",
            DomainEvent::CandidateProfileDeactivated { .. } => "CandidateProfileDeactivated",
            DomainEvent::CandidateSkillAdded { .. } => "CandidateSkillAdded",
            DomainEvent::CandidateSkillUpdated { .. } => "CandidateSkillUpdated",
            DomainEvent::CandidateSkillRemoved { .. } => "CandidateSkillRemoved",
            DomainEvent::SkillCreated { .. } => "SkillCreated",
            DomainEvent::SkillRenamed { .. } => "SkillRenamed",
            DomainEvent::CompanyRegistered { .. } => "CompanyRegistered",
            DomainEvent::CompanyUpdated { .. } => "CompanyUpdated",
            DomainEvent::CompanyDeactivated { .. } => "CompanyDeactivated",
        }
    }

    /// Identifier of the aggregate instance the event concerns.
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            DomainEvent::UserRegistered { user_id, .. }
            | DomainEvent::UserProfileUpdated { user_id, .. }
            | DomainEvent::UserDeactivated { user_id, .. }
            | DomainEvent::UserReactivated { user_id, .. } => user_id.0,
            DomainEvent::CandidateProfileCreated { profile_id, .. }
            | DomainEvent::CandidateProfileUpdated { profile_id, .. }
            | DomainEvent::CandidateProfileDeactivated { profile_id, .. }
            | DomainEvent::CandidateSkillAdded { profile_id, .. }
            | DomainEvent::CandidateSkillUpdated { profile_id, .. }
            | DomainEvent::CandidateSkillRemoved { profile_id, .. } => profile_id.0,
            DomainEvent::SkillCreated { skill_id, .. }
            | DomainEvent::SkillRenamed { skill_id, .. } => skill_id.0,
            DomainEvent::CompanyRegistered { company_id, .. }
            | DomainEvent::CompanyUpdated { company_id, .. }
            | DomainEvent::CompanyDeactivated { company_id, .. } => company_id.0,
        }
    }

    pub fn aggregate_kind(&self) -> AggregateType {
        match self {
            DomainEvent::UserRegistered { .. }
            | DomainEvent::UserProfileUpdated { .. }
            | DomainEvent::UserDeactivated { .. }
            | DomainEvent::UserReactivated { .. } => AggregateType::User,
            DomainEvent::CandidateProfileCreated { .. }
            | DomainEvent::CandidateProfileUpdated { .. }
            | DomainEvent::CandidateProfileDeactivated { .. }
            | DomainEvent::CandidateSkillAdded { .. }
            | DomainEvent::CandidateSkillUpdated { .. }
            | DomainEvent::CandidateSkillRemoved { .. } => AggregateType::Candidate,
            DomainEvent::SkillCreated { .. } | DomainEvent::SkillRenamed { .. } => {
                AggregateType::Skill
            }
            DomainEvent::CompanyRegistered { .. }
            | DomainEvent::CompanyUpdated { .. }
            | DomainEvent::CompanyDeactivated { .. } => AggregateType::Company,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::UserRegistered { occurred_at, .. }
            | DomainEvent::UserProfileUpdated { occurred_at, .. }
            | DomainEvent::UserDeactivated { occurred_at, .. }
            | DomainEvent::UserReactivated { occurred_at, .. }
            | DomainEvent::CandidateProfileCreated { occurred_at, .. }
            | DomainEvent::CandidateProfileUpdated { occurred_at, .. }
            | DomainEvent::CandidateProfileDeactivated { occurred_at, .. }
            | DomainEvent::CandidateSkillAdded { occurred_at, .. }
            | DomainEvent::CandidateSkillUpdated { occurred_at, .. }
            | DomainEvent::CandidateSkillRemoved { occurred_at, .. }
            | DomainEvent::SkillCreated { occurred_at, .. }
            | DomainEvent::SkillRenamed { occurred_at, .. }
            | DomainEvent::CompanyRegistered { occurred_at, .. }
            | DomainEvent::CompanyUpdated { occurred_at, .. }
            | DomainEvent::CompanyDeactivated { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_content() {
        let user_id = UserId::new();
        let at = Utc::now();
        let a = DomainEvent::UserDeactivated {
            user_id,
            occurred_at: at,
        };
        let b = DomainEvent::UserDeactivated {
            user_id,
            occurred_at: at,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn accessors_agree_with_variant() {
        let skill_id = SkillId::new();
        let event = DomainEvent::SkillCreated {
            skill_id,
            name: "Rust".to_string(),
            category: Some("Languages".to_string()),
            occurred_at: Utc::now(),
        };
        assert_eq!(event.event_type(), "SkillCreated");
        assert_eq!(event.aggregate_id(), skill_id.0);
        assert_eq!(event.aggregate_kind(), AggregateType::Skill);
    }
}
