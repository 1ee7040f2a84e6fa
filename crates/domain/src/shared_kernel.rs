//! Shared kernel: typed identifiers, domain errors and the aggregate
//! event-capture protocol used by every bounded context.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::events::DomainEvent;

/// Unique identifier for platform users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for candidate profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub Uuid);

impl SkillId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SkillId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for companies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a platform user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Candidate,
    Recruiter,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Candidate => "CANDIDATE",
            UserRole::Recruiter => "RECRUITER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CANDIDATE" => Some(UserRole::Candidate),
            "RECRUITER" => Some(UserRole::Recruiter),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Skill proficiency, ordered from weakest to strongest.
///
/// Variant order is meaningful: `Ord` gives the ordinal comparison used by
/// the minimum-proficiency search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "BEGINNER",
            Proficiency::Intermediate => "INTERMEDIATE",
            Proficiency::Advanced => "ADVANCED",
            Proficiency::Expert => "EXPERT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BEGINNER" => Some(Proficiency::Beginner),
            "INTERMEDIATE" => Some(Proficiency::Intermediate),
            "ADVANCED" => Some(Proficiency::Advanced),
            "EXPERT" => Some(Proficiency::Expert),
            _ => None,
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profile-level experience label, matched exactly by the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "JUNIOR",
            ExperienceLevel::Mid => "MID",
            ExperienceLevel::Senior => "SENIOR",
            ExperienceLevel::Lead => "LEAD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "JUNIOR" => Some(ExperienceLevel::Junior),
            "MID" => Some(ExperienceLevel::Mid),
            "SENIOR" => Some(ExperienceLevel::Senior),
            "LEAD" => Some(ExperienceLevel::Lead),
            _ => None,
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by aggregate factories and mutators.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Candidate profile not found: {profile_id}")]
    ProfileNotFound { profile_id: ProfileId },

    #[error("Skill not found: {skill_id}")]
    SkillNotFound { skill_id: SkillId },

    #[error("Company not found: {company_id}")]
    CompanyNotFound { company_id: CompanyId },

    #[error("Email already registered: {email}")]
    EmailAlreadyRegistered { email: String },

    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Profile {profile_id} already lists skill {skill_id}")]
    DuplicateSkill {
        profile_id: ProfileId,
        skill_id: SkillId,
    },

    #[error("Profile {profile_id} does not list skill {skill_id}")]
    SkillNotOnProfile {
        profile_id: ProfileId,
        skill_id: SkillId,
    },

    #[error("Persistence conflict: {message}")]
    Conflict { message: String },

    #[error("Infrastructure error: {message}")]
    InfrastructureError { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for persistence conflicts that are safe to retry from a fresh
    /// aggregate load. Domain validation failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Event-capture protocol shared by every aggregate.
///
/// A mutating operation that represents a business-meaningful fact records
/// exactly one event; a genuine no-op records none. The buffer is empty
/// right after reconstitution and right after `clear_events`, and non-empty
/// only between a mutation and the handler's commit step.
pub trait AggregateRoot {
    /// Append an event to the uncommitted buffer. Side effect only; the
    /// aggregate's fields are mutated by the operation that records it.
    fn record(&mut self, event: DomainEvent);

    /// Read-only snapshot of the buffered events.
    fn uncommitted_events(&self) -> &[DomainEvent];

    /// Empty the buffer. Called once per use case after the transactional
    /// write commits; calling it on an empty buffer is a harmless no-op.
    fn clear_events(&mut self);
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_max_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_ordering_is_ordinal() {
        assert!(Proficiency::Beginner < Proficiency::Intermediate);
        assert!(Proficiency::Intermediate < Proficiency::Advanced);
        assert!(Proficiency::Advanced < Proficiency::Expert);
    }

    #[test]
    fn enum_round_trips_through_str() {
        for level in [
            Proficiency::Beginner,
            Proficiency::Intermediate,
            Proficiency::Advanced,
            Proficiency::Expert,
        ] {
            assert_eq!(Proficiency::parse(level.as_str()), Some(level));
        }
        assert_eq!(Proficiency::parse("GURU"), None);
        assert_eq!(UserRole::parse(UserRole::Recruiter.as_str()), Some(UserRole::Recruiter));
        assert_eq!(
            ExperienceLevel::parse(ExperienceLevel::Lead.as_str()),
            Some(ExperienceLevel::Lead)
        );
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!DomainError::validation("email", "must not be empty").is_retryable());
        assert!(DomainError::Conflict {
            message: "serialization failure".to_string()
        }
        .is_retryable());
    }
}
