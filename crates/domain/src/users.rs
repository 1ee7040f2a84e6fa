//! User bounded context: account identity and lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::outbox::OutboxRecordInsert;
use crate::shared_kernel::{
    require_max_len, require_non_empty, AggregateRoot, DomainError, Result, UserId, UserRole,
};

const MAX_EMAIL_LEN: usize = 320;
const MAX_NAME_LEN: usize = 120;

/// A platform user. Mutated only through its own methods, which buffer one
/// domain event per business-meaningful change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    email: String,
    full_name: String,
    role: UserRole,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl User {
    /// Register a new user. Validates invariants and buffers
    /// `UserRegistered`.
    pub fn register(email: String, full_name: String, role: UserRole) -> Result<Self> {
        validate_email(&email)?;
        validate_name(&full_name)?;

        let now = Utc::now();
        let mut user = Self {
            id: UserId::new(),
            email,
            full_name,
            role,
            active: true,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        user.record(DomainEvent::UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            occurred_at: now,
        });
        Ok(user)
    }

    /// Rebuild a user from stored fields. The event buffer starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: UserId,
        email: String,
        full_name: String,
        role: UserRole,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            full_name,
            role,
            active,
            created_at,
            updated_at,
            events: Vec::new(),
        }
    }

    /// Update email and/or name. A call where every provided field equals
    /// the current value is a no-op: no event, `updated_at` untouched.
    pub fn update_profile(
        &mut self,
        email: Option<String>,
        full_name: Option<String>,
    ) -> Result<()> {
        let new_email = match email {
            Some(e) => {
                validate_email(&e)?;
                e
            }
            None => self.email.clone(),
        };
        let new_name = match full_name {
            Some(n) => {
                validate_name(&n)?;
                n
            }
            None => self.full_name.clone(),
        };

        if new_email == self.email && new_name == self.full_name {
            return Ok(());
        }

        self.email = new_email;
        self.full_name = new_name;
        self.updated_at = Utc::now();
        self.record(DomainEvent::UserProfileUpdated {
            user_id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            occurred_at: self.updated_at,
        });
        Ok(())
    }

    /// Deactivate the account. Re-deactivating is a no-op.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.updated_at = Utc::now();
        self.record(DomainEvent::UserDeactivated {
            user_id: self.id,
            occurred_at: self.updated_at,
        });
    }

    /// Reactivate the account. Reactivating an active account is a no-op.
    pub fn reactivate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.updated_at = Utc::now();
        self.record(DomainEvent::UserReactivated {
            user_id: self.id,
            occurred_at: self.updated_at,
        });
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn role(&self) -> UserRole {
        self.role
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

impl AggregateRoot for User {
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

fn validate_email(email: &str) -> Result<()> {
    require_non_empty("email", email)?;
    require_max_len("email", email, MAX_EMAIL_LEN)?;
    if !email.contains('@') {
        return Err(DomainError::validation("email", "must contain '@'"));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    require_non_empty("full_name", name)?;
    require_max_len("full_name", name, MAX_NAME_LEN)
}

/// Persistence port for users.
///
/// The save/update methods persist the aggregate state and the given outbox
/// rows in a single atomic transaction; on error nothing is visible to
/// other readers and the caller's event buffer is left intact.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_with_events(&self, user: &User, events: &[OutboxRecordInsert]) -> Result<()>;

    async fn update_with_events(&self, user: &User, events: &[OutboxRecordInsert]) -> Result<()>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> User {
        let mut user = User::register(
            "ada@example.com".to_string(),
            "Ada Lovelace".to_string(),
            UserRole::Candidate,
        )
        .unwrap();
        user.clear_events();
        user
    }

    #[test]
    fn register_buffers_exactly_one_event() {
        let user = User::register(
            "ada@example.com".to_string(),
            "Ada Lovelace".to_string(),
            UserRole::Candidate,
        )
        .unwrap();

        assert_eq!(user.uncommitted_events().len(), 1);
        match &user.uncommitted_events()[0] {
            DomainEvent::UserRegistered { email, role, .. } => {
                assert_eq!(email, "ada@example.com");
                assert_eq!(*role, UserRole::Candidate);
            }
            other => panic!("Expected UserRegistered, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_bad_email_without_event() {
        let result = User::register(
            "not-an-email".to_string(),
            "Ada".to_string(),
            UserRole::Candidate,
        );
        assert!(matches!(
            result,
            Err(DomainError::ValidationFailed { ref field, .. }) if field == "email"
        ));
    }

    #[test]
    fn register_rejects_overlong_name() {
        let result = User::register(
            "ada@example.com".to_string(),
            "x".repeat(MAX_NAME_LEN + 1),
            UserRole::Candidate,
        );
        assert!(result.is_err());
    }

    #[test]
    fn update_with_identical_values_is_a_noop() {
        let mut user = registered();
        let before = user.updated_at();

        user.update_profile(
            Some("ada@example.com".to_string()),
            Some("Ada Lovelace".to_string()),
        )
        .unwrap();

        assert!(user.uncommitted_events().is_empty());
        assert_eq!(user.updated_at(), before);
    }

    #[test]
    fn update_with_changed_name_buffers_one_event() {
        let mut user = registered();

        user.update_profile(None, Some("Ada King".to_string())).unwrap();

        assert_eq!(user.uncommitted_events().len(), 1);
        assert_eq!(user.full_name(), "Ada King");
    }

    #[test]
    fn deactivate_twice_buffers_one_event() {
        let mut user = registered();
        user.deactivate();
        user.deactivate();

        assert_eq!(user.uncommitted_events().len(), 1);
        assert!(!user.is_active());
    }

    #[test]
    fn clear_events_is_idempotent() {
        let mut user = registered();
        user.deactivate();

        user.clear_events();
        assert!(user.uncommitted_events().is_empty());
        user.clear_events();
        assert!(user.uncommitted_events().is_empty());
    }

    #[test]
    fn reconstitution_starts_with_an_empty_buffer() {
        let now = Utc::now();
        let user = User::from_parts(
            UserId::new(),
            "grace@example.com".to_string(),
            "Grace Hopper".to_string(),
            UserRole::Recruiter,
            true,
            now,
            now,
        );
        assert!(user.uncommitted_events().is_empty());
    }
}
