//! User account use cases.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{DomainError, UserId, UserRole};
use talentgrid_domain::users::{User, UserRepository};
use talentgrid_domain::AggregateRoot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub active: bool,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().to_string(),
            role: user.role().to_string(),
            active: user.is_active(),
        }
    }
}

/// Register a new user account.
pub struct RegisterUserUseCase {
    user_repository: Arc<dyn UserRepository>,
}

impl RegisterUserUseCase {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn execute(&self, request: RegisterUserRequest) -> anyhow::Result<UserResponse> {
        if let Some(existing) = self.user_repository.find_by_email(&request.email).await? {
            return Err(DomainError::EmailAlreadyRegistered {
                email: existing.email().to_string(),
            }
            .into());
        }

        let mut user = User::register(request.email, request.full_name, request.role)?;

        let inserts = OutboxRecordInsert::from_events(user.uncommitted_events())?;
        self.user_repository
            .save_with_events(&user, &inserts)
            .await?;
        user.clear_events();

        tracing::info!(user_id = %user.id, "User registered");
        Ok(UserResponse::from_user(&user))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Update a user's email and/or name. Updates where every provided field is
/// unchanged persist nothing and emit nothing.
pub struct UpdateUserUseCase {
    user_repository: Arc<dyn UserRepository>,
}

impl UpdateUserUseCase {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn execute(&self, request: UpdateUserRequest) -> anyhow::Result<UserResponse> {
        let user_id = UserId(request.user_id);
        let mut user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(DomainError::UserNotFound { user_id })?;

        user.update_profile(request.email, request.full_name)?;

        if user.uncommitted_events().is_empty() {
            return Ok(UserResponse::from_user(&user));
        }

        let inserts = OutboxRecordInsert::from_events(user.uncommitted_events())?;
        self.user_repository
            .update_with_events(&user, &inserts)
            .await?;
        user.clear_events();

        Ok(UserResponse::from_user(&user))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateUserRequest {
    pub user_id: Uuid,
}

/// Deactivate a user account. Re-deactivating an inactive account is a
/// no-op that persists nothing.
pub struct DeactivateUserUseCase {
    user_repository: Arc<dyn UserRepository>,
}

impl DeactivateUserUseCase {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn execute(&self, request: DeactivateUserRequest) -> anyhow::Result<UserResponse> {
        let user_id = UserId(request.user_id);
        let mut user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(DomainError::UserNotFound { user_id })?;

        user.deactivate();

        if user.uncommitted_events().is_empty() {
            return Ok(UserResponse::from_user(&user));
        }

        let inserts = OutboxRecordInsert::from_events(user.uncommitted_events())?;
        self.user_repository
            .update_with_events(&user, &inserts)
            .await?;
        user.clear_events();

        tracing::info!(user_id = %user.id, "User deactivated");
        Ok(UserResponse::from_user(&user))
    }
}

/// Read a user by id.
pub struct GetUserUseCase {
    user_repository: Arc<dyn UserRepository>,
}

impl GetUserUseCase {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<UserResponse> {
        let user_id = UserId(user_id);
        let user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(DomainError::UserNotFound { user_id })?;
        Ok(UserResponse::from_user(&user))
    }
}
