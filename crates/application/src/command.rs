//! Command dispatch.
//!
//! One variant per mutating use case, routed through an exhaustive match in
//! a dispatcher built once at startup. No runtime registry: adding a
//! command without a handler arm fails to compile.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::candidates::{
    AddSkillRequest, AddSkillUseCase, CreateProfileRequest, CreateProfileUseCase, ProfileResponse,
    RemoveSkillRequest, RemoveSkillUseCase, UpdateProfileRequest, UpdateProfileUseCase,
    UpdateSkillRequest, UpdateSkillUseCase,
};
use crate::companies::{
    CompanyResponse, DeactivateCompanyRequest, DeactivateCompanyUseCase, RegisterCompanyRequest,
    RegisterCompanyUseCase, UpdateCompanyRequest, UpdateCompanyUseCase,
};
use crate::skills::{CreateSkillRequest, CreateSkillUseCase, RenameSkillRequest, RenameSkillUseCase, SkillResponse};
use crate::users::{
    DeactivateUserRequest, DeactivateUserUseCase, RegisterUserRequest, RegisterUserUseCase,
    UpdateUserRequest, UpdateUserUseCase, UserResponse,
};

/// Every state-changing command the platform accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    RegisterUser(RegisterUserRequest),
    UpdateUser(UpdateUserRequest),
    DeactivateUser(DeactivateUserRequest),
    CreateProfile(CreateProfileRequest),
    UpdateProfile(UpdateProfileRequest),
    AddSkill(AddSkillRequest),
    UpdateSkill(UpdateSkillRequest),
    RemoveSkill(RemoveSkillRequest),
    CreateSkill(CreateSkillRequest),
    RenameSkill(RenameSkillRequest),
    RegisterCompany(RegisterCompanyRequest),
    UpdateCompany(UpdateCompanyRequest),
    DeactivateCompany(DeactivateCompanyRequest),
}

impl Command {
    /// Wire tag identifying the command kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Command::RegisterUser(_) => "RegisterUser",
            Command::UpdateUser(_) => "UpdateUser",
            Command::DeactivateUser(_) => "DeactivateUser",
            Command::CreateProfile(_) => "CreateProfile",
            Command::UpdateProfile(_) => "UpdateProfile",
            Command::AddSkill(_) => "AddSkill",
            Command::UpdateSkill(_) => "UpdateSkill",
            Command::RemoveSkill(_) => "RemoveSkill",
            Command::CreateSkill(_) => "CreateSkill",
            Command::RenameSkill(_) => "RenameSkill",
            Command::RegisterCompany(_) => "RegisterCompany",
            Command::UpdateCompany(_) => "UpdateCompany",
            Command::DeactivateCompany(_) => "DeactivateCompany",
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandOutcome {
    User(UserResponse),
    Profile(ProfileResponse),
    Skill(SkillResponse),
    Company(CompanyResponse),
}

/// Statically wired dispatch table. Constructed once at startup from the
/// use cases and their repositories.
pub struct CommandDispatcher {
    register_user: RegisterUserUseCase,
    update_user: UpdateUserUseCase,
    deactivate_user: DeactivateUserUseCase,
    create_profile: CreateProfileUseCase,
    update_profile: UpdateProfileUseCase,
    add_skill: AddSkillUseCase,
    update_skill: UpdateSkillUseCase,
    remove_skill: RemoveSkillUseCase,
    create_skill: CreateSkillUseCase,
    rename_skill: RenameSkillUseCase,
    register_company: RegisterCompanyUseCase,
    update_company: UpdateCompanyUseCase,
    deactivate_company: DeactivateCompanyUseCase,
}

impl CommandDispatcher {
    pub fn new(
        users: Arc<dyn talentgrid_domain::users::UserRepository>,
        profiles: Arc<dyn talentgrid_domain::candidates::CandidateProfileRepository>,
        skills: Arc<dyn talentgrid_domain::skills::SkillRepository>,
        companies: Arc<dyn talentgrid_domain::companies::CompanyRepository>,
    ) -> Self {
        Self {
            register_user: RegisterUserUseCase::new(users.clone()),
            update_user: UpdateUserUseCase::new(users.clone()),
            deactivate_user: DeactivateUserUseCase::new(users),
            create_profile: CreateProfileUseCase::new(profiles.clone()),
            update_profile: UpdateProfileUseCase::new(profiles.clone()),
            add_skill: AddSkillUseCase::new(profiles.clone(), skills.clone()),
            update_skill: UpdateSkillUseCase::new(profiles.clone()),
            remove_skill: RemoveSkillUseCase::new(profiles),
            create_skill: CreateSkillUseCase::new(skills.clone()),
            rename_skill: RenameSkillUseCase::new(skills),
            register_company: RegisterCompanyUseCase::new(companies.clone()),
            update_company: UpdateCompanyUseCase::new(companies.clone()),
            deactivate_company: DeactivateCompanyUseCase::new(companies),
        }
    }

    pub async fn dispatch(&self, command: Command) -> anyhow::Result<CommandOutcome> {
        let tag = command.tag();
        tracing::debug!(command = tag, "Dispatching command");

        match command {
            Command::RegisterUser(req) => {
                Ok(CommandOutcome::User(self.register_user.execute(req).await?))
            }
            Command::UpdateUser(req) => {
                Ok(CommandOutcome::User(self.update_user.execute(req).await?))
            }
            Command::DeactivateUser(req) => Ok(CommandOutcome::User(
                self.deactivate_user.execute(req).await?,
            )),
            Command::CreateProfile(req) => Ok(CommandOutcome::Profile(
                self.create_profile.execute(req).await?,
            )),
            Command::UpdateProfile(req) => Ok(CommandOutcome::Profile(
                self.update_profile.execute(req).await?,
            )),
            Command::AddSkill(req) => {
                Ok(CommandOutcome::Profile(self.add_skill.execute(req).await?))
            }
            Command::UpdateSkill(req) => Ok(CommandOutcome::Profile(
                self.update_skill.execute(req).await?,
            )),
            Command::RemoveSkill(req) => Ok(CommandOutcome::Profile(
                self.remove_skill.execute(req).await?,
            )),
            Command::CreateSkill(req) => {
                Ok(CommandOutcome::Skill(self.create_skill.execute(req).await?))
            }
            Command::RenameSkill(req) => {
                Ok(CommandOutcome::Skill(self.rename_skill.execute(req).await?))
            }
            Command::RegisterCompany(req) => Ok(CommandOutcome::Company(
                self.register_company.execute(req).await?,
            )),
            Command::UpdateCompany(req) => Ok(CommandOutcome::Company(
                self.update_company.execute(req).await?,
            )),
            Command::DeactivateCompany(req) => Ok(CommandOutcome::Company(
                self.deactivate_company.execute(req).await?,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        InMemoryCompanyRepository, InMemoryProfileRepository, InMemorySkillRepository,
        InMemoryUserRepository,
    };
    use talentgrid_domain::shared_kernel::UserRole;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(InMemorySkillRepository::new()),
            Arc::new(InMemoryCompanyRepository::new()),
        )
    }

    #[tokio::test]
    async fn dispatch_routes_to_the_matching_use_case() {
        let dispatcher = dispatcher();

        let outcome = dispatcher
            .dispatch(Command::RegisterUser(RegisterUserRequest {
                email: "ada@example.com".to_string(),
                full_name: "Ada Lovelace".to_string(),
                role: UserRole::Candidate,
            }))
            .await
            .unwrap();

        match outcome {
            CommandOutcome::User(user) => assert_eq!(user.email, "ada@example.com"),
            other => panic!("Expected a user outcome, got {other:?}"),
        }
    }

    #[test]
    fn tags_are_stable() {
        let cmd = Command::CreateSkill(CreateSkillRequest {
            name: "Rust".to_string(),
            category: None,
        });
        assert_eq!(cmd.tag(), "CreateSkill");
    }
}
