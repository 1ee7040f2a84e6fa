//! SQLx-based PostgreSQL repositories.

mod candidate_repository;
mod company_repository;
mod migrations;
mod outbox;
mod pool;
mod skill_repository;
mod user_repository;

pub use candidate_repository::{PostgresCandidateProfileRepository, PostgresCandidateSkillReads};
pub use company_repository::PostgresCompanyRepository;
pub use migrations::run_migrations;
pub use outbox::PostgresOutboxRepository;
pub use pool::{connect_pool, PoolConfig};
pub use skill_repository::PostgresSkillRepository;
pub use user_repository::PostgresUserRepository;
