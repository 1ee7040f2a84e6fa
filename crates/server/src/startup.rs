//! Application wiring: repositories, use cases, publisher and relay,
//! constructed once from configuration and handed to the runtime (and to
//! whatever transport surface embeds this crate).

use std::sync::Arc;

use talentgrid_application::command::CommandDispatcher;
use talentgrid_application::search::SearchCandidatesUseCase;
use talentgrid_domain::outbox::OutboxRepository;
use talentgrid_infrastructure::messaging::nats::NatsEventPublisher;
use talentgrid_infrastructure::messaging::outbox_relay::OutboxRelay;
use talentgrid_infrastructure::persistence::postgres::{
    connect_pool, run_migrations, PostgresCandidateProfileRepository,
    PostgresCandidateSkillReads, PostgresCompanyRepository, PostgresOutboxRepository,
    PostgresSkillRepository, PostgresUserRepository,
};

use crate::config::ServerConfig;

pub struct Application {
    pub dispatcher: CommandDispatcher,
    pub search: SearchCandidatesUseCase,
    pub relay: Arc<OutboxRelay>,
    pub outbox: Arc<dyn OutboxRepository>,
}

impl Application {
    pub async fn build(config: &ServerConfig) -> anyhow::Result<Self> {
        let pool = connect_pool(&config.database).await?;
        run_migrations(&pool).await?;

        let users = Arc::new(PostgresUserRepository::new(pool.clone()));
        let profiles = Arc::new(PostgresCandidateProfileRepository::new(pool.clone()));
        let skills = Arc::new(PostgresSkillRepository::new(pool.clone()));
        let companies = Arc::new(PostgresCompanyRepository::new(pool.clone()));
        let skill_reads = Arc::new(PostgresCandidateSkillReads::new(pool.clone()));
        let outbox: Arc<dyn OutboxRepository> =
            Arc::new(PostgresOutboxRepository::new(pool.clone()));

        let publisher = Arc::new(NatsEventPublisher::connect(&config.nats).await?);

        let dispatcher = CommandDispatcher::new(users, profiles, skills, companies);
        let search = SearchCandidatesUseCase::new(skill_reads);
        let relay = Arc::new(OutboxRelay::new(
            outbox.clone(),
            publisher,
            config.relay.to_relay_config(),
        ));

        tracing::info!("Application wired");
        Ok(Self {
            dispatcher,
            search,
            relay,
            outbox,
        })
    }
}
