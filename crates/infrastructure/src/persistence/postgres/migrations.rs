//! Schema setup, run at startup. Plain `CREATE TABLE IF NOT EXISTS` via
//! runtime queries so no offline preparation is needed.

use sqlx::postgres::PgPool;

use crate::persistence::map_sqlx_err;
use talentgrid_domain::shared_kernel::DomainError;

pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            role VARCHAR(20) NOT NULL CHECK (role IN ('CANDIDATE', 'RECRUITER', 'ADMIN')),
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS candidate_profiles (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id),
            headline TEXT NOT NULL,
            summary TEXT,
            experience_level VARCHAR(10) NOT NULL
                CHECK (experience_level IN ('JUNIOR', 'MID', 'SENIOR', 'LEAD')),
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS candidate_skills (
            profile_id UUID NOT NULL REFERENCES candidate_profiles(id) ON DELETE CASCADE,
            skill_id UUID NOT NULL,
            proficiency VARCHAR(20) NOT NULL
                CHECK (proficiency IN ('BEGINNER', 'INTERMEDIATE', 'ADVANCED', 'EXPERT')),
            years_experience INTEGER NOT NULL CHECK (years_experience >= 0),
            note TEXT,
            PRIMARY KEY (profile_id, skill_id)
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_candidate_skills_skill
        ON candidate_skills(skill_id)
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            category TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            website TEXT,
            description TEXT,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS outbox_events (
            event_id UUID PRIMARY KEY,
            aggregate_id UUID NOT NULL,
            aggregate_type VARCHAR(20) NOT NULL
                CHECK (aggregate_type IN ('USER', 'CANDIDATE', 'SKILL', 'COMPANY')),
            event_type VARCHAR(60) NOT NULL,
            payload JSONB NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'PENDING'
                CHECK (status IN ('PENDING', 'IN_FLIGHT', 'PUBLISHED', 'FAILED')),
            retry_count INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            published_at TIMESTAMPTZ,
            next_attempt_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            claimed_at TIMESTAMPTZ
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_outbox_due
        ON outbox_events(next_attempt_at, created_at)
        WHERE status = 'PENDING'
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(map_sqlx_err)?;
    }

    tracing::info!("Database migrations applied");
    Ok(())
}
