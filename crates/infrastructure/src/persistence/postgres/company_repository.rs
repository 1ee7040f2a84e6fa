//! PostgreSQL company repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::persistence::map_sqlx_err;
use crate::persistence::postgres::outbox::insert_outbox_rows;
use talentgrid_domain::companies::{Company, CompanyRepository};
use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{CompanyId, Result};

#[derive(FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    website: Option<String>,
    description: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyRow {
    fn into_company(self) -> Company {
        Company::from_parts(
            CompanyId(self.id),
            self.name,
            self.website,
            self.description,
            self.active,
            self.created_at,
            self.updated_at,
        )
    }
}

pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
        update: bool,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let query = if update {
            sqlx::query(
                r#"
                UPDATE companies
                SET name = $2, website = $3, description = $4, active = $5, updated_at = $6
                WHERE id = $1
                "#,
            )
            .bind(company.id.0)
            .bind(company.name())
            .bind(company.website())
            .bind(company.description())
            .bind(company.is_active())
            .bind(company.updated_at())
        } else {
            sqlx::query(
                r#"
                INSERT INTO companies (id, name, website, description, active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(company.id.0)
            .bind(company.name())
            .bind(company.website())
            .bind(company.description())
            .bind(company.is_active())
            .bind(company.created_at())
            .bind(company.updated_at())
        };

        query.execute(&mut *tx).await.map_err(map_sqlx_err)?;

        insert_outbox_rows(&mut tx, events).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn save_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        self.write(company, events, false).await
    }

    async fn update_with_events(
        &self,
        company: &Company,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        self.write(company, events, true).await
    }

    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>> {
        let row: Option<CompanyRow> = sqlx::query_as(
            "SELECT id, name, website, description, active, created_at, updated_at \
             FROM companies WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.map(CompanyRow::into_company))
    }
}
