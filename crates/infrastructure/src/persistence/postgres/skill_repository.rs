//! PostgreSQL skill catalog repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::persistence::map_sqlx_err;
use crate::persistence::postgres::outbox::insert_outbox_rows;
use talentgrid_domain::outbox::OutboxRecordInsert;
use talentgrid_domain::shared_kernel::{Result, SkillId};
use talentgrid_domain::skills::{Skill, SkillRepository};

#[derive(FromRow)]
struct SkillRow {
    id: Uuid,
    name: String,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SkillRow {
    fn into_skill(self) -> Skill {
        Skill::from_parts(
            SkillId(self.id),
            self.name,
            self.category,
            self.created_at,
            self.updated_at,
        )
    }
}

pub struct PostgresSkillRepository {
    pool: PgPool,
}

impl PostgresSkillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(&self, skill: &Skill, events: &[OutboxRecordInsert], update: bool) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let query = if update {
            sqlx::query("UPDATE skills SET name = $2, category = $3, updated_at = $4 WHERE id = $1")
                .bind(skill.id.0)
                .bind(skill.name())
                .bind(skill.category())
                .bind(skill.updated_at())
        } else {
            sqlx::query(
                "INSERT INTO skills (id, name, category, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(skill.id.0)
            .bind(skill.name())
            .bind(skill.category())
            .bind(skill.created_at())
            .bind(skill.updated_at())
        };

        query.execute(&mut *tx).await.map_err(map_sqlx_err)?;

        insert_outbox_rows(&mut tx, events).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }
}

#[async_trait]
impl SkillRepository for PostgresSkillRepository {
    async fn save_with_events(&self, skill: &Skill, events: &[OutboxRecordInsert]) -> Result<()> {
        self.write(skill, events, false).await
    }

    async fn update_with_events(
        &self,
        skill: &Skill,
        events: &[OutboxRecordInsert],
    ) -> Result<()> {
        self.write(skill, events, true).await
    }

    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>> {
        let row: Option<SkillRow> = sqlx::query_as(
            "SELECT id, name, category, created_at, updated_at FROM skills WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.map(SkillRow::into_skill))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Skill>> {
        let row: Option<SkillRow> = sqlx::query_as(
            "SELECT id, name, category, created_at, updated_at FROM skills WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.map(SkillRow::into_skill))
    }

    async fn find_all(&self, limit: usize, offset: usize) -> Result<(Vec<Skill>, usize)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let rows: Vec<SkillRow> = sqlx::query_as(
            "SELECT id, name, category, created_at, updated_at FROM skills \
             ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok((
            rows.into_iter().map(SkillRow::into_skill).collect(),
            total as usize,
        ))
    }
}
