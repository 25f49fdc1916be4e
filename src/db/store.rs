use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::bot::error::Error;
use crate::db::models::{ActionRecord, NewAction, WarningRecord};
use crate::db::queries;

/// Durable source of truth for warnings and the action audit trail. The
/// enforcement executor talks to this seam so its escalation and failure
/// handling can be exercised without a live Postgres.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    async fn add_warning(
        &self,
        guild_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
    ) -> Result<WarningRecord, Error>;

    async fn warnings_for(&self, guild_id: i64, user_id: i64)
        -> Result<Vec<WarningRecord>, Error>;

    async fn warning_count_since(
        &self,
        guild_id: i64,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, Error>;

    async fn add_action(&self, action: &NewAction) -> Result<ActionRecord, Error>;

    async fn set_failure_note(&self, id: Uuid, note: &str) -> Result<(), Error>;

    async fn active_mutes(&self) -> Result<Vec<ActionRecord>, Error>;
}

pub struct PgModerationStore {
    pool: PgPool,
}

impl PgModerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationStore for PgModerationStore {
    async fn add_warning(
        &self,
        guild_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
    ) -> Result<WarningRecord, Error> {
        Ok(queries::warnings::create(&self.pool, guild_id, user_id, moderator_id, reason).await?)
    }

    async fn warnings_for(
        &self,
        guild_id: i64,
        user_id: i64,
    ) -> Result<Vec<WarningRecord>, Error> {
        Ok(queries::warnings::list_for_member(&self.pool, guild_id, user_id).await?)
    }

    async fn warning_count_since(
        &self,
        guild_id: i64,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, Error> {
        Ok(queries::warnings::count_since(&self.pool, guild_id, user_id, since).await?)
    }

    async fn add_action(&self, action: &NewAction) -> Result<ActionRecord, Error> {
        Ok(queries::actions::create(&self.pool, action).await?)
    }

    async fn set_failure_note(&self, id: Uuid, note: &str) -> Result<(), Error> {
        Ok(queries::actions::set_failure_note(&self.pool, id, note).await?)
    }

    async fn active_mutes(&self) -> Result<Vec<ActionRecord>, Error> {
        Ok(queries::actions::active_mutes(&self.pool).await?)
    }
}
