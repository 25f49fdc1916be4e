use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::WarningRecord;

pub async fn create(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    moderator_id: i64,
    reason: &str,
) -> Result<WarningRecord, sqlx::Error> {
    sqlx::query_as::<_, WarningRecord>(
        r#"
        INSERT INTO warnings (guild_id, user_id, moderator_id, reason)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(moderator_id)
    .bind(reason)
    .fetch_one(pool)
    .await
}

pub async fn list_for_member(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
) -> Result<Vec<WarningRecord>, sqlx::Error> {
    sqlx::query_as::<_, WarningRecord>(
        r#"
        SELECT * FROM warnings
        WHERE guild_id = $1 AND user_id = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Count warnings for a member, optionally restricted to those newer than
/// `since` (the escalation lookback cutoff).
pub async fn count_since(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    since: Option<DateTime<Utc>>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = match since {
        Some(since) => {
            sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM warnings
                WHERE guild_id = $1 AND user_id = $2 AND created_at >= $3
                "#,
            )
            .bind(guild_id)
            .bind(user_id)
            .bind(since)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT COUNT(*) FROM warnings WHERE guild_id = $1 AND user_id = $2",
            )
            .bind(guild_id)
            .bind(user_id)
            .fetch_one(pool)
            .await?
        }
    };

    Ok(row.0)
}
