use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{ActionRecord, NewAction};

pub async fn create(pool: &PgPool, action: &NewAction) -> Result<ActionRecord, sqlx::Error> {
    sqlx::query_as::<_, ActionRecord>(
        r#"
        INSERT INTO actions (guild_id, user_id, kind, reason, moderator_id, duration_secs, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(action.guild_id)
    .bind(action.user_id)
    .bind(action.kind)
    .bind(&action.reason)
    .bind(action.moderator_id)
    .bind(action.duration_secs)
    .bind(action.expires_at)
    .fetch_one(pool)
    .await
}

/// Attach a failure note to an already-persisted action. The substantive
/// fields are never touched after insert.
pub async fn set_failure_note(
    pool: &PgPool,
    id: Uuid,
    note: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE actions SET failure_note = $2 WHERE id = $1")
        .bind(id)
        .bind(note)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mutes whose expiry is still in the future, used to rebuild unmute timers
/// after a restart.
pub async fn active_mutes(pool: &PgPool) -> Result<Vec<ActionRecord>, sqlx::Error> {
    sqlx::query_as::<_, ActionRecord>(
        r#"
        SELECT * FROM actions
        WHERE kind = 'mute' AND expires_at > NOW()
        ORDER BY expires_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
}
