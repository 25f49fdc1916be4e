use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single warning issued to a member. Append-only: once written it is
/// never updated or deleted, which is what makes the escalation count
/// trustworthy as an audit source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WarningRecord {
    pub id: Uuid,
    pub guild_id: i64,
    pub user_id: i64,
    /// The bot's own user id for automatic warnings
    pub moderator_id: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
