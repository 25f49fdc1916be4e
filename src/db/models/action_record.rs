use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "action_kind", rename_all = "lowercase")]
pub enum ActionKind {
    Kick,
    Ban,
    Mute,
    Delete,
    Warn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Kick => "kick",
            ActionKind::Ban => "ban",
            ActionKind::Mute => "mute",
            ActionKind::Delete => "delete",
            ActionKind::Warn => "warn",
        };
        f.write_str(s)
    }
}

/// One entry in the mod-log audit trail. `failure_note` is the only field
/// written after insert: it is set once when the platform call fails, so
/// the trail stays complete even when Discord refuses the action.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionRecord {
    pub id: Uuid,
    pub guild_id: i64,
    /// None for channel-wide actions (purge)
    pub user_id: Option<i64>,
    pub kind: ActionKind,
    pub reason: String,
    pub moderator_id: i64,
    pub duration_secs: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub failure_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActionRecord {
    pub fn is_active_mute(&self, now: DateTime<Utc>) -> bool {
        self.kind == ActionKind::Mute && self.expires_at.is_some_and(|e| e > now)
    }
}

/// Fields for a new action row; the id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewAction {
    pub guild_id: i64,
    pub user_id: Option<i64>,
    pub kind: ActionKind,
    pub reason: String,
    pub moderator_id: i64,
    pub duration_secs: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}
