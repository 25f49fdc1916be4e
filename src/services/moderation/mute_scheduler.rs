use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::bot::error::Error;
use crate::db::store::ModerationStore;
use crate::services::platform::Platform;

/// Spawn a task that lifts the member's timeout once it expires.
///
/// Removal is idempotent, so racing the platform's own expiry (or a
/// moderator's manual unmute) is harmless. Failures are logged and
/// dropped: if the member already left, there is nothing to unmute.
pub fn schedule_unmute(
    platform: Arc<dyn Platform>,
    guild_id: u64,
    user_id: u64,
    expires_at: DateTime<Utc>,
) {
    tokio::spawn(async move {
        let remaining = (expires_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        tokio::time::sleep(remaining).await;

        match platform.remove_timeout(guild_id, user_id).await {
            Ok(()) => debug!("Lifted expired mute for user {} in guild {}", user_id, guild_id),
            Err(e) => debug!(
                "Could not lift mute for user {} in guild {}: {}",
                user_id, guild_id, e
            ),
        }
    });
}

/// Re-arm expiry tasks for mutes that were still active when the process
/// last stopped. Called once on startup so restarts do not strand members
/// in a timeout past its recorded expiry.
pub async fn restore_pending(
    store: &dyn ModerationStore,
    platform: &Arc<dyn Platform>,
) -> Result<usize, Error> {
    let mutes = store.active_mutes().await?;
    let count = mutes.len();

    for mute in mutes {
        let (Some(user_id), Some(expires_at)) = (mute.user_id, mute.expires_at) else {
            continue;
        };
        schedule_unmute(
            Arc::clone(platform),
            mute.guild_id as u64,
            user_id as u64,
            expires_at,
        );
    }

    if count > 0 {
        info!("Restored {} pending mute expiries", count);
    }
    Ok(count)
}
