use serenity::all::CreateEmbed;
use tracing::{debug, warn};

use crate::config::ModerationConfig;
use crate::services::platform::Platform;

/// Post an audit embed to the configured mod-log channel. Best-effort: a
/// missing or unwritable channel is logged, never fatal.
pub async fn post(platform: &dyn Platform, config: &ModerationConfig, embed: CreateEmbed) {
    if config.mod_log_channel == 0 {
        debug!("No mod-log channel configured, skipping audit post");
        return;
    }

    if let Err(e) = platform
        .send_channel_message(config.mod_log_channel, embed)
        .await
    {
        warn!(
            "Failed to post to mod-log channel {}: {}",
            config.mod_log_channel, e
        );
    }
}
