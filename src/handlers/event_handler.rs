use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::message;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            if let Err(e) = message::handle_message(ctx, data, new_message).await {
                error!("Message handler error: {:?}", e);
            }
        }

        // Edits get the same content checks as new messages, so a clean
        // message cannot be edited into a violation unnoticed
        FullEvent::MessageUpdate { event, .. } => {
            if let Err(e) = message::handle_message_edit(ctx, data, event).await {
                error!("Message edit handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberAddition { new_member } => {
            // Timeouts are platform-enforced and survive a rejoin; nothing
            // to re-apply here
            tracing::debug!(
                "Member {} joined guild {}",
                new_member.user.id,
                new_member.guild_id
            );
        }

        _ => {}
    }

    Ok(())
}
