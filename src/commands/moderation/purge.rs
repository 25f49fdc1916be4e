use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::defaults::MAX_PURGE_COUNT;
use crate::constants::embeds;
use crate::services::moderation::executor;

/// Bulk-delete recent messages in this channel
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "How many messages to delete (1-100)"]
    #[min = 1]
    #[max = 100]
    count: u32,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();
    let count = count.min(MAX_PURGE_COUNT as u32) as u8;

    // The deletion sweep can take a moment on full channels
    ctx.defer_ephemeral().await?;

    let (deleted, action) = executor::purge(
        data.store.as_ref(),
        &data.platform,
        &data.config,
        guild_id.get(),
        ctx.channel_id().get(),
        count,
        ctx.author().id.get(),
    )
    .await?;

    let embed = match action.failure_note {
        Some(note) => embeds::error_embed()
            .title("Purge Failed")
            .description(format!("The purge did not go through: {}", note)),
        None => embeds::success_embed()
            .title("Messages Purged")
            .description(format!("Deleted {} messages.", deleted)),
    };
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
