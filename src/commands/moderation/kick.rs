use poise::serenity_prelude::Member;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::automod::policy::{self, ModCommand};
use crate::services::automod::rate_tracker::RateVerdict;
use crate::services::moderation::executor::{self, Target};
use crate::utils::permissions;

/// Kick a member from the server
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Member to kick"] member: Member,
    #[description = "Reason for the kick"] reason: Option<String>,
) -> Result<(), Error> {
    permissions::require_outranks(&ctx, &member)?;

    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
    let data = ctx.data();

    let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Kick), &data.config);
    let target = Target {
        guild_id: guild_id.get(),
        user_id: member.user.id.get(),
        channel_id: ctx.channel_id().get(),
        message_id: None,
    };

    let outcome = executor::apply(
        data.store.as_ref(),
        &data.platform,
        &data.config,
        target,
        decision,
        &reason,
        ctx.author().id.get(),
    )
    .await?;

    let embed = match outcome.failure {
        Some(note) => embeds::error_embed().title("Kick Failed").description(format!(
            "The kick was recorded but did not go through: {}",
            note
        )),
        None => embeds::success_embed().title("Member Kicked").description(format!(
            "<@{}> has been kicked.\n**Reason:** {}",
            member.user.id, reason
        )),
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
