use poise::serenity_prelude::Member;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::automod::policy::{self, ModCommand};
use crate::services::automod::rate_tracker::RateVerdict;
use crate::services::moderation::executor::{self, Target};
use crate::services::moderation::modlog;
use crate::utils::duration::{format_duration, parse_duration};
use crate::utils::permissions;

/// Time out a member so they cannot send messages
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "Member to mute"] member: Member,
    #[description = "Duration like 30s, 10m, 1h or 7d (default 10m)"] duration: Option<String>,
    #[description = "Reason for the mute"] reason: Option<String>,
) -> Result<(), Error> {
    permissions::require_outranks(&ctx, &member)?;

    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
    let data = ctx.data();

    let duration = match duration {
        Some(text) => parse_duration(&text)?,
        None => data.config.escalation_mute(),
    };

    let decision = policy::decide(
        &[],
        RateVerdict::Ok,
        0,
        Some(ModCommand::Mute(duration)),
        &data.config,
    );
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
        Some(note) => embeds::error_embed().title("Mute Failed").description(format!(
            "The mute was recorded but did not go through: {}",
            note
        )),
        None => embeds::success_embed().title("Member Muted").description(format!(
            "<@{}> has been muted for {}.\n**Reason:** {}",
            member.user.id,
            format_duration(duration),
            reason
        )),
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Lift a member's timeout early
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn unmute(
    ctx: Context<'_>,
    #[description = "Member to unmute"] member: Member,
) -> Result<(), Error> {
    permissions::require_outranks(&ctx, &member)?;

    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    data.platform
        .remove_timeout(guild_id.get(), member.user.id.get())
        .await?;

    let log_embed = embeds::mod_log_embed(
        "Member Unmuted",
        ctx.author().id.get(),
        Some(member.user.id.get()),
        "Timeout lifted early",
        None,
    );
    modlog::post(data.platform.as_ref(), &data.config, log_embed).await;

    let embed = embeds::success_embed()
        .title("Member Unmuted")
        .description(format!("<@{}> is no longer muted.", member.user.id));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
