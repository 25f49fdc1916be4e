use poise::serenity_prelude::Member;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::automod::policy::{self, ModCommand};
use crate::services::automod::rate_tracker::RateVerdict;
use crate::services::moderation::executor::{self, Target};
use crate::utils::permissions;

/// Issue a formal warning to a member
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: Member,
    #[description = "Reason for the warning"] reason: String,
) -> Result<(), Error> {
    permissions::require_outranks(&ctx, &member)?;

    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Warn), &data.config);
    let target = Target {
        guild_id: guild_id.get(),
        user_id: member.user.id.get(),
        channel_id: ctx.channel_id().get(),
        message_id: None,
    };

    executor::apply(
        data.store.as_ref(),
        &data.platform,
        &data.config,
        target,
        decision,
        &reason,
        ctx.author().id.get(),
    )
    .await?;

    let total = data
        .store
        .warning_count_since(guild_id.get() as i64, member.user.id.get() as i64, None)
        .await?;

    let embed = embeds::success_embed().title("Member Warned").description(format!(
        "<@{}> has been warned.\n**Reason:** {}\nThey now have {} warning{}.",
        member.user.id,
        reason,
        total,
        if total == 1 { "" } else { "s" }
    ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// List a member's warnings
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::utils::permissions::require_moderator"
)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member to look up"] member: Member,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    let records = data
        .store
        .warnings_for(guild_id.get() as i64, member.user.id.get() as i64)
        .await?;

    let embed = if records.is_empty() {
        embeds::info_embed()
            .title("No Warnings")
            .description(format!("<@{}> has no warnings on record.", member.user.id))
    } else {
        // Most recent first, capped so the embed stays readable
        let lines: Vec<String> = records
            .iter()
            .take(10)
            .map(|w| {
                format!(
                    "<t:{}:d> by <@{}>: {}",
                    w.created_at.timestamp(),
                    w.moderator_id,
                    w.reason
                )
            })
            .collect();
        embeds::info_embed()
            .title(format!("Warnings ({})", records.len()))
            .description(format!(
                "Warnings for <@{}>:\n{}",
                member.user.id,
                lines.join("\n")
            ))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
