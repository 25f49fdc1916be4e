use serenity::all::{Context, Guild, GuildId, Member, Permissions, UserId};

use crate::bot::error::Error;
use crate::constants::embeds;

/// Guild-level permissions from the member's roles (plus @everyone). The
/// owner implicitly has everything. Channel overwrites are ignored:
/// moderation capability is a guild-wide property.
fn role_permissions(guild: &Guild, member: &Member) -> Permissions {
    if member.user.id == guild.owner_id {
        return Permissions::all();
    }

    let mut perms = guild
        .roles
        .get(&guild.id.everyone_role())
        .map(|r| r.permissions)
        .unwrap_or_default();
    for role_id in &member.roles {
        if let Some(role) = guild.roles.get(role_id) {
            perms |= role.permissions;
        }
    }
    perms
}

fn has_mod_permissions(perms: Permissions) -> bool {
    perms.administrator() || perms.manage_messages() || perms.kick_members() || perms.ban_members()
}

/// Check if a member can use moderation commands: Manage Messages, Kick
/// Members or Ban Members (or administrator, which implies all three).
pub async fn is_moderator(ctx: &Context, guild_id: GuildId, user_id: UserId) -> bool {
    let Ok(member) = guild_id.member(ctx, user_id).await else {
        return false;
    };
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return false;
    };
    has_mod_permissions(role_permissions(&guild, &member))
}

/// Poise command check for the moderation commands. Replies with an
/// ephemeral error itself so callers get feedback instead of silence.
pub async fn require_moderator(ctx: crate::bot::data::Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };

    if is_moderator(ctx.serenity_context(), guild_id, ctx.author().id).await {
        return Ok(true);
    }

    let embed = embeds::error_embed()
        .title("Missing Permissions")
        .description(
            "You need Manage Messages, Kick Members or Ban Members to use this command.",
        );
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(false)
}

/// Role-hierarchy guard: both the bot and the invoker must sit strictly
/// above the target. The server owner outranks everyone as invoker but the
/// bot's own rank is never waived, since Discord rejects the call anyway.
pub fn require_outranks(ctx: &crate::bot::data::Context<'_>, target: &Member) -> Result<(), Error> {
    let bot_id = ctx.framework().bot_id;
    let guild = ctx
        .guild()
        .ok_or_else(|| Error::custom("Guild not available in cache"))?;

    hierarchy_allows(
        ctx.author().id == guild.owner_id,
        target.user.id == guild.owner_id,
        top_role_position(&guild, ctx.author().id),
        top_role_position(&guild, bot_id),
        guild
            .member_highest_role(target)
            .map(|r| r.position)
            .unwrap_or(0),
    )
}

fn top_role_position(guild: &Guild, user_id: UserId) -> u16 {
    guild
        .members
        .get(&user_id)
        .and_then(|m| guild.member_highest_role(m))
        .map(|r| r.position)
        .unwrap_or(0)
}

fn hierarchy_allows(
    invoker_is_owner: bool,
    target_is_owner: bool,
    invoker_position: u16,
    bot_position: u16,
    target_position: u16,
) -> Result<(), Error> {
    if target_is_owner {
        return Err(Error::PermissionDenied(
            "You cannot act on the server owner".to_string(),
        ));
    }
    if bot_position <= target_position {
        return Err(Error::PermissionDenied(
            "That member's highest role is at or above mine, so I cannot act on them".to_string(),
        ));
    }
    if invoker_is_owner {
        return Ok(());
    }
    if invoker_position <= target_position {
        return Err(Error::PermissionDenied(
            "That member's highest role is equal to or above yours".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_permissions_any_of_three() {
        assert!(has_mod_permissions(Permissions::MANAGE_MESSAGES));
        assert!(has_mod_permissions(Permissions::KICK_MEMBERS));
        assert!(has_mod_permissions(Permissions::BAN_MEMBERS));
        assert!(has_mod_permissions(Permissions::ADMINISTRATOR));
        assert!(!has_mod_permissions(
            Permissions::SEND_MESSAGES | Permissions::MANAGE_CHANNELS
        ));
    }

    #[test]
    fn test_bot_below_target_refused() {
        // Invoker outranks the target but the bot does not; the action
        // would bounce off Discord, so it is refused up front
        let result = hierarchy_allows(false, false, 10, 3, 5);
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
    }

    #[test]
    fn test_bot_rank_not_waived_for_owner() {
        let result = hierarchy_allows(true, false, 0, 3, 5);
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
    }

    #[test]
    fn test_invoker_below_target_refused() {
        let result = hierarchy_allows(false, false, 4, 10, 5);
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
    }

    #[test]
    fn test_equal_rank_refused() {
        let result = hierarchy_allows(false, false, 5, 10, 5);
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
    }

    #[test]
    fn test_owner_invoker_allowed_when_bot_outranks() {
        assert!(hierarchy_allows(true, false, 0, 10, 5).is_ok());
    }

    #[test]
    fn test_target_owner_always_refused() {
        let result = hierarchy_allows(true, true, 10, 10, 0);
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
    }

    #[test]
    fn test_both_outrank_allowed() {
        assert!(hierarchy_allows(false, false, 8, 9, 5).is_ok());
    }
}
