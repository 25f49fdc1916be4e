use serenity::all::{Colour, CreateEmbed};

/// Success color - Emerald green
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Error color - Rose red
pub const ERROR_COLOR: Colour = Colour::from_rgb(244, 63, 94);

/// Warning color - Amber
pub const WARNING_COLOR: Colour = Colour::from_rgb(245, 158, 11);

/// Info/neutral color - Slate
pub const INFO_COLOR: Colour = Colour::from_rgb(100, 116, 139);

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

/// Create an info/neutral embed
pub fn info_embed() -> CreateEmbed {
    CreateEmbed::new().color(INFO_COLOR)
}

/// Audit embed posted to the mod-log channel for every enforcement action
pub fn mod_log_embed(
    action: &str,
    moderator_id: u64,
    target_id: Option<u64>,
    reason: &str,
    failure: Option<&str>,
) -> CreateEmbed {
    let mut embed = warning_embed()
        .title(action.to_string())
        .field("Moderator", format!("<@{}>", moderator_id), true)
        .field("Reason", reason.to_string(), false);

    if let Some(target_id) = target_id {
        embed = embed.field("Member", format!("<@{}>", target_id), true);
    }

    if let Some(failure) = failure {
        embed = embed
            .color(ERROR_COLOR)
            .field("Platform call failed", failure.to_string(), false);
    }

    embed
}
