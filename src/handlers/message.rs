use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use poise::serenity_prelude::{self as serenity, Message, MessageUpdateEvent};
use tracing::debug;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::defaults::NOTICE_DELETE_SECS;
use crate::constants::embeds;
use crate::services::automod::filter::Violation;
use crate::services::automod::policy;
use crate::services::automod::rate_tracker::{content_hash, RateVerdict};
use crate::services::moderation::executor::{self, Target};
use crate::utils::permissions;

/// Run every guild message through the automod pipeline: content filter,
/// rate tracking, decision, enforcement.
pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Arc<Data>,
    msg: &Message,
) -> Result<(), Error> {
    // DMs are not moderated; bots (ourselves included) are exempt
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    if msg.author.bot || data.is_self(msg.author.id.get()) {
        return Ok(());
    }
    if permissions::is_moderator(ctx, guild_id, msg.author.id).await {
        return Ok(());
    }

    let violations = data.filter.classify(&msg.content);
    // Every message feeds the window, clean or not, so burst detection
    // sees the member's full send rate
    let verdict = data.rate_tracker.record(
        guild_id.get(),
        msg.author.id.get(),
        Instant::now(),
        content_hash(&msg.content),
    );

    if violations.is_empty() && verdict == RateVerdict::Ok {
        return Ok(());
    }

    debug!(
        "Automod hit for user {} in guild {}: {:?} / {:?}",
        msg.author.id, guild_id, violations, verdict
    );

    let target = Target {
        guild_id: guild_id.get(),
        user_id: msg.author.id.get(),
        channel_id: msg.channel_id.get(),
        message_id: Some(msg.id.get()),
    };
    enforce(data, target, &violations, verdict).await
}

/// Edited messages get the content filter only. The rate window tracks
/// send frequency, and an edit is not a send.
pub async fn handle_message_edit(
    _ctx: &serenity::Context,
    data: &Arc<Data>,
    event: &MessageUpdateEvent,
) -> Result<(), Error> {
    let Some(guild_id) = event.guild_id else {
        return Ok(());
    };
    let Some(author) = &event.author else {
        return Ok(());
    };
    if author.bot || data.is_self(author.id.get()) {
        return Ok(());
    }
    let Some(content) = &event.content else {
        return Ok(());
    };

    let violations = data.filter.classify(content);
    if violations.is_empty() {
        return Ok(());
    }

    let target = Target {
        guild_id: guild_id.get(),
        user_id: author.id.get(),
        channel_id: event.channel_id.get(),
        message_id: Some(event.id.get()),
    };
    enforce(data, target, &violations, RateVerdict::Ok).await
}

/// Count, decide and apply under the member's lock, so concurrent
/// violations from the same member escalate off consistent counts.
async fn enforce(
    data: &Arc<Data>,
    target: Target,
    violations: &[Violation],
    verdict: RateVerdict,
) -> Result<(), Error> {
    let lock = data.member_lock(target.guild_id, target.user_id);
    let _guard = lock.lock().await;

    let prior = data
        .store
        .warning_count_since(
            target.guild_id as i64,
            target.user_id as i64,
            data.config.escalation_cutoff(Utc::now()),
        )
        .await?;

    let decision = policy::decide(violations, verdict, prior, None, &data.config);
    if decision.is_none() {
        return Ok(());
    }

    let reason = describe(violations, verdict);
    executor::apply(
        data.store.as_ref(),
        &data.platform,
        &data.config,
        target,
        decision,
        &reason,
        data.bot_user_id(),
    )
    .await?;

    post_transient_notice(data, target, &reason);
    Ok(())
}

/// Short channel notice that cleans itself up, so moderation is visible
/// without leaving clutter.
fn post_transient_notice(data: &Arc<Data>, target: Target, reason: &str) {
    let platform = Arc::clone(&data.platform);
    let embed = embeds::warning_embed().title("Message Removed").description(format!(
        "<@{}>: {}",
        target.user_id, reason
    ));

    tokio::spawn(async move {
        let notice_id = match platform.send_channel_message(target.channel_id, embed).await {
            Ok(id) => id,
            Err(e) => {
                debug!("Could not post automod notice: {}", e);
                return;
            }
        };

        tokio::time::sleep(Duration::from_secs(NOTICE_DELETE_SECS)).await;
        if let Err(e) = platform.delete_message(target.channel_id, notice_id).await {
            debug!("Could not delete automod notice {}: {}", notice_id, e);
        }
    });
}

fn describe(violations: &[Violation], verdict: RateVerdict) -> String {
    let mut parts: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    match verdict {
        RateVerdict::SpamBurst { count } => {
            parts.push(Violation::SpamBurst { count }.to_string());
        }
        RateVerdict::SpamDuplicate { repeats } => {
            parts.push(Violation::SpamDuplicate { repeats }.to_string());
        }
        RateVerdict::Ok => {}
    }
    parts.join("; ")
}
