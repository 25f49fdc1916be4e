use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::bot::error::Error;
use crate::config::ModerationConfig;
use crate::constants::embeds;
use crate::db::models::{ActionKind, ActionRecord, NewAction, WarningRecord};
use crate::db::store::ModerationStore;
use crate::services::automod::policy::{Decision, Sanction};
use crate::services::moderation::{modlog, mute_scheduler};
use crate::services::platform::Platform;

/// The member (and optionally the message) an enforcement applies to.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub guild_id: u64,
    pub user_id: u64,
    pub channel_id: u64,
    pub message_id: Option<u64>,
}

/// What actually happened: the persisted records plus any platform failure
/// that was absorbed along the way.
#[derive(Debug, Default)]
pub struct Outcome {
    pub warning: Option<WarningRecord>,
    pub action: Option<ActionRecord>,
    pub failure: Option<String>,
}

/// Apply a decision to a member.
///
/// Persistence always comes first: the warning and action records are
/// written before any platform call, so the audit trail survives a failed
/// kick or mute. A failed platform call is recorded as a failure note on
/// the action and surfaced in the mod-log; it never rolls anything back
/// and never escapes as an error. Only store failures propagate.
///
/// Callers that feed an escalation count into the decision must hold the
/// member's lock across the count-read and this call, so two concurrent
/// violations cannot both observe the same stale count.
pub async fn apply(
    store: &dyn ModerationStore,
    platform: &Arc<dyn Platform>,
    config: &ModerationConfig,
    target: Target,
    decision: Decision,
    reason: &str,
    moderator_id: u64,
) -> Result<Outcome, Error> {
    if decision.is_none() {
        return Ok(Outcome::default());
    }

    // Purge decisions are channel-scoped, not member-scoped
    if let Some(count) = decision.purge {
        let (_, action) = purge(
            store,
            platform,
            config,
            target.guild_id,
            target.channel_id,
            count,
            moderator_id,
        )
        .await?;
        return Ok(Outcome {
            warning: None,
            failure: action.failure_note.clone(),
            action: Some(action),
        });
    }

    let mut outcome = Outcome::default();

    // Durable records before any external effect
    if decision.record_warning {
        let warning = store
            .add_warning(
                target.guild_id as i64,
                target.user_id as i64,
                moderator_id as i64,
                reason,
            )
            .await?;
        outcome.warning = Some(warning);
    }

    let kind = match decision.sanction {
        Some(Sanction::Warn) => ActionKind::Warn,
        Some(Sanction::Mute(_)) => ActionKind::Mute,
        Some(Sanction::Kick) => ActionKind::Kick,
        Some(Sanction::Ban) => ActionKind::Ban,
        None => ActionKind::Delete,
    };

    let (duration_secs, expires_at) = match decision.sanction {
        Some(Sanction::Mute(duration)) => {
            let expires = Utc::now() + chrono::Duration::from_std(duration).unwrap_or_default();
            (Some(duration.as_secs() as i64), Some(expires))
        }
        _ => (None, None),
    };

    let action = store
        .add_action(&NewAction {
            guild_id: target.guild_id as i64,
            user_id: Some(target.user_id as i64),
            kind,
            reason: reason.to_string(),
            moderator_id: moderator_id as i64,
            duration_secs,
            expires_at,
        })
        .await?;

    // DM before the sanction lands, while the member can still receive it.
    // Best-effort: closed DMs are not an error.
    if decision.sanction.is_some() {
        let embed = embeds::warning_embed()
            .title(dm_title(kind))
            .description(format!("**Reason:** {}", reason));
        if let Err(e) = platform.send_direct_message(target.user_id, embed).await {
            info!("Could not DM user {}: {}", target.user_id, e);
        }
    }

    if decision.delete_message {
        if let Some(message_id) = target.message_id {
            if let Err(e) = platform.delete_message(target.channel_id, message_id).await {
                warn!("Failed to delete message {}: {}", message_id, e);
                if kind == ActionKind::Delete {
                    let note = e.to_string();
                    store.set_failure_note(action.id, &note).await?;
                    outcome.failure = Some(note);
                }
            }
        }
    }

    // The sanction itself
    let result = match decision.sanction {
        Some(Sanction::Mute(_)) => match expires_at {
            Some(until) => {
                let result = platform
                    .timeout_member(target.guild_id, target.user_id, until)
                    .await;
                // Schedule regardless of the call's outcome: un-muting an
                // already-unmuted member is a no-op.
                mute_scheduler::schedule_unmute(
                    Arc::clone(platform),
                    target.guild_id,
                    target.user_id,
                    until,
                );
                result
            }
            None => Ok(()),
        },
        Some(Sanction::Kick) => {
            platform
                .kick_member(target.guild_id, target.user_id, reason)
                .await
        }
        Some(Sanction::Ban) => {
            platform
                .ban_member(target.guild_id, target.user_id, reason)
                .await
        }
        Some(Sanction::Warn) | None => Ok(()),
    };

    if let Err(e) = result {
        warn!(
            "Platform call for {} on user {} failed: {}",
            kind, target.user_id, e
        );
        let note = e.to_string();
        store.set_failure_note(action.id, &note).await?;
        outcome.failure = Some(note);
    }

    // Audit trail to the mod-log channel
    let log_embed = embeds::mod_log_embed(
        log_title(kind),
        moderator_id,
        Some(target.user_id),
        reason,
        outcome.failure.as_deref(),
    );
    modlog::post(platform.as_ref(), config, log_embed).await;

    info!(
        "Enforced {} on user {} in guild {} (moderator {})",
        kind, target.user_id, target.guild_id, moderator_id
    );

    outcome.action = Some(action);
    Ok(outcome)
}

/// Bulk message deletion. Recorded like any other enforcement, but keyed to
/// the channel rather than a member.
pub async fn purge(
    store: &dyn ModerationStore,
    platform: &Arc<dyn Platform>,
    config: &ModerationConfig,
    guild_id: u64,
    channel_id: u64,
    count: u8,
    moderator_id: u64,
) -> Result<(usize, ActionRecord), Error> {
    let reason = format!("Purged up to {} messages from channel {}", count, channel_id);

    let mut action = store
        .add_action(&NewAction {
            guild_id: guild_id as i64,
            user_id: None,
            kind: ActionKind::Delete,
            reason: reason.clone(),
            moderator_id: moderator_id as i64,
            duration_secs: None,
            expires_at: None,
        })
        .await?;

    let deleted = match platform.purge_messages(channel_id, count, None).await {
        Ok(n) => n,
        Err(e) => {
            warn!("Purge in channel {} failed: {}", channel_id, e);
            let note = e.to_string();
            store.set_failure_note(action.id, &note).await?;
            action.failure_note = Some(note);
            0
        }
    };

    let log_embed = embeds::mod_log_embed(
        "Messages Purged",
        moderator_id,
        None,
        &reason,
        action.failure_note.as_deref(),
    );
    modlog::post(platform.as_ref(), config, log_embed).await;

    Ok((deleted, action))
}

fn dm_title(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Warn => "You have been warned",
        ActionKind::Mute => "You have been muted",
        ActionKind::Kick => "You have been kicked",
        ActionKind::Ban => "You have been banned",
        ActionKind::Delete => "Your message was removed",
    }
}

fn log_title(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Warn => "Member Warned",
        ActionKind::Mute => "Member Muted",
        ActionKind::Kick => "Member Kicked",
        ActionKind::Ban => "Member Banned",
        ActionKind::Delete => "Message Deleted",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::config::ModerationConfig;
    use crate::db::store::testing::MemoryStore;
    use crate::services::automod::filter::Violation;
    use crate::services::automod::policy::{self, ModCommand};
    use crate::services::automod::rate_tracker::RateVerdict;
    use crate::services::platform::testing::MockPlatform;

    fn setup(mock: MockPlatform) -> (MemoryStore, Arc<MockPlatform>, Arc<dyn Platform>, ModerationConfig) {
        let mock = Arc::new(mock);
        let platform: Arc<dyn Platform> = mock.clone();
        (MemoryStore::new(), mock, platform, ModerationConfig::default())
    }

    fn target() -> Target {
        Target {
            guild_id: 10,
            user_id: 20,
            channel_id: 30,
            message_id: Some(40),
        }
    }

    #[tokio::test]
    async fn test_third_warning_escalates_to_mute() {
        let (store, mock, platform, config) = setup(MockPlatform::new());
        store.seed_warning(10, 20, "first");
        store.seed_warning(10, 20, "second");

        let prior = store.warning_count_since(10, 20, None).await.unwrap();
        assert_eq!(prior, 2);

        let violations = vec![Violation::BannedWord {
            matched: "heck".into(),
        }];
        let decision = policy::decide(&violations, RateVerdict::Ok, prior, None, &config);

        let outcome = apply(&store, &platform, &config, target(), decision, "banned word", 1)
            .await
            .unwrap();

        // Third warning recorded, sanction upgraded to mute
        assert!(outcome.warning.is_some());
        let action = outcome.action.unwrap();
        assert_eq!(action.kind, ActionKind::Mute);
        assert_eq!(action.duration_secs, Some(600));
        assert!(action.expires_at.is_some());
        assert_eq!(store.warning_count_since(10, 20, None).await.unwrap(), 3);

        // Platform saw the message delete and the timeout
        assert_eq!(mock.deleted_messages.lock().unwrap().len(), 1);
        assert_eq!(mock.timeouts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_manual_ban_bypasses_detection() {
        let (store, mock, platform, config) = setup(MockPlatform::new());

        let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Ban), &config);
        let outcome = apply(&store, &platform, &config, target(), decision, "spam", 555)
            .await
            .unwrap();

        assert!(outcome.warning.is_none());
        assert!(outcome.failure.is_none());

        let actions = store.actions.lock().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Ban);
        assert_eq!(actions[0].moderator_id, 555);
        assert_eq!(actions[0].reason, "spam");
        drop(actions);
        assert!(store.warnings.lock().unwrap().is_empty());
        assert_eq!(mock.bans.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_kick_failure_keeps_record_with_note() {
        let (store, _mock, platform, config) = setup(MockPlatform {
            fail_kick: true,
            ..Default::default()
        });

        let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Kick), &config);
        // The permission error must not escape
        let outcome = apply(&store, &platform, &config, target(), decision, "bye", 555)
            .await
            .unwrap();

        assert!(outcome.failure.is_some());
        let actions = store.actions.lock().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Kick);
        assert!(actions[0]
            .failure_note
            .as_deref()
            .unwrap()
            .contains("permission"));
    }

    #[tokio::test]
    async fn test_warn_persists_both_records_and_dms() {
        let (store, mock, platform, config) = setup(MockPlatform::new());

        let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Warn), &config);
        let outcome = apply(&store, &platform, &config, target(), decision, "be nice", 555)
            .await
            .unwrap();

        assert!(outcome.warning.is_some());
        assert_eq!(outcome.action.unwrap().kind, ActionKind::Warn);
        assert_eq!(mock.dms.load(Ordering::SeqCst), 1);
        // A plain warn makes no mutation calls
        assert!(mock.kicks.lock().unwrap().is_empty());
        assert!(mock.timeouts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_decision_routes_through_bulk_delete() {
        let (store, mock, platform, config) = setup(MockPlatform::new());

        let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Purge(25)), &config);
        let outcome = apply(&store, &platform, &config, target(), decision, "cleanup", 555)
            .await
            .unwrap();

        // The bulk delete actually runs, scoped to the channel
        assert_eq!(*mock.purges.lock().unwrap(), vec![(30, 25)]);
        assert!(outcome.warning.is_none());
        let action = outcome.action.unwrap();
        assert_eq!(action.kind, ActionKind::Delete);
        assert_eq!(action.user_id, None);
        assert_eq!(action.moderator_id, 555);
    }

    #[tokio::test]
    async fn test_purge_records_channel_action() {
        let (store, mock, platform, config) = setup(MockPlatform::new());

        let (deleted, action) = purge(&store, &platform, &config, 10, 30, 25, 555)
            .await
            .unwrap();

        assert_eq!(deleted, 25);
        assert_eq!(action.kind, ActionKind::Delete);
        assert_eq!(action.user_id, None);
        assert_eq!(action.moderator_id, 555);
        assert_eq!(*mock.purges.lock().unwrap(), vec![(30, 25)]);
    }

    #[tokio::test]
    async fn test_mod_log_receives_entry() {
        let (store, mock, platform, _) = setup(MockPlatform::new());
        let config = ModerationConfig {
            mod_log_channel: 99,
            ..Default::default()
        };

        let decision = policy::decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Warn), &config);
        apply(&store, &platform, &config, target(), decision, "reason", 1)
            .await
            .unwrap();

        assert_eq!(*mock.channel_messages.lock().unwrap(), vec![99]);
    }
}
