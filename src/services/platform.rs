use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, CreateEmbed, CreateMessage, EditMember, GetMessages, GuildId, Http, MessageId,
    UserId,
};
use tracing::debug;

use crate::bot::error::Error;

/// The chat-platform mutation boundary. Every call can fail with a
/// permission or not-found error; the enforcement executor treats those as
/// recoverable and records them instead of propagating.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error>;

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
    ) -> Result<(), Error>;

    async fn remove_timeout(&self, guild_id: u64, user_id: u64) -> Result<(), Error>;

    async fn kick_member(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), Error>;

    async fn ban_member(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), Error>;

    async fn send_direct_message(&self, user_id: u64, embed: CreateEmbed) -> Result<(), Error>;

    /// Returns the id of the sent message so transient notices can delete
    /// themselves.
    async fn send_channel_message(
        &self,
        channel_id: u64,
        embed: CreateEmbed,
    ) -> Result<u64, Error>;

    /// Bulk-delete up to `count` recent messages, optionally only those by
    /// one author. Returns how many were removed.
    async fn purge_messages(
        &self,
        channel_id: u64,
        count: u8,
        only_from: Option<u64>,
    ) -> Result<usize, Error>;
}

/// Serenity-backed implementation used in production.
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error> {
        self.http
            .delete_message(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                None,
            )
            .await?;
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
    ) -> Result<(), Error> {
        let edit = EditMember::new().disable_communication_until(until.to_rfc3339());
        GuildId::new(guild_id)
            .edit_member(&self.http, UserId::new(user_id), edit)
            .await?;
        Ok(())
    }

    async fn remove_timeout(&self, guild_id: u64, user_id: u64) -> Result<(), Error> {
        let edit = EditMember::new().enable_communication();
        GuildId::new(guild_id)
            .edit_member(&self.http, UserId::new(user_id), edit)
            .await?;
        Ok(())
    }

    async fn kick_member(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), Error> {
        GuildId::new(guild_id)
            .kick_with_reason(&self.http, UserId::new(user_id), reason)
            .await?;
        Ok(())
    }

    async fn ban_member(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), Error> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), 0, reason)
            .await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: u64, embed: CreateEmbed) -> Result<(), Error> {
        let dm = UserId::new(user_id).create_dm_channel(&self.http).await?;
        dm.send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel_id: u64,
        embed: CreateEmbed,
    ) -> Result<u64, Error> {
        let message = ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(message.id.get())
    }

    async fn purge_messages(
        &self,
        channel_id: u64,
        count: u8,
        only_from: Option<u64>,
    ) -> Result<usize, Error> {
        let channel_id = ChannelId::new(channel_id);
        let messages = channel_id
            .messages(&self.http, GetMessages::new().limit(count))
            .await?;

        let ids: Vec<MessageId> = messages
            .iter()
            .filter(|m| only_from.is_none_or(|u| m.author.id.get() == u))
            .map(|m| m.id)
            .collect();

        match ids.len() {
            0 => {}
            // Bulk delete requires at least two messages
            1 => channel_id.delete_message(&self.http, ids[0]).await?,
            _ => channel_id.delete_messages(&self.http, &ids).await?,
        }

        debug!("Purged {} messages from channel {}", ids.len(), channel_id);
        Ok(ids.len())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Scriptable platform double: records every call and can be told to
    /// fail specific operations.
    #[derive(Default)]
    pub struct MockPlatform {
        pub fail_kick: bool,
        pub fail_ban: bool,
        pub fail_timeout: bool,
        pub deleted_messages: Mutex<Vec<(u64, u64)>>,
        pub kicks: Mutex<Vec<(u64, u64, String)>>,
        pub bans: Mutex<Vec<(u64, u64, String)>>,
        pub timeouts: Mutex<Vec<(u64, u64, DateTime<Utc>)>>,
        pub timeout_removals: AtomicUsize,
        pub dms: AtomicUsize,
        pub channel_messages: Mutex<Vec<u64>>,
        pub purges: Mutex<Vec<(u64, u8)>>,
    }

    impl MockPlatform {
        pub fn new() -> Self {
            Self::default()
        }

        fn denied() -> Error {
            Error::PermissionDenied("missing permission".into())
        }
    }

    #[async_trait]
    impl Platform for MockPlatform {
        async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error> {
            self.deleted_messages
                .lock()
                .unwrap()
                .push((channel_id, message_id));
            Ok(())
        }

        async fn timeout_member(
            &self,
            guild_id: u64,
            user_id: u64,
            until: DateTime<Utc>,
        ) -> Result<(), Error> {
            if self.fail_timeout {
                return Err(Self::denied());
            }
            self.timeouts.lock().unwrap().push((guild_id, user_id, until));
            Ok(())
        }

        async fn remove_timeout(&self, _guild_id: u64, _user_id: u64) -> Result<(), Error> {
            self.timeout_removals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn kick_member(
            &self,
            guild_id: u64,
            user_id: u64,
            reason: &str,
        ) -> Result<(), Error> {
            if self.fail_kick {
                return Err(Self::denied());
            }
            self.kicks
                .lock()
                .unwrap()
                .push((guild_id, user_id, reason.to_string()));
            Ok(())
        }

        async fn ban_member(
            &self,
            guild_id: u64,
            user_id: u64,
            reason: &str,
        ) -> Result<(), Error> {
            if self.fail_ban {
                return Err(Self::denied());
            }
            self.bans
                .lock()
                .unwrap()
                .push((guild_id, user_id, reason.to_string()));
            Ok(())
        }

        async fn send_direct_message(
            &self,
            _user_id: u64,
            _embed: CreateEmbed,
        ) -> Result<(), Error> {
            self.dms.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_channel_message(
            &self,
            channel_id: u64,
            _embed: CreateEmbed,
        ) -> Result<u64, Error> {
            self.channel_messages.lock().unwrap().push(channel_id);
            Ok(1)
        }

        async fn purge_messages(
            &self,
            channel_id: u64,
            count: u8,
            _only_from: Option<u64>,
        ) -> Result<usize, Error> {
            self.purges.lock().unwrap().push((channel_id, count));
            Ok(count as usize)
        }
    }
}
