use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::{ModerationConfig, Settings};
use crate::db::store::ModerationStore;
use crate::services::automod::filter::ContentFilter;
use crate::services::automod::rate_tracker::RateTracker;
use crate::services::platform::Platform;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    pub config: Arc<ModerationConfig>,
    pub store: Arc<dyn ModerationStore>,
    pub platform: Arc<dyn Platform>,
    pub filter: ContentFilter,
    pub rate_tracker: RateTracker,
    /// Per-member locks: (guild_id, user_id) -> mutex held across the
    /// warning-count read and the enforcement that follows it, so two
    /// near-simultaneous violations cannot both act on a stale count.
    member_locks: DashMap<(u64, u64), Arc<Mutex<()>>>,
    bot_user_id: AtomicU64,
}

impl Data {
    pub fn new(
        settings: Settings,
        config: Arc<ModerationConfig>,
        store: Arc<dyn ModerationStore>,
        platform: Arc<dyn Platform>,
        filter: ContentFilter,
    ) -> Self {
        let rate_tracker = RateTracker::new(config.spam_threshold, config.spam_interval());
        Self {
            settings,
            config,
            store,
            platform,
            filter,
            rate_tracker,
            member_locks: DashMap::new(),
            bot_user_id: AtomicU64::new(0),
        }
    }

    /// Lock guarding the count-read -> decide -> enforce sequence for one
    /// member. Cloned out of the map so the DashMap shard lock is not held
    /// across awaits.
    pub fn member_lock(&self, guild_id: u64, user_id: u64) -> Arc<Mutex<()>> {
        self.member_locks
            .entry((guild_id, user_id))
            .or_default()
            .clone()
    }

    pub fn set_bot_user_id(&self, id: u64) {
        self.bot_user_id.store(id, Ordering::SeqCst);
    }

    /// Drop lock entries nobody holds. A strong count of 1 means only the
    /// map itself still references the mutex; the DashMap shard lock keeps
    /// this from racing a concurrent `member_lock` clone. Returns how many
    /// were removed.
    pub fn sweep_member_locks(&self) -> usize {
        let before = self.member_locks.len();
        self.member_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.member_locks.len()
    }

    pub fn bot_user_id(&self) -> u64 {
        self.bot_user_id.load(Ordering::SeqCst)
    }

    pub fn is_self(&self, user_id: u64) -> bool {
        self.bot_user_id() == user_id
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("tracked_members", &self.rate_tracker.tracked_members())
            .field("member_locks", &self.member_locks.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::testing::MemoryStore;
    use crate::services::platform::testing::MockPlatform;

    fn data() -> Data {
        let config = Arc::new(ModerationConfig::default());
        let filter = ContentFilter::new(&config).unwrap();
        Data::new(
            Settings {
                discord_token: String::new(),
                database_url: String::new(),
                guild_id: None,
                moderation_config_path: None,
            },
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MockPlatform::new()),
            filter,
        )
    }

    #[test]
    fn test_member_lock_reused_for_same_member() {
        let d = data();
        let a = d.member_lock(1, 2);
        let b = d.member_lock(1, 2);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_idle_member_locks_swept() {
        let d = data();
        let held = d.member_lock(1, 2);
        d.member_lock(1, 3); // dropped immediately
        assert_eq!(d.member_locks.len(), 2);

        // Only the unheld entry goes; the held one survives the sweep
        assert_eq!(d.sweep_member_locks(), 1);
        assert_eq!(d.member_locks.len(), 1);

        drop(held);
        assert_eq!(d.sweep_member_locks(), 1);
        assert!(d.member_locks.is_empty());
    }
}
