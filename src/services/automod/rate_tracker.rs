use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::time::interval;
use tracing::debug;

use crate::bot::data::Data;
use crate::constants::defaults::WINDOW_REAP_MULTIPLIER;

/// Verdict for a single recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateVerdict {
    Ok,
    SpamBurst { count: usize },
    SpamDuplicate { repeats: usize },
}

/// Recent (timestamp, content-hash) pairs for one member. Only ever touched
/// through the owning DashMap entry, which serializes access per key.
struct MemberActivityWindow {
    entries: VecDeque<(Instant, u64)>,
    last_seen: Instant,
}

impl MemberActivityWindow {
    fn new(now: Instant) -> Self {
        Self {
            entries: VecDeque::new(),
            last_seen: now,
        }
    }

    /// Drop entries older than the window. Called on every access, so the
    /// window never holds anything older than the interval.
    fn evict(&mut self, now: Instant, interval: Duration) {
        while let Some((t, _)) = self.entries.front() {
            if now.duration_since(*t) > interval {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Per-member sliding-window spam detector. Windows are created lazily on
/// first message and reaped once the member has been idle for
/// `interval * WINDOW_REAP_MULTIPLIER`. Reaping is advisory: losing a
/// window only forgets best-effort spam signal, never audit state.
pub struct RateTracker {
    windows: DashMap<(u64, u64), MemberActivityWindow>,
    threshold: u32,
    interval: Duration,
}

impl RateTracker {
    pub fn new(threshold: u32, interval: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            threshold,
            interval,
        }
    }

    /// Record one message and classify it. Burst takes precedence over
    /// duplicate when both hold, since burst is the stronger signal.
    pub fn record(&self, guild_id: u64, user_id: u64, now: Instant, content_hash: u64) -> RateVerdict {
        let mut window = self
            .windows
            .entry((guild_id, user_id))
            .or_insert_with(|| MemberActivityWindow::new(now));

        window.evict(now, self.interval);
        window.entries.push_back((now, content_hash));
        window.last_seen = now;

        let count = window.entries.len();
        if count > self.threshold as usize {
            return RateVerdict::SpamBurst { count };
        }

        let repeats = window
            .entries
            .iter()
            .take(count - 1)
            .filter(|(_, h)| *h == content_hash)
            .count();
        if repeats >= 2 {
            return RateVerdict::SpamDuplicate { repeats };
        }

        RateVerdict::Ok
    }

    /// Drop windows for members who have gone quiet. Returns how many were
    /// removed.
    pub fn sweep_idle(&self, now: Instant) -> usize {
        let idle_cutoff = self.interval * WINDOW_REAP_MULTIPLIER;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.last_seen) <= idle_cutoff);
        before - self.windows.len()
    }

    pub fn tracked_members(&self) -> usize {
        self.windows.len()
    }

    #[cfg(test)]
    fn window_len(&self, guild_id: u64, user_id: u64) -> usize {
        self.windows
            .get(&(guild_id, user_id))
            .map(|w| w.entries.len())
            .unwrap_or(0)
    }
}

/// Hash message content for duplicate detection.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Periodically reap idle activity windows to bound memory.
pub fn spawn_window_reaper(data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(data.config.spam_interval());

        loop {
            ticker.tick().await;

            let reaped = data.rate_tracker.sweep_idle(Instant::now());
            let released = data.sweep_member_locks();
            if reaped > 0 || released > 0 {
                debug!(
                    "Reaped {} idle activity windows and {} idle member locks",
                    reaped, released
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(threshold: u32, interval_secs: u64) -> RateTracker {
        RateTracker::new(threshold, Duration::from_secs(interval_secs))
    }

    #[test]
    fn test_sixth_message_triggers_burst() {
        let t = tracker(5, 10);
        let base = Instant::now();

        for i in 0..5 {
            let verdict = t.record(1, 2, base + Duration::from_secs(i), content_hash(&format!("m{}", i)));
            assert_eq!(verdict, RateVerdict::Ok, "message {} should pass", i);
        }
        let verdict = t.record(1, 2, base + Duration::from_secs(5), content_hash("m5"));
        assert_eq!(verdict, RateVerdict::SpamBurst { count: 6 });
    }

    #[test]
    fn test_window_never_exceeds_interval() {
        let t = tracker(5, 10);
        let base = Instant::now();

        t.record(1, 2, base, content_hash("a"));
        t.record(1, 2, base + Duration::from_secs(3), content_hash("b"));
        // 15s later the first two are outside the 10s window
        t.record(1, 2, base + Duration::from_secs(15), content_hash("c"));
        assert_eq!(t.window_len(1, 2), 1);
    }

    #[test]
    fn test_duplicate_detected_on_third_copy() {
        let t = tracker(10, 10);
        let base = Instant::now();
        let hash = content_hash("buy my stuff");

        assert_eq!(t.record(1, 2, base, hash), RateVerdict::Ok);
        assert_eq!(t.record(1, 2, base + Duration::from_secs(1), hash), RateVerdict::Ok);
        assert_eq!(
            t.record(1, 2, base + Duration::from_secs(2), hash),
            RateVerdict::SpamDuplicate { repeats: 2 }
        );
    }

    #[test]
    fn test_burst_takes_precedence_over_duplicate() {
        let t = tracker(3, 10);
        let base = Instant::now();
        let hash = content_hash("same");

        for i in 0..3 {
            t.record(1, 2, base + Duration::from_secs(i), hash);
        }
        // Fourth identical message trips both conditions; burst wins
        let verdict = t.record(1, 2, base + Duration::from_secs(3), hash);
        assert!(matches!(verdict, RateVerdict::SpamBurst { .. }));
    }

    #[test]
    fn test_members_tracked_independently() {
        let t = tracker(2, 10);
        let base = Instant::now();

        t.record(1, 2, base, content_hash("a"));
        t.record(1, 2, base, content_hash("b"));
        // A different member is unaffected by the first member's window
        assert_eq!(t.record(1, 3, base, content_hash("c")), RateVerdict::Ok);
        // The busy member trips the threshold
        assert!(matches!(
            t.record(1, 2, base + Duration::from_secs(1), content_hash("d")),
            RateVerdict::SpamBurst { .. }
        ));
    }

    #[test]
    fn test_idle_windows_reaped() {
        let t = tracker(5, 1);
        let base = Instant::now();

        t.record(1, 2, base, content_hash("a"));
        t.record(1, 3, base + Duration::from_secs(11), content_hash("b"));
        assert_eq!(t.tracked_members(), 2);

        // Member 2 has been idle for > interval * 10
        let reaped = t.sweep_idle(base + Duration::from_secs(12));
        assert_eq!(reaped, 1);
        assert_eq!(t.tracked_members(), 1);
    }

    #[test]
    fn test_content_hash_stable() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("world"));
    }
}
