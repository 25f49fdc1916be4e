use std::fs;
use std::time::Duration;

use serde::Deserialize;

use crate::bot::error::Error;
use crate::constants::defaults;

/// Per-server moderation behavior, loaded once at startup and immutable
/// afterwards. Components receive a reference at construction so tests can
/// inject arbitrary thresholds without touching process state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModerationConfig {
    /// Terms removed on sight (matched case-insensitively on word boundaries)
    pub word_filter: Vec<String>,
    /// Domains that never trigger the link filter
    pub link_allowlist: Vec<String>,
    /// Messages allowed inside the spam window before a burst verdict
    pub spam_threshold: u32,
    /// Sliding window length in seconds
    pub spam_interval_secs: u64,
    /// Channel that receives the audit embeds; 0 disables mod-log posting
    pub mod_log_channel: u64,
    /// Warning count (within the lookback) that upgrades a warn to a mute
    pub escalation_mute_threshold: u32,
    /// Warning count that upgrades a warn to a kick
    pub escalation_kick_threshold: u32,
    /// How far back warnings count toward escalation; 0 means forever
    pub escalation_lookback_days: u32,
    /// Length of an escalation mute in seconds
    pub escalation_mute_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            word_filter: Vec::new(),
            link_allowlist: Vec::new(),
            spam_threshold: defaults::DEFAULT_SPAM_THRESHOLD,
            spam_interval_secs: defaults::DEFAULT_SPAM_INTERVAL_SECS,
            mod_log_channel: 0,
            escalation_mute_threshold: defaults::DEFAULT_ESCALATION_MUTE_THRESHOLD,
            escalation_kick_threshold: defaults::DEFAULT_ESCALATION_KICK_THRESHOLD,
            escalation_lookback_days: defaults::DEFAULT_ESCALATION_LOOKBACK_DAYS,
            escalation_mute_secs: defaults::DEFAULT_ESCALATION_MUTE_SECS,
        }
    }
}

impl ModerationConfig {
    /// Load from a JSON file, or fall back to defaults when no path is given.
    /// Validation failures are fatal at startup, never per message.
    pub fn load(path: Option<&str>) -> Result<Self, Error> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("cannot read {}: {}", path, e)))?;
                serde_json::from_str::<ModerationConfig>(&raw)
                    .map_err(|e| Error::Config(format!("malformed {}: {}", path, e)))?
            }
            None => ModerationConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.spam_threshold == 0 {
            return Err(Error::Config("spam_threshold must be at least 1".into()));
        }
        if self.spam_interval_secs == 0 {
            return Err(Error::Config("spam_interval_secs must be at least 1".into()));
        }
        if self.escalation_mute_threshold == 0 || self.escalation_kick_threshold == 0 {
            return Err(Error::Config("escalation thresholds must be at least 1".into()));
        }
        if self.escalation_kick_threshold <= self.escalation_mute_threshold {
            return Err(Error::Config(
                "escalation_kick_threshold must exceed escalation_mute_threshold".into(),
            ));
        }
        if self.word_filter.iter().any(|w| w.trim().is_empty()) {
            return Err(Error::Config("word_filter contains an empty term".into()));
        }
        Ok(())
    }

    pub fn spam_interval(&self) -> Duration {
        Duration::from_secs(self.spam_interval_secs)
    }

    pub fn escalation_mute(&self) -> Duration {
        Duration::from_secs(self.escalation_mute_secs)
    }

    /// Earliest timestamp still counted toward escalation, or `None` when
    /// the lookback is unbounded.
    pub fn escalation_cutoff(&self, now: chrono::DateTime<chrono::Utc>) -> Option<chrono::DateTime<chrono::Utc>> {
        if self.escalation_lookback_days == 0 {
            None
        } else {
            Some(now - chrono::Duration::days(self.escalation_lookback_days as i64))
        }
    }
}
