/// Spam detection defaults (overridable via the moderation config file)
pub const DEFAULT_SPAM_THRESHOLD: u32 = 5;       // Messages inside the window before a burst verdict
pub const DEFAULT_SPAM_INTERVAL_SECS: u64 = 10;  // Sliding window length

/// Escalation defaults: Nth warning upgrades the action
pub const DEFAULT_ESCALATION_MUTE_THRESHOLD: u32 = 3;
pub const DEFAULT_ESCALATION_KICK_THRESHOLD: u32 = 5;
pub const DEFAULT_ESCALATION_LOOKBACK_DAYS: u32 = 0; // 0 = warnings count forever
pub const DEFAULT_ESCALATION_MUTE_SECS: u64 = 10 * 60;

/// Idle multiplier before a member's activity window is reaped
pub const WINDOW_REAP_MULTIPLIER: u32 = 10;

/// Discord caps timeouts at 28 days
pub const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

/// How long auto-mod notices stay in the channel before self-deleting
pub const NOTICE_DELETE_SECS: u64 = 5;

/// Upper bound for /purge
pub const MAX_PURGE_COUNT: u8 = 100;
