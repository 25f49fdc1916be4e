use std::time::Duration;

use crate::config::ModerationConfig;
use crate::services::automod::filter::Violation;
use crate::services::automod::rate_tracker::RateVerdict;

/// A manually issued moderator command. Commands bypass detection and the
/// escalation overlay entirely: the moderator gets exactly what they asked
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModCommand {
    Kick,
    Ban,
    Mute(Duration),
    Warn,
    Purge(u8),
}

/// The enforcement a decision resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanction {
    Warn,
    Mute(Duration),
    Kick,
    Ban,
}

/// Output of the decision policy. `record_warning` marks decisions whose
/// base action was a warn, so the executor persists the WarningRecord even
/// when escalation upgraded the sanction to a mute or kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub delete_message: bool,
    pub record_warning: bool,
    pub sanction: Option<Sanction>,
    pub purge: Option<u8>,
}

impl Decision {
    pub const NONE: Decision = Decision {
        delete_message: false,
        record_warning: false,
        sanction: None,
        purge: None,
    };

    pub fn is_none(&self) -> bool {
        *self == Decision::NONE
    }
}

/// Map detections (or a manual command) to an enforcement action.
///
/// Pure function over its inputs: identical (violations, verdict, prior
/// warning count, command) always yields the identical decision. All state
/// it needs, including the escalation count, arrives as an argument.
pub fn decide(
    violations: &[Violation],
    rate_verdict: RateVerdict,
    prior_warnings: i64,
    command: Option<ModCommand>,
    config: &ModerationConfig,
) -> Decision {
    // Manual commands short-circuit: no detection input, no escalation.
    if let Some(command) = command {
        return match command {
            ModCommand::Kick => Decision {
                sanction: Some(Sanction::Kick),
                ..Decision::NONE
            },
            ModCommand::Ban => Decision {
                sanction: Some(Sanction::Ban),
                ..Decision::NONE
            },
            ModCommand::Mute(duration) => Decision {
                sanction: Some(Sanction::Mute(duration)),
                ..Decision::NONE
            },
            ModCommand::Warn => Decision {
                record_warning: true,
                sanction: Some(Sanction::Warn),
                ..Decision::NONE
            },
            ModCommand::Purge(count) => Decision {
                purge: Some(count),
                ..Decision::NONE
            },
        };
    }

    let spam = !matches!(rate_verdict, RateVerdict::Ok);
    if violations.is_empty() && !spam {
        return Decision::NONE;
    }

    // Base action for any violation: delete the message and warn, then let
    // the escalation overlay upgrade the warn if this member keeps at it.
    let sanction = escalate(prior_warnings + 1, config);

    Decision {
        delete_message: true,
        record_warning: true,
        sanction: Some(sanction),
        purge: None,
    }
}

/// Escalation overlay: upgrade a warn based on what the warning count will
/// be once this warning lands. Kick outranks mute.
fn escalate(count_after_warning: i64, config: &ModerationConfig) -> Sanction {
    if count_after_warning >= config.escalation_kick_threshold as i64 {
        Sanction::Kick
    } else if count_after_warning >= config.escalation_mute_threshold as i64 {
        Sanction::Mute(config.escalation_mute())
    } else {
        Sanction::Warn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModerationConfig {
        ModerationConfig::default()
    }

    fn banned_word() -> Vec<Violation> {
        vec![Violation::BannedWord {
            matched: "heck".into(),
        }]
    }

    #[test]
    fn test_no_input_no_action() {
        let d = decide(&[], RateVerdict::Ok, 0, None, &config());
        assert!(d.is_none());
    }

    #[test]
    fn test_violation_deletes_and_warns() {
        let d = decide(&banned_word(), RateVerdict::Ok, 0, None, &config());
        assert!(d.delete_message);
        assert!(d.record_warning);
        assert_eq!(d.sanction, Some(Sanction::Warn));
    }

    #[test]
    fn test_spam_burst_deletes_and_warns() {
        let d = decide(&[], RateVerdict::SpamBurst { count: 6 }, 0, None, &config());
        assert!(d.delete_message);
        assert_eq!(d.sanction, Some(Sanction::Warn));
    }

    #[test]
    fn test_third_warning_upgrades_to_mute() {
        // Two prior warnings; this one makes three
        let d = decide(&banned_word(), RateVerdict::Ok, 2, None, &config());
        assert!(d.record_warning, "warning is still recorded when upgraded");
        assert_eq!(
            d.sanction,
            Some(Sanction::Mute(Duration::from_secs(10 * 60)))
        );
    }

    #[test]
    fn test_fifth_warning_upgrades_to_kick() {
        let d = decide(&banned_word(), RateVerdict::Ok, 4, None, &config());
        assert_eq!(d.sanction, Some(Sanction::Kick));
    }

    #[test]
    fn test_kick_threshold_outranks_mute_threshold() {
        // Way past both thresholds: kick, not mute
        let d = decide(&banned_word(), RateVerdict::Ok, 10, None, &config());
        assert_eq!(d.sanction, Some(Sanction::Kick));
    }

    #[test]
    fn test_custom_thresholds_respected() {
        let config = ModerationConfig {
            escalation_mute_threshold: 2,
            escalation_kick_threshold: 4,
            escalation_mute_secs: 60,
            ..Default::default()
        };
        let d = decide(&banned_word(), RateVerdict::Ok, 1, None, &config);
        assert_eq!(d.sanction, Some(Sanction::Mute(Duration::from_secs(60))));
    }

    #[test]
    fn test_manual_command_bypasses_escalation() {
        // Even with many prior warnings, a manual warn stays a warn
        let d = decide(&[], RateVerdict::Ok, 99, Some(ModCommand::Warn), &config());
        assert_eq!(d.sanction, Some(Sanction::Warn));
        assert!(d.record_warning);
        assert!(!d.delete_message);
    }

    #[test]
    fn test_manual_ban_is_exactly_a_ban() {
        let d = decide(
            &banned_word(),
            RateVerdict::SpamBurst { count: 9 },
            3,
            Some(ModCommand::Ban),
            &config(),
        );
        assert_eq!(d.sanction, Some(Sanction::Ban));
        assert!(!d.record_warning);
        assert!(!d.delete_message);
    }

    #[test]
    fn test_manual_purge() {
        let d = decide(&[], RateVerdict::Ok, 0, Some(ModCommand::Purge(25)), &config());
        assert_eq!(d.purge, Some(25));
        assert!(d.sanction.is_none());
    }

    #[test]
    fn test_decide_is_pure() {
        let inputs = (
            banned_word(),
            RateVerdict::SpamDuplicate { repeats: 2 },
            2,
            None,
        );
        let a = decide(&inputs.0, inputs.1, inputs.2, inputs.3, &config());
        let b = decide(&inputs.0, inputs.1, inputs.2, inputs.3, &config());
        assert_eq!(a, b);
    }
}
