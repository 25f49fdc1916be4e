use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::bot::error::Error;
use crate::config::ModerationConfig;

/// Permissive URL matcher; anything that looks like a link is checked
/// against the allow-list.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()]+").unwrap());

/// A single auto-moderation finding. Carries the matched snippet for the
/// mod-log; violations are never persisted on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    BannedWord { matched: String },
    BannedLink { url: String },
    SpamBurst { count: usize },
    SpamDuplicate { repeats: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BannedWord { matched } => write!(f, "banned word \"{}\"", matched),
            Violation::BannedLink { url } => write!(f, "unapproved link {}", url),
            Violation::SpamBurst { count } => {
                write!(f, "message burst ({} in window)", count)
            }
            Violation::SpamDuplicate { repeats } => {
                write!(f, "repeated message ({} duplicates)", repeats)
            }
        }
    }
}

/// Stateless message classifier: banned terms and unapproved links.
/// All patterns are compiled once at construction; a bad filter list is a
/// startup error, never a per-message one.
pub struct ContentFilter {
    word_re: Option<Regex>,
    link_allowlist: Vec<String>,
}

impl ContentFilter {
    pub fn new(config: &ModerationConfig) -> Result<Self, Error> {
        let word_re = if config.word_filter.is_empty() {
            None
        } else {
            // Word-boundary anchors keep "ass" from matching "class"
            let alternation = config
                .word_filter
                .iter()
                .map(|w| regex::escape(w.trim()))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\b(?:{})\b", alternation);
            Some(
                Regex::new(&pattern)
                    .map_err(|e| Error::Config(format!("bad word filter: {}", e)))?,
            )
        };

        Ok(Self {
            word_re,
            link_allowlist: config
                .link_allowlist
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        })
    }

    /// Scan message text; returns zero or more violations. Pure and
    /// deterministic, no side effects.
    pub fn classify(&self, text: &str) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(re) = &self.word_re {
            for m in re.find_iter(text) {
                violations.push(Violation::BannedWord {
                    matched: m.as_str().to_lowercase(),
                });
            }
        }

        for m in URL_RE.find_iter(text) {
            let raw = m.as_str();
            if !self.is_allowlisted(raw) {
                violations.push(Violation::BannedLink {
                    url: raw.to_string(),
                });
            }
        }

        violations
    }

    fn is_allowlisted(&self, raw: &str) -> bool {
        let Some(host) = link_host(raw) else {
            // Unparseable link-looking text is still flagged
            return false;
        };
        self.link_allowlist
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }
}

fn link_host(raw: &str) -> Option<String> {
    let normalized = if raw.to_lowercase().starts_with("www.") {
        format!("https://{}", raw)
    } else {
        raw.to_string()
    };
    let parsed = Url::parse(&normalized).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}
