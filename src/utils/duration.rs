use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bot::error::Error;
use crate::constants::defaults::MAX_TIMEOUT_SECS;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+)\s*([smhd])$").unwrap());

/// Parse a human duration like `30s`, `10m`, `1h` or `7d`.
///
/// Discord caps timeouts at 28 days, so anything longer is rejected up
/// front instead of failing at the API.
pub fn parse_duration(input: &str) -> Result<Duration, Error> {
    let input = input.trim();
    let captures = DURATION_RE
        .captures(input)
        .ok_or_else(|| Error::InvalidDuration(input.to_string()))?;

    let value: u64 = captures[1]
        .parse()
        .map_err(|_| Error::InvalidDuration(input.to_string()))?;

    let multiplier = match captures[2].to_ascii_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => unreachable!("regex only matches smhd"),
    };

    let secs = value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidDuration(input.to_string()))?;

    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(Error::InvalidDuration(input.to_string()));
    }

    Ok(Duration::from_secs(secs))
}

/// Render a duration the way moderators typed it: `1d 2h 30m 15s`, largest
/// units first, zero components omitted.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }

    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(7 * 86400));
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        assert_eq!(parse_duration(" 2H ").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("5 m").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m10").is_err());
        assert!(parse_duration("1.5h").is_err());
    }

    #[test]
    fn test_parse_rejects_zero_and_over_cap() {
        assert!(parse_duration("0s").is_err());
        // 28 days is the platform's timeout ceiling
        assert!(parse_duration("28d").is_ok());
        assert!(parse_duration("29d").is_err());
        assert!(parse_duration("99999999999999999999d").is_err());
    }

    #[test]
    fn test_format_compound() {
        assert_eq!(format_duration(Duration::from_secs(600)), "10m");
        assert_eq!(format_duration(Duration::from_secs(3600 + 1800)), "1h 30m");
        assert_eq!(format_duration(Duration::from_secs(86400 + 61)), "1d 1m 1s");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_parse_format_agree() {
        let d = parse_duration("90m").unwrap();
        assert_eq!(format_duration(d), "1h 30m");
    }
}
