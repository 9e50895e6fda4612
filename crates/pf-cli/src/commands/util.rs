//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(second|minute|hour|day)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 1000 * 365 * 24 * 60 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z", "2026-01-15T10:30:00" (taken as UTC)
/// - Relative: "30 seconds ago", "5 minutes ago", "2 hours ago", "1 day ago"
///
/// `now` anchors relative values.
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = pf_core::parse_timestamp(s) {
        return Ok(dt);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s.trim()) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '5 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::seconds(n * seconds_per_unit))
}

/// Formats a dwell duration in seconds for display.
///
/// Durations of a minute or more are split into minutes and seconds.
/// Rounding to tenths happens first, so 59.96 prints as `1m 0.0s`.
pub fn format_dwell(secs: f64) -> String {
    let tenths = (secs * 10.0).round();
    if tenths < 600.0 {
        return format!("{:.1}s", tenths / 10.0);
    }
    let minutes = (tenths / 600.0).floor();
    let rest = (tenths - minutes * 600.0) / 10.0;
    format!("{minutes:.0}m {rest:.1}s")
}
