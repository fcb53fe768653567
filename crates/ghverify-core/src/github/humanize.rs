//! Human-readable counts and relative times.

use chrono::{DateTime, Utc};

/// `999` -> "999", `1500` -> "1.5k", `2_500_000` -> "2.5M".
pub fn humanize_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Coarse "time since" label. Months are 30 days, years 12 months; every
/// bucket floors.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    if secs < 3_600 {
        return format!("{} minutes ago", secs / 60);
    }
    if secs < 86_400 {
        return format!("{} hours ago", secs / 3_600);
    }
    let days = secs / 86_400;
    if days < 30 {
        return format!("{days} days ago");
    }
    let months = days / 30;
    if months < 12 {
        return format!("{months} months ago");
    }
    format!("{} years ago", months / 12)
}
