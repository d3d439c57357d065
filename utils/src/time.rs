//! Time formatting helpers.

use std::time::Duration;

/// Format a duration in seconds to a human-readable string.
pub fn format_secs(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Like [`format_secs`], with millisecond precision under a minute.
pub fn format_duration(d: Duration) -> String {
    if d.as_secs() < 60 {
        format!("{:.3}s", d.as_secs_f64())
    } else {
        format_secs(d.as_secs())
    }
}
