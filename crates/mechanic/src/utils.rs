//! Formatting helpers shared across CLI commands

use chrono::Duration;

/// Shorten text to at most `max` characters, ending with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Human-readable age ("2 minutes", "1 hour")
pub fn format_age(age: Duration) -> String {
    let (value, unit) = if age.num_days() > 0 {
        (age.num_days(), "day")
    } else if age.num_hours() > 0 {
        (age.num_hours(), "hour")
    } else if age.num_minutes() > 0 {
        (age.num_minutes(), "minute")
    } else {
        (age.num_seconds().max(0), "second")
    };

    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}
