//! Display helpers shared by every front-end.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::LeadStatus;

/// Default long date format: `January 15, 2024`.
pub const LONG_DATE: &str = "%B %-d, %Y";

/// `$15,000`, `$1,234.5`, `$10.99`: US dollars, 0-2 fraction digits.
pub fn format_currency(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let dollars = group_thousands(amount.dollars().unsigned_abs());

    match amount.cents_part() {
        0 => format!("{sign}${dollars}"),
        cents if cents % 10 == 0 => format!("{sign}${dollars}.{}", cents / 10),
        cents => format!("{sign}${dollars}.{cents:02}"),
    }
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(",")
}

/// Formats a timestamp with a chrono format string, e.g. [`LONG_DATE`].
pub fn format_date(at: DateTime<Utc>, fmt: &str) -> String {
    at.format(fmt).to_string()
}

/// "Today", "Yesterday", "3 days ago", "2 weeks ago", else `Jan 5, 2024`.
///
/// Day counts are whole 24-hour periods between `at` and `now`.
pub fn format_relative_date(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - at).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days / 7),
        _ => at.format("%b %-d, %Y").to_string(),
    }
}

/// Cuts `text` to `max_len` characters, the last three being `...`.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// `"hELLO"` → `"Hello"`.
pub fn capitalize_first_letter(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Badge colour for a status.
pub fn status_color(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "#2196F3",
        LeadStatus::Contacted => "#FF9800",
        LeadStatus::Converted => "#4CAF50",
        LeadStatus::Lost => "#F44336",
    }
}

/// Material icon name for a status.
pub fn status_icon(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "fiber-new",
        LeadStatus::Contacted => "phone",
        LeadStatus::Converted => "check-circle",
        LeadStatus::Lost => "cancel",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_dollars(15_000)), "$15,000");
        assert_eq!(format_currency(Money::from_dollars(135_000)), "$135,000");
        assert_eq!(format_currency(Money::from_cents(123_450)), "$1,234.5");
        assert_eq!(format_currency(Money::from_cents(1099)), "$10.99");
        assert_eq!(format_currency(Money::from_cents(5)), "$0.05");
        assert_eq!(format_currency(Money::from_cents(-550)), "-$5.5");
        assert_eq!(format_currency(Money::from_dollars(1_000_000)), "$1,000,000");
        assert_eq!(format_currency(Money::zero()), "$0");
    }

    #[test]
    fn test_format_relative_date() {
        let now: DateTime<Utc> = "2024-03-01T12:00:00Z".parse().unwrap();
        assert_eq!(format_relative_date(now - Duration::hours(3), now), "Today");
        assert_eq!(format_relative_date(now - Duration::days(1), now), "Yesterday");
        assert_eq!(format_relative_date(now - Duration::days(4), now), "4 days ago");
        assert_eq!(format_relative_date(now - Duration::days(15), now), "2 weeks ago");

        let old: DateTime<Utc> = "2024-01-15T10:00:00Z".parse().unwrap();
        assert_eq!(format_relative_date(old, now), "Jan 15, 2024");
    }

    #[test]
    fn test_format_date() {
        let at: DateTime<Utc> = "2024-01-05T10:00:00Z".parse().unwrap();
        assert_eq!(format_date(at, LONG_DATE), "January 5, 2024");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(
            truncate_text("Complete website overhaul", 12),
            "Complete ..."
        );
    }

    #[test]
    fn test_capitalize_first_letter() {
        assert_eq!(capitalize_first_letter("hELLO"), "Hello");
        assert_eq!(capitalize_first_letter(""), "");
    }

    #[test]
    fn test_status_lookups() {
        assert_eq!(status_color(LeadStatus::Converted), "#4CAF50");
        assert_eq!(status_icon(LeadStatus::Lost), "cancel");
    }
}
