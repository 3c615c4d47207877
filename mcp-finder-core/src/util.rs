//! Small free helpers shared by the resolver, locator and presence report.

use chrono::{DateTime, Utc};

/// The fourth `/`-separated component of an absolute URL, i.e. the first
/// path segment: `https://tr.rbxcdn.com/<segment>/48/48/...`.
pub fn url_path_segment(url: &str) -> Option<&str> {
    url.split('/').nth(3).filter(|s| !s.is_empty())
}

/// Round to one decimal place.
fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Humanised time since `then`, e.g. `"3.5 Hour(s)"`.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_milliseconds() as f64 / 1000.0;
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;
    let years = days / 365.0;

    if minutes < 60.0 {
        format!("{} Minute(s)", one_decimal(minutes))
    } else if hours < 24.0 {
        format!("{} Hour(s)", one_decimal(hours))
    } else if days < 365.0 {
        format!("{} Day(s)", one_decimal(days))
    } else {
        format!("{} Year(s)", one_decimal(years))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_url_path_segment() {
        assert_eq!(
            url_path_segment("https://tr.rbxcdn.com/abc123/48/48/AvatarHeadshot/Png"),
            Some("abc123")
        );
        assert_eq!(url_path_segment("https://tr.rbxcdn.com/"), None);
        assert_eq!(url_path_segment("https://tr.rbxcdn.com"), None);
        assert_eq!(url_path_segment(""), None);
    }

    #[test]
    fn test_format_age_units() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::minutes(5), now), "5 Minute(s)");
        assert_eq!(format_age(now - Duration::minutes(90), now), "1.5 Hour(s)");
        assert_eq!(format_age(now - Duration::hours(36), now), "1.5 Day(s)");
        assert_eq!(format_age(now - Duration::days(730), now), "2 Year(s)");
    }

    #[test]
    fn test_format_age_rounds_to_one_decimal() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(100), now), "1.7 Minute(s)");
    }
}
