//! Scalar parsing and formatting shared by the RSS and Atom projections.
//!
//! The `try_parse_*` functions are best-effort: they return `None` on any
//! failure and never error. Callers that need a mandatory value turn `None`
//! into a [`FeedError::Format`](crate::FeedError::Format) themselves.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use url::Url;

/// Parses an absolute URI.
pub fn try_parse_uri(value: &str) -> Option<Url> {
    Url::parse(value.trim()).ok()
}

/// Parses `true`/`false`, ignoring ASCII case and surrounding whitespace.
pub fn try_parse_bool(value: &str) -> Option<bool> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("true") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn try_parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Parses an RFC 3339 or RFC 822/1123 date, keeping the original offset.
pub fn try_parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let v = value.trim();
    DateTime::parse_from_rfc3339(v)
        .or_else(|_| DateTime::parse_from_rfc2822(v))
        .ok()
}

/// Formats a date as RFC 3339 (`2017-07-06T20:25:00Z`).
pub fn format_rfc3339(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a date as RFC 1123 in GMT (`Thu, 06 Jul 2017 20:25:00 GMT`).
pub fn format_rfc1123(dt: &DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc822_with_gmt() {
        let dt = try_parse_datetime("Thu, 06 Jul 2017 20:25:00 GMT").unwrap();
        assert_eq!(format_rfc3339(&dt), "2017-07-06T20:25:00Z");
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let dt = try_parse_datetime("2017-07-06T22:25:00+02:00").unwrap();
        assert_eq!(format_rfc3339(&dt), "2017-07-06T22:25:00+02:00");
        assert_eq!(format_rfc1123(&dt), "Thu, 06 Jul 2017 20:25:00 GMT");
    }

    #[test]
    fn test_unparsable_values_are_none() {
        assert!(try_parse_datetime("yesterday").is_none());
        assert!(try_parse_uri("not a uri").is_none());
        assert!(try_parse_bool("yes").is_none());
        assert!(try_parse_u64("-1").is_none());
    }

    #[test]
    fn test_bool_is_case_insensitive() {
        assert_eq!(try_parse_bool(" TRUE "), Some(true));
        assert_eq!(try_parse_bool("False"), Some(false));
    }
}
