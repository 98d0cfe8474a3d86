use chrono::{DateTime, FixedOffset};

use crate::error::FeedError;

/// RFC 1123 with a numeric zone, e.g. `Wed, 01 Jan 2025 10:00:00 +0000`.
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The same layout after the `Wed, ` prefix.
const DATE_AFTER_WEEKDAY_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Parse an RSS `pubDate`, keeping the offset it was published with.
///
/// The weekday must be a valid abbreviation but is not checked against the
/// date, so `Thu, 01 Jan 2025 …` parses as 1 January. Only numeric zone
/// offsets are accepted. Textual zones such as `GMT` or `EST` are rejected
/// rather than guessed.
///
/// # Errors
///
/// Returns [`FeedError::TimeParse`] if `raw` does not match the format above
/// (surrounding whitespace is ignored).
pub fn normalize_pub_date(raw: &str) -> Result<DateTime<FixedOffset>, FeedError> {
    let trimmed = raw.trim();
    let parsed = match trimmed.split_once(", ") {
        Some((weekday, rest)) if is_weekday(weekday) => {
            DateTime::parse_from_str(rest, DATE_AFTER_WEEKDAY_FORMAT)
        }
        // No usable weekday: the full layout fails and yields the error.
        _ => DateTime::parse_from_str(trimmed, PUB_DATE_FORMAT),
    };

    parsed.map_err(|source| FeedError::TimeParse {
        value: raw.to_string(),
        source,
    })
}

fn is_weekday(s: &str) -> bool {
    WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn utc_offset_round_trips() {
        let parsed = normalize_pub_date("Wed, 01 Jan 2025 10:00:00 +0000").unwrap();
        assert_eq!(
            parsed.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(
            parsed.with_timezone(&Utc).to_rfc3339(),
            "2025-01-01T10:00:00+00:00"
        );
    }

    #[test]
    fn offset_is_preserved() {
        let parsed = normalize_pub_date("Mon, 21 Oct 2024 08:30:00 +0200").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(
            parsed.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 10, 21, 6, 30, 0).unwrap()
        );
    }

    #[test]
    fn negative_offset_can_cross_a_day_boundary() {
        let parsed = normalize_pub_date("Tue, 31 Dec 2024 22:00:00 -0500").unwrap();
        assert_eq!(
            parsed.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekday_is_not_checked_against_the_date() {
        // 1 January 2025 was a Wednesday.
        let parsed = normalize_pub_date("Thu, 01 Jan 2025 10:00:00 +0000").unwrap();
        assert_eq!(
            parsed.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn unknown_weekday_is_rejected() {
        let err = normalize_pub_date("Xyz, 01 Jan 2025 10:00:00 +0000").unwrap_err();
        assert!(matches!(err, FeedError::TimeParse { .. }));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(normalize_pub_date("  Wed, 01 Jan 2025 10:00:00 +0000\n").is_ok());
    }

    #[test]
    fn textual_zone_is_rejected() {
        let err = normalize_pub_date("Wed, 01 Jan 2025 10:00:00 GMT").unwrap_err();
        assert!(matches!(err, FeedError::TimeParse { .. }));
    }

    #[test]
    fn other_formats_are_rejected() {
        for raw in ["", "2025-01-01T10:00:00Z", "01 Jan 2025 10:00:00 +0000", "yesterday"] {
            let err = normalize_pub_date(raw).unwrap_err();
            assert!(
                matches!(err, FeedError::TimeParse { ref value, .. } if value == raw),
                "{raw:?} should fail, got {err:?}"
            );
        }
    }
}
