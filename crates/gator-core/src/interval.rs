//! Parsing of `agg` polling intervals such as `30s`, `1m30s` or `1.5h`.
//!
//! Accepts a sequence of `<number><unit>` pairs where the number may carry a
//! decimal fraction and the unit is one of `ns`, `us`, `µs`, `ms`, `s`, `m`,
//! `h`. The total must be strictly positive.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("interval is empty")]
    Empty,

    #[error("invalid interval \"{input}\": {reason}")]
    Invalid { input: String, reason: String },

    #[error("interval must be greater than zero")]
    NotPositive,
}

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

/// Parse a duration string into a [`Duration`].
///
/// # Errors
///
/// Returns [`IntervalError::Empty`] for blank input,
/// [`IntervalError::Invalid`] for a malformed or unit-less component, and
/// [`IntervalError::NotPositive`] when the total is zero.
pub fn parse_interval(input: &str) -> Result<Duration, IntervalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IntervalError::Empty);
    }

    let invalid = |reason: &str| IntervalError::Invalid {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let mut rest = trimmed;
    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid("expected a number"));
        }
        let (number, after_number) = rest.split_at(number_len);

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid("malformed number"));
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remaining) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| invalid(&format!("unknown unit \"{unit}\"")))?;

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("number too large"))?
        };
        let mut component = whole_value
            .checked_mul(scale)
            .ok_or_else(|| invalid("interval too large"))?;

        // Fractional digits beyond nanosecond precision are dropped.
        let mut divisor: u128 = 1;
        for digit in fraction.chars().take(18) {
            divisor *= 10;
            let value = u128::from(digit.to_digit(10).unwrap_or(0));
            component += value * scale / divisor;
        }

        total_nanos = total_nanos
            .checked_add(component)
            .ok_or_else(|| invalid("interval too large"))?;
        rest = remaining;
    }

    if total_nanos == 0 {
        return Err(IntervalError::NotPositive);
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).map_err(|_| invalid("interval too large"))?;
    let nanos = u32::try_from(total_nanos % 1_000_000_000).unwrap_or(0);
    Ok(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_interval("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_interval("15us").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_interval("15µs").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_interval("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn parses_compound_intervals() {
        assert_eq!(parse_interval("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(
            parse_interval("1h2m3s").unwrap(),
            Duration::from_secs(3600 + 120 + 3)
        );
        assert_eq!(
            parse_interval("1s500ms").unwrap(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("2.25m").unwrap(), Duration::from_secs(135));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_interval(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_interval("").unwrap_err(), IntervalError::Empty);
        assert_eq!(parse_interval("   ").unwrap_err(), IntervalError::Empty);
    }

    #[test]
    fn rejects_missing_unit() {
        assert!(matches!(
            parse_interval("60"),
            Err(IntervalError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_unknown_unit() {
        let err = parse_interval("3d").unwrap_err();
        assert!(err.to_string().contains("unknown unit"), "got: {err}");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("1m-30s").is_err());
        assert!(parse_interval("1..5s").is_err());
        assert!(parse_interval(".s").is_err());
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(parse_interval("0s").unwrap_err(), IntervalError::NotPositive);
        assert_eq!(
            parse_interval("0m0s").unwrap_err(),
            IntervalError::NotPositive
        );
    }
}
