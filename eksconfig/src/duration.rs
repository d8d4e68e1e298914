//! Duration text codec.
//!
//! Durations are persisted twice: as integer nanoseconds, and as a
//! human-readable twin such as `3m0s` or `1h30m0s`. This module renders and
//! parses that text form and provides the serde adapters for the integer form.

use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Renders a duration the way the persisted `*-string` fields expect.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use eksconfig::duration::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(180)), "3m0s");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m0s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// ```
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        return if nanos < NANOS_PER_MICRO {
            format!("{nanos}ns")
        } else if nanos < NANOS_PER_MILLI {
            format!("{}µs", with_fraction(nanos, NANOS_PER_MICRO, 3))
        } else {
            format!("{}ms", with_fraction(nanos, NANOS_PER_MILLI, 6))
        };
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let seconds = with_fraction(nanos % NANOS_PER_MIN, NANOS_PER_SEC, 9);

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `value / unit` with up to `digits` fractional digits, trailing zeros trimmed.
fn with_fraction(value: u128, unit: u128, digits: usize) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0digits$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Parses a duration string such as `30s`, `1h30m` or `1.5ms`.
///
/// Accepted units are `ns`, `us`, `µs`, `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted. Negative durations are rejected.
///
/// # Errors
///
/// Returns a human-readable message if the string is malformed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use eksconfig::duration::parse_duration;
///
/// assert_eq!(parse_duration("3m0s").unwrap(), Duration::from_secs(180));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let mut s = input.strip_prefix('+').unwrap_or(input);
    if s.starts_with('-') {
        return Err(format!("negative duration {input:?}"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(format!("invalid duration {input:?}"));
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, rest) = s.split_at(int_len);
        let (frac_part, rest) = match rest.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", rest),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid duration {input:?}"));
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let (unit, rest) = rest.split_at(unit_len);
        let unit_nanos = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => NANOS_PER_MIN,
            "h" => NANOS_PER_HOUR,
            "" => return Err(format!("missing unit in duration {input:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {input:?}")),
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| format!("invalid duration {input:?}"))?
        };
        total = whole
            .checked_mul(unit_nanos)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("invalid duration {input:?}"))?;

        if !frac_part.is_empty() {
            // Digits past nanosecond precision cannot contribute.
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = digits
                .parse()
                .map_err(|_| format!("invalid duration {input:?}"))?;
            let scale = 10u128.pow(u32::try_from(digits.len()).unwrap_or(18));
            total += numerator * unit_nanos / scale;
        }

        s = rest;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| format!("invalid duration {input:?}"))
}

/// Serde adapter storing a [`Duration`] as integer nanoseconds.
pub mod nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes the duration as nanoseconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    /// Deserializes nanoseconds into a duration.
    ///
    /// # Errors
    ///
    /// Fails if the input is not a non-negative integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_common_values() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m0s");
        assert_eq!(format_duration(Duration::from_secs(5 * 3600)), "5h0m0s");
        assert_eq!(format_duration(Duration::from_secs(3600 + 61)), "1h1m1s");
    }

    #[test]
    fn test_format_sub_second() {
        assert_eq!(format_duration(Duration::from_nanos(999)), "999ns");
        assert_eq!(format_duration(Duration::from_micros(5)), "5µs");
        assert_eq!(format_duration(Duration::from_nanos(1_500)), "1.5µs");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("100ns").unwrap(), Duration::from_nanos(100));
        assert_eq!(parse_duration("7us").unwrap(), Duration::from_micros(7));
        assert_eq!(parse_duration("7µs").unwrap(), Duration::from_micros(7));
        assert_eq!(parse_duration("20ms").unwrap(), Duration::from_millis(20));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("+5s").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(".5m").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1.m").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("1h 30m").is_err());
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_nanos_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "nanos")]
            d: Duration,
        }
        let yaml = serde_yaml::to_string(&Wrapper {
            d: Duration::from_secs(3),
        })
        .unwrap();
        assert_eq!(yaml.trim(), "d: 3000000000");
        let back: Wrapper = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.d, Duration::from_secs(3));
    }
}

#[cfg(test)]
#[allow(unused_doc_comments)] // proptest! macro doesn't support doc comments
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Property: rendered durations parse back to the same value
    ///
    /// Mathematical Property: For all d in [0, 2^40) ns,
    /// parse_duration(format_duration(d)) = d
    ///
    /// WHY THIS MATTERS: The `*-string` twin is regenerated from the machine
    /// value on every validation, and users feed the same text form back in
    /// through environment variables. The two must agree exactly.
    proptest! {
        #[test]
        fn prop_format_then_parse_is_identity(nanos in 0u64..(1u64 << 40)) {
            let d = Duration::from_nanos(nanos);
            let text = format_duration(d);
            prop_assert_eq!(parse_duration(&text).unwrap(), d, "text was {}", text);
        }
    }

    /// Property: whole-second durations never render a fractional part
    ///
    /// Mathematical Property: For all s in [1, 10^6] seconds,
    /// format_duration(s) contains no '.' and ends with 's'
    proptest! {
        #[test]
        fn prop_whole_seconds_have_no_fraction(secs in 1u64..1_000_000) {
            let text = format_duration(Duration::from_secs(secs));
            prop_assert!(!text.contains('.'));
            prop_assert!(text.ends_with('s'));
        }
    }
}
