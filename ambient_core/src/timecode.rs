// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cue timestamp decoding.
//!
//! Thumbnail tracks use `H+:MM:SS(.fff)?` timestamps. Decoding is lenient in
//! the same way a browser's `parseFloat` is: each component contributes its
//! leading numeric prefix, and surrounding garbage is ignored.

use alloc::format;
use alloc::string::String;

/// Decodes `H+:MM:SS(.fff)?` into seconds.
///
/// Exactly three `:`-separated components are required; any other component
/// count yields `0.0`. This is a defined fallback, not an error: callers see a
/// zeroed timestamp rather than a failure. A component with no numeric prefix
/// makes the whole result `NaN`.
#[must_use]
pub fn parse_timestamp(text: &str) -> f64 {
    let mut parts = text.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return 0.0;
    };
    let hours = leading_float(h).unwrap_or(f64::NAN);
    let minutes = leading_float(m).unwrap_or(f64::NAN);
    let seconds = leading_float(s).unwrap_or(f64::NAN);
    hours * 3600.0 + minutes * 60.0 + seconds
}

/// Formats seconds as `HH:MM:SS.mmm`.
///
/// Negative and non-finite inputs format as zero.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "non-negative finite seconds; millisecond count fits in u64"
    )]
    let total_ms = (seconds * 1000.0 + 0.5) as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{ms:03}",
        total_s / 3600,
        (total_s / 60) % 60,
        total_s % 60
    )
}

/// Parses the longest decimal prefix of `text` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent. Returns `None` when no digit is present.
pub(crate) fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    text[..end].parse().ok()
}

/// Parses the leading unsigned integer of `text` after leading whitespace.
pub(crate) fn leading_uint(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits = count_digits(text.as_bytes());
    if digits == 0 {
        return None;
    }
    text[..digits].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_components_are_a_weighted_sum() {
        assert_eq!(parse_timestamp("00:00:00.000"), 0.0);
        assert_eq!(parse_timestamp("00:00:01.000"), 1.0);
        assert_eq!(parse_timestamp("01:02:03.500"), 3723.5);
        assert_eq!(parse_timestamp("100:00:00"), 360_000.0);
    }

    #[test]
    fn field_width_is_not_enforced() {
        assert_eq!(parse_timestamp("0:5:7"), 307.0);
        assert_eq!(parse_timestamp(" 00:01:30.25 "), 90.25);
    }

    #[test]
    fn other_component_counts_yield_zero() {
        assert_eq!(parse_timestamp(""), 0.0);
        assert_eq!(parse_timestamp("12.5"), 0.0);
        assert_eq!(parse_timestamp("01:30.000"), 0.0);
        assert_eq!(parse_timestamp("00:00:00:01"), 0.0);
    }

    #[test]
    fn non_numeric_component_is_nan() {
        assert!(parse_timestamp("aa:00:01").is_nan());
        assert!(parse_timestamp("00::01").is_nan());
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        assert_eq!(parse_timestamp("00:00:02.000 line 3"), 2.0);
        // A cue setting with its own `:` changes the component count.
        assert_eq!(parse_timestamp("00:00:02.000 align:start"), 0.0);
    }

    #[test]
    fn leading_float_matches_parse_float_prefixes() {
        assert_eq!(leading_float("1.5abc"), Some(1.5));
        assert_eq!(leading_float("-2"), Some(-2.0));
        assert_eq!(leading_float(".25"), Some(0.25));
        assert_eq!(leading_float("3."), Some(3.0));
        assert_eq!(leading_float("1e3x"), Some(1000.0));
        assert_eq!(leading_float("1ex"), Some(1.0));
        assert_eq!(leading_float("."), None);
        assert_eq!(leading_float("x1"), None);
    }

    #[test]
    fn leading_uint_stops_at_first_non_digit() {
        assert_eq!(leading_uint("160px"), Some(160));
        assert_eq!(leading_uint(" 7"), Some(7));
        assert_eq!(leading_uint("-1"), None);
        assert_eq!(leading_uint(""), None);
    }

    #[test]
    fn format_round_trips_whole_milliseconds() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(3723.5), "01:02:03.500");
        assert_eq!(format_timestamp(-4.0), "00:00:00.000");
        assert_eq!(parse_timestamp(&format_timestamp(61.125)), 61.125);
    }
}
