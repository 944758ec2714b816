//! Decimal rounding, compact number rendering and lenient numeric parsing.
//!
//! Exchange payloads carry numbers as strings (`"0.1234"`), sometimes as
//! empty strings for "not set". The serde helpers here accept either form.

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Round `value` to `decimals` places, ties toward positive infinity
/// (`Math.round(value * 10^n) / 10^n`).
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    let floor = scaled.floor();
    let whole = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    let rounded = whole / scale;
    // Avoid rendering "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round and render without trailing zeros: `1234.567` at 2 places -> `"1234.57"`,
/// `100.0` at 1 place -> `"100"`.
pub fn fmt_dp(value: f64, decimals: u32) -> String {
    round_dp(value, decimals).to_string()
}

/// Fixed-point text rounded from the exact binary value, exact ties away
/// from zero: `2.675` at 2 places -> `"2.67"`, `0.125` -> `"0.13"`.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Exact tie iff value is an odd multiple of 2^-(decimals + 1)
    let halves = value * 2f64.powi(decimals as i32 + 1);
    let is_tie = halves.fract() == 0.0 && halves % 2.0 != 0.0;
    if !is_tie {
        return format!("{:.*}", decimals, value);
    }

    // One more place renders exactly, ending in '5'
    let exact = format!("{:.*}", decimals + 1, value);
    let kept = exact[..exact.len() - 1].trim_end_matches('.');
    bump_last_digit(kept)
}

/// Add one unit in the last place, away from zero.
fn bump_last_digit(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    let start = usize::from(bytes.first() == Some(&b'-'));
    let mut i = bytes.len();
    while i > start {
        i -= 1;
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            _ => {
                bytes[i] += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    bytes.insert(start, b'1');
    String::from_utf8_lossy(&bytes).into_owned()
}

/// [`to_fixed`] without trailing zeros or a dangling point; `-0` renders `0`.
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    let fixed = to_fixed(value, decimals);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountOrText {
    Count(u64),
    Text(String),
}

fn parse_text<E: de::Error>(text: &str) -> Result<f64, E> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| E::custom(format!("invalid number: {:?}", text)))
}

/// Deserialize a required number sent either as JSON number or string.
pub fn f64_from_text<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => parse_text(&s),
    }
}

/// Deserialize an optional number; `null` and `""` both mean absent.
pub fn opt_f64_from_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => parse_text(&s).map(Some),
    }
}

/// Deserialize an optional non-negative count; `null` and `""` both mean absent.
pub fn opt_count_from_text<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CountOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CountOrText::Count(n)) => Ok(Some(n)),
        Some(CountOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(CountOrText::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid count: {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fmt_dp_rounds_and_trims() {
        assert_eq!(fmt_dp(1234.567, 2), "1234.57");
        assert_eq!(fmt_dp(1200.5, 2), "1200.5");
        assert_eq!(fmt_dp(100.0, 1), "100");
        assert_eq!(fmt_dp(0.1234 * 100.0, 1), "12.3");
    }

    #[test]
    fn test_fmt_dp_negative() {
        assert_eq!(fmt_dp(-3.456, 2), "-3.46");
        assert_eq!(fmt_dp(-0.001, 2), "0");
    }

    #[test]
    fn test_round_dp_ties_toward_positive_infinity() {
        assert_eq!(round_dp(2.5, 0), 3.0);
        assert_eq!(round_dp(-2.5, 0), -2.0);
        // 1.005 * 100 lands just below the tie
        assert_eq!(fmt_dp(1.005, 2), "1");
    }

    #[test]
    fn test_to_fixed_rounds_binary_value() {
        // Both sit just below the decimal midpoint in binary
        assert_eq!(to_fixed(2.675, 2), "2.67");
        assert_eq!(to_fixed(100.05, 1), "100.0");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(41234.567, 2), "41234.57");
    }

    #[test]
    fn test_to_fixed_exact_ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(9.875, 2), "9.88");
        assert_eq!(to_fixed(-9.75, 1), "-9.8");
        assert_eq!(to_fixed(99.5, 0), "100");
    }

    #[test]
    fn test_fmt_fixed_trims() {
        assert_eq!(fmt_fixed(100.04, 1), "100");
        assert_eq!(fmt_fixed(70000.5, 2), "70000.5");
        assert_eq!(fmt_fixed(-0.001, 2), "0");
        assert_eq!(fmt_fixed(-2.0, 2), "-2");
        assert_eq!(fmt_fixed(12.0, 0), "12");
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "f64_from_text")]
        required: f64,
        #[serde(default, deserialize_with = "opt_f64_from_text")]
        optional: Option<f64>,
        #[serde(default, deserialize_with = "opt_count_from_text")]
        count: Option<u64>,
    }

    #[test]
    fn test_parse_string_and_number_forms() {
        let a: Sample =
            serde_json::from_str(r#"{"required":"1.5","optional":2.5,"count":"7"}"#).unwrap();
        assert_eq!(a.required, 1.5);
        assert_eq!(a.optional, Some(2.5));
        assert_eq!(a.count, Some(7));

        let b: Sample = serde_json::from_str(r#"{"required":3,"count":4}"#).unwrap();
        assert_eq!(b.required, 3.0);
        assert_eq!(b.optional, None);
        assert_eq!(b.count, Some(4));
    }

    #[test]
    fn test_empty_and_null_are_absent() {
        let s: Sample =
            serde_json::from_str(r#"{"required":"0","optional":"","count":null}"#).unwrap();
        assert_eq!(s.optional, None);
        assert_eq!(s.count, None);
    }

    #[test]
    fn test_garbage_number_rejected() {
        let result: Result<Sample, _> = serde_json::from_str(r#"{"required":"abc"}"#);
        assert!(result.is_err());
    }
}
