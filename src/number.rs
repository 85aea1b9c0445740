//! Numeric text conversions.
//!
//! Numbers are IEEE-754 doubles throughout. Rendering follows the shortest
//! round-trip form with exponent notation outside `[1e-7, 1e21)`, and the
//! bitwise operators work on 32-bit wraparound integers.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_31: f64 = 2_147_483_648.0;

fn decimal_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("valid regex")
    })
}

fn decimal_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)$")
            .expect("valid regex")
    })
}

fn parse_decimal(text: &str) -> f64 {
    let unsigned = text.trim_start_matches(['+', '-']);
    let negative = text.starts_with('-');
    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else {
        unsigned.parse::<f64>().unwrap_or(f64::NAN)
    };
    if negative { -magnitude } else { magnitude }
}

fn trim_js(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Shortest decimal digits and decimal exponent of a finite, positive number.
///
/// Returns `(digits, n)` such that the value is `0.digits * 10^n`.
fn shortest_digits(value: f64) -> (String, i32) {
    let formatted = format!("{:e}", value);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    (digits, exponent + 1)
}

fn exponent_suffix(exponent: i32) -> String {
    if exponent >= 0 {
        format!("e+{}", exponent)
    } else {
        format!("e-{}", -exponent)
    }
}

/// Canonical text of a number, as produced by `String(n)` in the language.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", format_number(-value));
    }

    let (digits, n) = shortest_digits(value);
    let k = digits.len() as i32;

    if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let suffix = exponent_suffix(n - 1);
        if rest.is_empty() {
            format!("{}{}", first, suffix)
        } else {
            format!("{}.{}{}", first, rest, suffix)
        }
    }
}

/// Text of a number in an arbitrary radix between 2 and 36.
pub fn format_radix(value: f64, radix: u32) -> Option<String> {
    if !(2..=36).contains(&radix) {
        return None;
    }
    if radix == 10 || !value.is_finite() {
        return Some(format_number(value));
    }
    let negative = value < 0.0;
    let value = value.abs();
    let mut int = value.trunc();
    let mut frac = value - int;

    let mut int_digits = Vec::new();
    loop {
        let digit = (int % radix as f64) as u32;
        int_digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        int = (int / radix as f64).trunc();
        if int < 1.0 {
            break;
        }
    }
    let mut text: String = int_digits.into_iter().rev().collect();

    if frac > 0.0 {
        text.push('.');
        let mut produced = 0;
        while frac > 0.0 && produced < 52 {
            frac *= radix as f64;
            let digit = frac.trunc() as u32;
            text.push(std::char::from_digit(digit, radix).unwrap_or('0'));
            frac -= digit as f64;
            produced += 1;
        }
    }

    Some(if negative { format!("-{}", text) } else { text })
}

/// Numeric value of a whole string; `NaN` when it is not a number.
///
/// Blank strings are `0`. Accepts `0x`, `0o` and `0b` prefixed integers,
/// signed decimals and `Infinity`.
pub fn str_to_number(text: &str) -> f64 {
    let trimmed = trim_js(text);
    if trimmed.is_empty() {
        return 0.0;
    }

    let lower = trimmed.get(..2).map(str::to_ascii_lowercase);
    let radix = match lower.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN);
    }

    if decimal_literal_regex().is_match(trimmed) {
        parse_decimal(trimmed)
    } else {
        f64::NAN
    }
}

/// Leading decimal number of a string, ignoring trailing garbage.
///
/// # Example
/// ```
/// use mace_lang::number::parse_float;
/// assert_eq!(parse_float("34.8__hello"), 34.8);
/// assert!(parse_float("hello").is_nan());
/// ```
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    match decimal_prefix_regex().find(trimmed) {
        Some(found) => parse_decimal(found.as_str()),
        None => f64::NAN,
    }
}

/// Leading integer of a string in the given radix (10 or `0x`-detected when `None`).
pub fn parse_int(text: &str, radix: Option<u32>) -> f64 {
    let mut rest = trim_js(text);
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let has_hex_prefix = rest.starts_with("0x") || rest.starts_with("0X");
    let radix = match radix {
        None | Some(0) => {
            if has_hex_prefix { 16 } else { 10 }
        }
        Some(r) if (2..=36).contains(&r) => r,
        Some(_) => return f64::NAN,
    };
    if radix == 16 && has_hex_prefix {
        rest = &rest[2..];
    }

    let mut value = 0f64;
    let mut digits = 0;
    for digit in rest.chars().map_while(|c| c.to_digit(radix)) {
        value = value * radix as f64 + digit as f64;
        digits += 1;
    }
    if digits == 0 {
        return f64::NAN;
    }
    if negative { -value } else { value }
}

fn modulo_pow32(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.trunc().rem_euclid(TWO_POW_32)
}

/// Wraps a number into a signed 32-bit integer.
pub fn to_int32(value: f64) -> i32 {
    let m = modulo_pow32(value);
    if m >= TWO_POW_31 {
        (m - TWO_POW_32) as i32
    } else {
        m as i32
    }
}

/// Wraps a number into an unsigned 32-bit integer.
pub fn to_uint32(value: f64) -> u32 {
    modulo_pow32(value) as u32
}

/// Fixed-point text with `digits` fraction digits (0 to 100).
pub fn to_fixed(value: f64, digits: u32) -> Option<String> {
    if digits > 100 {
        return None;
    }
    if !value.is_finite() || value.abs() >= 1e21 {
        return Some(format_number(value));
    }
    let value = if value == 0.0 { 0.0 } else { value };

    let text = match Decimal::from_f64_retain(value) {
        Some(decimal) if digits <= 28 => {
            let rounded =
                decimal.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", digits as usize, rounded)
        }
        _ => format!("{:.*}", digits as usize, value),
    };
    Some(text)
}

/// Exponential text; shortest digits when `fraction_digits` is `None`.
pub fn to_exponential(value: f64, fraction_digits: Option<u32>) -> Option<String> {
    if !value.is_finite() {
        return Some(format_number(value));
    }
    let formatted = match fraction_digits {
        Some(d) if d > 100 => return None,
        Some(d) => format!("{:.*e}", d as usize, value),
        None => format!("{:e}", value),
    };
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    Some(format!("{}{}", mantissa, exponent_suffix(exponent)))
}

/// Text with `precision` significant digits (1 to 100).
pub fn to_precision(value: f64, precision: Option<u32>) -> Option<String> {
    let Some(precision) = precision else {
        return Some(format_number(value));
    };
    if !value.is_finite() {
        return Some(format_number(value));
    }
    if !(1..=100).contains(&precision) {
        return None;
    }

    let formatted = format!("{:.*e}", (precision - 1) as usize, value);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -6 || exponent >= precision as i32 {
        Some(format!("{}{}", mantissa, exponent_suffix(exponent)))
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        Some(format!("{:.*}", decimals, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_language_prints_numbers() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(0.0000001), "1e-7");
        assert_eq!(format_number(1.5e-10), "1.5e-10");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn string_to_number() {
        assert_eq!(str_to_number(""), 0.0);
        assert_eq!(str_to_number("  12  "), 12.0);
        assert_eq!(str_to_number("0x1F"), 31.0);
        assert_eq!(str_to_number("-1.5e2"), -150.0);
        assert_eq!(str_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(str_to_number("12px").is_nan());
        assert!(str_to_number("test").is_nan());
    }

    #[test]
    fn parse_int_prefixes() {
        assert_eq!(parse_int("42px", None), 42.0);
        assert_eq!(parse_int("0x10", None), 16.0);
        assert_eq!(parse_int("-101", Some(2)), -5.0);
        assert!(parse_int("zz", Some(10)).is_nan());
        assert!(parse_int("1", Some(40)).is_nan());
    }

    #[test]
    fn wraps_to_32_bits() {
        assert_eq!(to_int32(2_147_483_648.0), -2_147_483_648);
        assert_eq!(to_int32(-1.9), -1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_uint32(-1.0), 4_294_967_295);
    }

    #[test]
    fn fixed_and_exponential() {
        assert_eq!(to_fixed(2.5, 0).as_deref(), Some("3"));
        assert_eq!(to_fixed(1.005, 2).as_deref(), Some("1.00"));
        assert_eq!(to_fixed(3.0, 2).as_deref(), Some("3.00"));
        assert_eq!(to_exponential(3.0, None).as_deref(), Some("3e+0"));
        assert_eq!(to_exponential(123456.0, Some(2)).as_deref(), Some("1.23e+5"));
        assert_eq!(to_precision(123.456, Some(4)).as_deref(), Some("123.5"));
        assert_eq!(to_precision(0.00001, Some(1)).as_deref(), Some("0.00001"));
        assert_eq!(to_precision(123456.0, Some(2)).as_deref(), Some("1.2e+5"));
    }

    #[test]
    fn radix_text() {
        assert_eq!(format_radix(255.0, 16).as_deref(), Some("ff"));
        assert_eq!(format_radix(-5.0, 2).as_deref(), Some("-101"));
        assert_eq!(format_radix(0.5, 2).as_deref(), Some("0.1"));
        assert_eq!(format_radix(1.0, 1), None);
    }
}
