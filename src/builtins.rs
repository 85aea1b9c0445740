//! Built-in constants and functions pre-seeded into every [`EvalContext`].
//!
//! Names follow a `Namespace_member` convention:
//!
//! - `Math_*` / `math_*` - constants and functions of the math library
//! - `Number_*` - numeric constants, classification and parsing
//! - `String_*` - string constructors
//! - `number_*`, `string_*`, `boolean_*` - methods taking their receiver as
//!   the first argument (`string_trim(name)`)
//!
//! [`EvalContext`]: crate::EvalContext

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::context::NativeFunction;
use crate::number;
use crate::value::Value;

const MATH_PREFIXES: [&str; 2] = ["Math_", "math_"];

const MATH_CONSTANTS: &[(&str, f64)] = &[
    ("E", std::f64::consts::E),
    ("LN10", std::f64::consts::LN_10),
    ("LN2", std::f64::consts::LN_2),
    ("LOG10E", std::f64::consts::LOG10_E),
    ("LOG2E", std::f64::consts::LOG2_E),
    ("PI", std::f64::consts::PI),
    ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ("SQRT2", std::f64::consts::SQRT_2),
];

const NUMBER_CONSTANTS: &[(&str, f64)] = &[
    ("EPSILON", f64::EPSILON),
    ("MAX_SAFE_INTEGER", 9_007_199_254_740_991.0),
    ("MAX_VALUE", f64::MAX),
    ("MIN_SAFE_INTEGER", -9_007_199_254_740_991.0),
    ("MIN_VALUE", 5e-324),
    ("NaN", f64::NAN),
    ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ("POSITIVE_INFINITY", f64::INFINITY),
];

const MATH_UNARY: &[(&str, fn(f64) -> f64)] = &[
    ("abs", f64::abs),
    ("acos", f64::acos),
    ("acosh", f64::acosh),
    ("asin", f64::asin),
    ("asinh", f64::asinh),
    ("atan", f64::atan),
    ("atanh", f64::atanh),
    ("cbrt", f64::cbrt),
    ("ceil", f64::ceil),
    ("cos", f64::cos),
    ("cosh", f64::cosh),
    ("exp", f64::exp),
    ("expm1", f64::exp_m1),
    ("floor", f64::floor),
    ("fround", fround),
    ("log", f64::ln),
    ("log10", f64::log10),
    ("log1p", f64::ln_1p),
    ("log2", f64::log2),
    ("round", round),
    ("sign", sign),
    ("sin", f64::sin),
    ("sinh", f64::sinh),
    ("sqrt", f64::sqrt),
    ("tan", f64::tan),
    ("tanh", f64::tanh),
    ("trunc", f64::trunc),
];

const MATH_BINARY: &[(&str, fn(f64, f64) -> f64)] = &[
    ("atan2", f64::atan2),
    ("pow", pow),
    ("imul", imul),
];

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
/// Longest string `string_repeat` and the pad methods will build.
const MAX_STRING_LENGTH: f64 = ((1u32 << 30) - 1) as f64;

fn fround(x: f64) -> f64 {
    x as f32 as f64
}

/// Rounds half up, towards positive infinity.
fn round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

/// `**` semantics: any base to a `NaN` power is `NaN`, and `±1 ** ±Infinity` too.
pub fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn imul(a: f64, b: f64) -> f64 {
    number::to_int32(a).wrapping_mul(number::to_int32(b)) as f64
}

static NULL: Value = Value::Null;

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

/// Numeric argument; missing arguments are `NaN`.
fn num(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(f64::NAN, Value::as_number)
}

fn text(args: &[Value], index: usize) -> String {
    args.get(index).map_or_else(String::new, Value::as_string)
}

/// Optional argument, `None` when missing or null.
fn optional(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !matches!(v, Value::Null))
}

fn optional_num(args: &[Value], index: usize) -> Option<f64> {
    optional(args, index).map(Value::as_number)
}

/// Integer conversion used for counts and positions (`NaN` becomes 0).
fn to_integer(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.trunc() }
}

/// Resolves a possibly negative position against a length.
fn relative_index(position: f64, len: usize) -> usize {
    let position = to_integer(position);
    if position < 0.0 {
        (len as f64 + position).max(0.0) as usize
    } else {
        position.min(len as f64) as usize
    }
}

fn clamp_index(position: f64, len: usize) -> usize {
    to_integer(position).clamp(0.0, len as f64) as usize
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn char_index(s: &str, byte_index: usize) -> usize {
    s[..byte_index].chars().count()
}

fn char_offset_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map_or(s.len(), |(byte, _)| byte)
}

fn compile(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))
}

fn digits_arg(args: &[Value], index: usize, name: &str) -> Result<Option<u32>, String> {
    match optional_num(args, index) {
        None => Ok(None),
        Some(d) if (0.0..=100.0).contains(&to_integer(d)) => Ok(Some(to_integer(d) as u32)),
        Some(_) => Err(format!("{}() argument must be between 0 and 100", name)),
    }
}

struct Registry {
    functions: HashMap<String, NativeFunction>,
}

impl Registry {
    fn add<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }
}

/// Built-in constants (`Math_PI`, `Number_MAX_SAFE_INTEGER`, ...).
pub fn identifiers() -> HashMap<String, Value> {
    let mut globals = HashMap::new();
    for prefix in MATH_PREFIXES {
        for (name, value) in MATH_CONSTANTS {
            globals.insert(format!("{}{}", prefix, name), Value::Number(*value));
        }
    }
    for (name, value) in NUMBER_CONSTANTS {
        globals.insert(format!("Number_{}", name), Value::Number(*value));
    }
    globals
}

/// Built-in function table.
pub fn functions() -> HashMap<String, NativeFunction> {
    let mut registry = Registry {
        functions: HashMap::new(),
    };
    register_math(&mut registry);
    register_number(&mut registry);
    register_string_statics(&mut registry);
    register_number_methods(&mut registry);
    register_string_methods(&mut registry);
    register_boolean_methods(&mut registry);
    registry.functions
}

fn register_math(r: &mut Registry) {
    for prefix in MATH_PREFIXES {
        for &(name, f) in MATH_UNARY {
            r.add(format!("{}{}", prefix, name), move |args: &[Value]| {
                Ok(Value::Number(f(num(args, 0))))
            });
        }
        for &(name, f) in MATH_BINARY {
            r.add(format!("{}{}", prefix, name), move |args: &[Value]| {
                Ok(Value::Number(f(num(args, 0), num(args, 1))))
            });
        }
        r.add(format!("{}clz32", prefix), |args: &[Value]| {
            Ok(Value::from(number::to_uint32(num(args, 0)).leading_zeros()))
        });
        r.add(format!("{}hypot", prefix), |args: &[Value]| {
            let values: Vec<f64> = args.iter().map(Value::as_number).collect();
            if values.iter().any(|v| v.is_infinite()) {
                return Ok(Value::Number(f64::INFINITY));
            }
            Ok(Value::Number(values.into_iter().fold(0.0, f64::hypot)))
        });
        r.add(format!("{}max", prefix), |args: &[Value]| {
            Ok(Value::Number(args.iter().map(Value::as_number).fold(
                f64::NEG_INFINITY,
                |acc, v| if acc.is_nan() || v.is_nan() { f64::NAN } else { acc.max(v) },
            )))
        });
        r.add(format!("{}min", prefix), |args: &[Value]| {
            Ok(Value::Number(args.iter().map(Value::as_number).fold(
                f64::INFINITY,
                |acc, v| if acc.is_nan() || v.is_nan() { f64::NAN } else { acc.min(v) },
            )))
        });
    }
}

fn is_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        _ => None,
    }
}

fn register_number(r: &mut Registry) {
    r.add("Number_isFinite", |args: &[Value]| {
        Ok(Value::Boolean(is_number(arg(args, 0)).is_some_and(f64::is_finite)))
    });
    r.add("Number_isInteger", |args: &[Value]| {
        Ok(Value::Boolean(
            is_number(arg(args, 0)).is_some_and(|n| n.is_finite() && n.trunc() == n),
        ))
    });
    r.add("Number_isNaN", |args: &[Value]| {
        Ok(Value::Boolean(is_number(arg(args, 0)).is_some_and(f64::is_nan)))
    });
    r.add("Number_isSafeInteger", |args: &[Value]| {
        Ok(Value::Boolean(is_number(arg(args, 0)).is_some_and(|n| {
            n.is_finite() && n.trunc() == n && n.abs() <= MAX_SAFE_INTEGER
        })))
    });
    r.add("Number_parseFloat", |args: &[Value]| {
        Ok(Value::Number(number::parse_float(&text(args, 0))))
    });
    r.add("Number_parseInt", |args: &[Value]| {
        let radix = optional_num(args, 1).map(|r| to_integer(r) as u32);
        Ok(Value::Number(number::parse_int(&text(args, 0), radix)))
    });
}

fn register_string_statics(r: &mut Registry) {
    r.add("String_fromCharCode", |args: &[Value]| {
        let units = args
            .iter()
            .map(|v| (number::to_uint32(v.as_number()) & 0xFFFF) as u16);
        Ok(Value::String(
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        ))
    });
    r.add("String_fromCodePoint", |args: &[Value]| {
        args.iter()
            .map(|v| {
                let n = v.as_number();
                (n.trunc() == n && (0.0..=1_114_111.0).contains(&n))
                    .then(|| char::from_u32(n as u32))
                    .flatten()
                    .ok_or_else(|| format!("invalid code point {}", v.as_string()))
            })
            .collect::<Result<String, String>>()
            .map(Value::String)
    });
}

fn register_number_methods(r: &mut Registry) {
    r.add("number_toExponential", |args: &[Value]| {
        let digits = digits_arg(args, 1, "toExponential")?;
        number::to_exponential(num(args, 0), digits)
            .map(Value::String)
            .ok_or_else(|| "toExponential() argument must be between 0 and 100".to_string())
    });
    r.add("number_toFixed", |args: &[Value]| {
        let digits = digits_arg(args, 1, "toFixed")?.unwrap_or(0);
        number::to_fixed(num(args, 0), digits)
            .map(Value::String)
            .ok_or_else(|| "toFixed() digits argument must be between 0 and 100".to_string())
    });
    r.add("number_toPrecision", |args: &[Value]| {
        let precision = optional_num(args, 1).map(|p| to_integer(p) as u32);
        number::to_precision(num(args, 0), precision)
            .map(Value::String)
            .ok_or_else(|| "toPrecision() argument must be between 1 and 100".to_string())
    });
    r.add("number_toString", |args: &[Value]| {
        let radix = optional_num(args, 1).map_or(10, |r| to_integer(r) as u32);
        number::format_radix(num(args, 0), radix)
            .map(Value::String)
            .ok_or_else(|| "toString() radix must be between 2 and 36".to_string())
    });
}

fn register_string_methods(r: &mut Registry) {
    r.add("string_at", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let index = to_integer(num(args, 1));
        let index = if index < 0.0 { s.len() as f64 + index } else { index };
        Ok(if index >= 0.0 && (index as usize) < s.len() {
            Value::String(s[index as usize].to_string())
        } else {
            Value::Null
        })
    });
    r.add("string_charAt", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let index = to_integer(num(args, 1));
        Ok(Value::String(if index >= 0.0 && (index as usize) < s.len() {
            s[index as usize].to_string()
        } else {
            String::new()
        }))
    });
    r.add("string_charCodeAt", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let index = to_integer(num(args, 1));
        Ok(Value::Number(if index >= 0.0 && (index as usize) < s.len() {
            s[index as usize] as u32 as f64
        } else {
            f64::NAN
        }))
    });
    r.add("string_codePointAt", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let index = to_integer(num(args, 1));
        Ok(if index >= 0.0 && (index as usize) < s.len() {
            Value::from(s[index as usize] as u32)
        } else {
            Value::Null
        })
    });
    r.add("string_concat", |args: &[Value]| {
        Ok(Value::String(args.iter().map(Value::as_string).collect()))
    });
    r.add("string_endsWith", |args: &[Value]| {
        let s = text(args, 0);
        let len = s.chars().count();
        let end = optional_num(args, 2).map_or(len, |e| clamp_index(e, len));
        let head: String = s.chars().take(end).collect();
        Ok(Value::Boolean(head.ends_with(&text(args, 1))))
    });
    r.add("string_includes", |args: &[Value]| {
        let s = text(args, 0);
        let start = clamp_index(optional_num(args, 2).unwrap_or(0.0), s.chars().count());
        let tail = &s[char_offset_to_byte(&s, start)..];
        Ok(Value::Boolean(tail.contains(&text(args, 1))))
    });
    r.add("string_indexOf", |args: &[Value]| {
        let s = text(args, 0);
        let start = clamp_index(optional_num(args, 2).unwrap_or(0.0), s.chars().count());
        let offset = char_offset_to_byte(&s, start);
        Ok(Value::Number(match s[offset..].find(&text(args, 1)) {
            Some(found) => char_index(&s, offset + found) as f64,
            None => -1.0,
        }))
    });
    r.add("string_lastIndexOf", |args: &[Value]| {
        let s = text(args, 0);
        Ok(Value::Number(match s.rfind(&text(args, 1)) {
            Some(found) => char_index(&s, found) as f64,
            None => -1.0,
        }))
    });
    r.add("string_match", |args: &[Value]| {
        let s = text(args, 0);
        let re = compile(&text(args, 1))?;
        Ok(match re.captures(&s) {
            Some(caps) => Value::Array(
                caps.iter()
                    .map(|m| m.map_or(Value::Null, |m| Value::from(m.as_str())))
                    .collect(),
            ),
            None => Value::Null,
        })
    });
    r.add("string_padEnd", |args: &[Value]| pad(args, false));
    r.add("string_padStart", |args: &[Value]| pad(args, true));
    r.add("string_repeat", |args: &[Value]| {
        let count = to_integer(num(args, 1));
        if count < 0.0 || count.is_infinite() {
            return Err(format!("invalid repeat count {}", number::format_number(count)));
        }
        let s = text(args, 0);
        if s.is_empty() || count == 0.0 {
            return Ok(Value::String(String::new()));
        }
        if s.chars().count() as f64 * count > MAX_STRING_LENGTH {
            return Err("invalid string length".to_string());
        }
        Ok(Value::String(s.repeat(count as usize)))
    });
    r.add("string_replace", |args: &[Value]| {
        Ok(Value::String(text(args, 0).replacen(&text(args, 1), &text(args, 2), 1)))
    });
    r.add("string_replaceAll", |args: &[Value]| {
        let s = text(args, 0);
        let pattern = text(args, 1);
        let replacement = text(args, 2);
        if pattern.is_empty() {
            let mut out = replacement.clone();
            for c in s.chars() {
                out.push(c);
                out.push_str(&replacement);
            }
            return Ok(Value::String(out));
        }
        Ok(Value::String(s.replace(&pattern, &replacement)))
    });
    r.add("string_search", |args: &[Value]| {
        let s = text(args, 0);
        let re = compile(&text(args, 1))?;
        Ok(Value::Number(match re.find(&s) {
            Some(found) => char_index(&s, found.start()) as f64,
            None => -1.0,
        }))
    });
    r.add("string_slice", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let start = relative_index(num(args, 1), s.len());
        let end = optional_num(args, 2).map_or(s.len(), |e| relative_index(e, s.len()));
        Ok(Value::String(if start < end {
            s[start..end].iter().collect()
        } else {
            String::new()
        }))
    });
    r.add("string_split", |args: &[Value]| {
        let s = text(args, 0);
        let limit = optional_num(args, 2).map_or(usize::MAX, |l| number::to_uint32(l) as usize);
        let parts: Vec<Value> = match optional(args, 1).map(Value::as_string) {
            None => vec![Value::String(s)],
            Some(sep) if sep.is_empty() => s.chars().map(|c| Value::String(c.to_string())).collect(),
            Some(sep) => s.split(sep.as_str()).map(Value::from).collect(),
        };
        Ok(Value::Array(parts.into_iter().take(limit).collect()))
    });
    r.add("string_startsWith", |args: &[Value]| {
        let s = text(args, 0);
        let start = clamp_index(optional_num(args, 2).unwrap_or(0.0), s.chars().count());
        let tail = &s[char_offset_to_byte(&s, start)..];
        Ok(Value::Boolean(tail.starts_with(&text(args, 1))))
    });
    r.add("string_substring", |args: &[Value]| {
        let s = chars(&text(args, 0));
        let a = clamp_index(num(args, 1), s.len());
        let b = optional_num(args, 2).map_or(s.len(), |e| clamp_index(e, s.len()));
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Ok(Value::String(s[start..end].iter().collect()))
    });
    r.add("string_toLowerCase", |args: &[Value]| {
        Ok(Value::String(text(args, 0).to_lowercase()))
    });
    r.add("string_toUpperCase", |args: &[Value]| {
        Ok(Value::String(text(args, 0).to_uppercase()))
    });
    r.add("string_trim", |args: &[Value]| Ok(Value::from(text(args, 0).trim())));
    r.add("string_trimEnd", |args: &[Value]| {
        Ok(Value::from(text(args, 0).trim_end()))
    });
    r.add("string_trimStart", |args: &[Value]| {
        Ok(Value::from(text(args, 0).trim_start()))
    });
}

fn pad(args: &[Value], at_start: bool) -> Result<Value, String> {
    let s = text(args, 0);
    let target = to_integer(num(args, 1));
    let filler: Vec<char> = match optional(args, 2) {
        Some(v) => v.as_string().chars().collect(),
        None => vec![' '],
    };
    let len = s.chars().count();
    if target <= len as f64 || filler.is_empty() {
        return Ok(Value::String(s));
    }
    if target > MAX_STRING_LENGTH {
        return Err("invalid string length".to_string());
    }
    let target = target as usize;
    let padding: String = filler.iter().cycle().take(target - len).collect();
    Ok(Value::String(if at_start {
        format!("{}{}", padding, s)
    } else {
        format!("{}{}", s, padding)
    }))
}

fn register_boolean_methods(r: &mut Registry) {
    r.add("boolean_toString", |args: &[Value]| {
        Ok(Value::String(arg(args, 0).is_truthy().to_string()))
    });
    r.add("boolean_valueOf", |args: &[Value]| {
        Ok(Value::Boolean(arg(args, 0).is_truthy()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        let table = functions();
        let f = table.get(name).unwrap_or_else(|| panic!("missing built-in {}", name));
        f(args).unwrap()
    }

    #[test]
    fn math_is_available_under_both_prefixes() {
        assert_eq!(call("Math_pow", &[2.into(), 6.into()]), Value::Number(64.0));
        assert_eq!(call("math_abs", &[(-3).into()]), Value::Number(3.0));
        assert_eq!(identifiers()["math_PI"], Value::Number(std::f64::consts::PI));
    }

    #[test]
    fn round_goes_half_up() {
        assert_eq!(round(2.5), 3.0);
        assert_eq!(round(-2.5), -2.0);
        assert_eq!(round(-2.6), -3.0);
    }

    #[test]
    fn max_and_min_without_arguments() {
        assert_eq!(call("Math_max", &[]), Value::Number(f64::NEG_INFINITY));
        assert_eq!(call("Math_min", &[]), Value::Number(f64::INFINITY));
    }

    #[test]
    fn string_positions_count_characters() {
        assert_eq!(call("string_indexOf", &["héllo".into(), "l".into()]), Value::Number(2.0));
        assert_eq!(call("string_slice", &["héllo".into(), (-3).into()]), Value::from("llo"));
        assert_eq!(call("string_at", &["abc".into(), (-1).into()]), Value::from("c"));
    }
}
