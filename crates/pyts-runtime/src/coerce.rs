//! Conversions: `int()`, `float()`, `str()`, `repr()` and `bool()`.

use crate::error::{Result, SupportError};
use crate::value::Value;

/// `int(value)` / `int(text, base)`.
///
/// `base` is only accepted for strings; base 0 infers the base from a
/// `0x`/`0o`/`0b` prefix.
pub fn to_int(value: &Value, base: Option<u32>) -> Result<i64> {
    if base.is_some() && !matches!(value, Value::Str(_)) {
        return Err(SupportError::Type(
            "int() can't convert non-string with explicit base".into(),
        ));
    }
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int(i) => Ok(*i),
        Value::Float(f) => {
            if f.is_nan() {
                Err(SupportError::Value("cannot convert float NaN to integer".into()))
            } else if f.is_infinite() {
                Err(SupportError::Overflow(
                    "cannot convert float infinity to integer".into(),
                ))
            } else if f.trunc() < i64::MIN as f64 || f.trunc() >= i64::MAX as f64 {
                Err(SupportError::Overflow("int too large to convert".into()))
            } else {
                Ok(f.trunc() as i64)
            }
        }
        Value::Str(text) => parse_int(text, base.unwrap_or(10)),
        other => Err(SupportError::Type(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

fn parse_int(text: &str, base: u32) -> Result<i64> {
    let invalid = || {
        SupportError::Value(format!(
            "invalid literal for int() with base {base}: {}",
            repr_str(text)
        ))
    };
    if base == 1 || base > 36 {
        return Err(SupportError::Value(
            "int() base must be >= 2 and <= 36, or 0".into(),
        ));
    }
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = unsigned.to_ascii_lowercase();
    let prefixed = |prefix: &str, radix: u32| {
        (base == 0 || base == radix)
            .then(|| lower.strip_prefix(prefix))
            .flatten()
            .map(|rest| (rest.trim_start_matches('_').to_string(), radix))
    };
    let (digits, radix) = prefixed("0x", 16)
        .or_else(|| prefixed("0o", 8))
        .or_else(|| prefixed("0b", 2))
        .unwrap_or_else(|| (lower.clone(), if base == 0 { 10 } else { base }));

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }
    // Base 0 rejects legacy octal like "017".
    if base == 0
        && radix == 10
        && digits.starts_with('0')
        && digits.chars().any(|c| c != '0' && c != '_')
    {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|_| invalid())?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| SupportError::Overflow("int too large to convert".into()))
    } else {
        i64::try_from(magnitude).map_err(|_| SupportError::Overflow("int too large to convert".into()))
    }
}

/// `float(value)`.
pub fn to_float(value: &Value) -> Result<f64> {
    match value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Str(text) => {
            let trimmed = text.trim();
            let (sign, unsigned) = match trimmed.as_bytes().first() {
                Some(b'-') => (-1.0, &trimmed[1..]),
                Some(b'+') => (1.0, &trimmed[1..]),
                _ => (1.0, trimmed),
            };
            let lower = unsigned.to_ascii_lowercase();
            let magnitude = match lower.as_str() {
                "inf" | "infinity" => Some(f64::INFINITY),
                "nan" => Some(f64::NAN),
                _ if lower.is_empty() || lower.contains("__") || lower.starts_with('_') => None,
                _ => lower.replace('_', "").parse::<f64>().ok().filter(|f| f.is_finite()),
            };
            magnitude.map(|m| sign * m).ok_or_else(|| {
                SupportError::Value(format!(
                    "could not convert string to float: {}",
                    repr_str(text)
                ))
            })
        }
        other => Err(SupportError::Type(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// `bool(value)`.
pub fn to_bool(value: &Value) -> bool {
    value.is_truthy()
}

/// `str(value)`.
pub fn to_str(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => repr(other),
    }
}

/// `repr(value)`.
pub fn repr(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_repr(*f),
        Value::Str(s) => repr_str(s),
        Value::List(items) => format!("[{}]", join_reprs(items)),
        Value::Tuple(items) if items.len() == 1 => format!("({},)", repr(&items[0])),
        Value::Tuple(items) => format!("({})", join_reprs(items)),
        Value::Set(items) if items.is_empty() => "set()".to_string(),
        Value::Set(items) => format!("{{{}}}", join_reprs(items)),
        Value::Dict(entries) => {
            let body: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", repr(k), repr(v)))
                .collect();
            format!("{{{}}}", body.join(", "))
        }
    }
}

fn join_reprs(items: &[Value]) -> String {
    items.iter().map(repr).collect::<Vec<_>>().join(", ")
}

/// Quote a string the way Python's `repr` does: single quotes unless the
/// text contains a single quote and no double quote.
pub fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest round-tripping float text, Python style: fixed notation for
/// exponents in `-4..16`, otherwise `1e+16` style scientific notation.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sign = if f.is_sign_negative() { "-" } else { "" };
    if f == 0.0 {
        return format!("{sign}0.0");
    }
    let scientific = format!("{:e}", f.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let point = exponent as usize + 1;
            if digits.len() <= point {
                format!("{sign}{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{sign}{}.{}", &digits[..point], &digits[point..])
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("{sign}0.{zeros}{digits}")
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exponent.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_parses_strings_and_prefixes() {
        assert_eq!(to_int(&Value::str(" 42 "), None), Ok(42));
        assert_eq!(to_int(&Value::str("-1_000"), None), Ok(-1000));
        assert_eq!(to_int(&Value::str("0x1f"), Some(0)), Ok(31));
        assert_eq!(to_int(&Value::str("ff"), Some(16)), Ok(255));
        assert!(matches!(
            to_int(&Value::str("4.5"), None),
            Err(SupportError::Value(_))
        ));
        assert!(matches!(to_int(&Value::Int(4), Some(10)), Err(SupportError::Type(_))));
    }

    #[test]
    fn test_int_truncates_floats() {
        assert_eq!(to_int(&Value::Float(-2.9), None), Ok(-2));
        assert!(to_int(&Value::Float(f64::NAN), None).is_err());
    }

    #[test]
    fn test_float_special_values() {
        assert_eq!(to_float(&Value::str("-inf")), Ok(f64::NEG_INFINITY));
        assert!(to_float(&Value::str("nan")).is_ok_and(f64::is_nan));
        assert_eq!(to_float(&Value::str("1e3")), Ok(1000.0));
        assert!(to_float(&Value::str("abc")).is_err());
    }

    #[test]
    fn test_str_of_scalars() {
        assert_eq!(to_str(&Value::None), "None");
        assert_eq!(to_str(&Value::Bool(true)), "True");
        assert_eq!(to_str(&Value::Float(3.0)), "3.0");
        assert_eq!(to_str(&Value::str("hi")), "hi");
    }

    #[test]
    fn test_str_of_containers_quotes_elements() {
        let v = Value::list([Value::str("a"), Value::Int(1), Value::None]);
        assert_eq!(to_str(&v), "['a', 1, None]");
        assert_eq!(to_str(&Value::tuple([Value::Int(1)])), "(1,)");
        assert_eq!(to_str(&Value::set([])), "set()");
        let d = Value::dict([(Value::str("k"), Value::Bool(false))]);
        assert_eq!(to_str(&d), "{'k': False}");
    }

    #[test]
    fn test_repr_str_quote_choice() {
        assert_eq!(repr_str("it's"), "\"it's\"");
        assert_eq!(repr_str("a'b\"c"), "'a\\'b\"c'");
        assert_eq!(repr_str("tab\there"), "'tab\\there'");
    }

    #[test]
    fn test_float_repr_switches_to_scientific() {
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e-5), "1.5e-05");
        assert_eq!(float_repr(123456.789), "123456.789");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(1e15), "1000000000000000.0");
    }
}
