//! Arithmetic with Python semantics: flooring division, sign-of-divisor
//! modulo, and exponentiation that keeps integers integral.

use crate::error::{Result, SupportError};
use crate::format::percent_format;
use crate::value::{Number, Value};

fn unsupported(op: &str, a: &Value, b: &Value) -> SupportError {
    SupportError::Type(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

fn operands(op: &str, a: &Value, b: &Value) -> Result<(Number, Number)> {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(unsupported(op, a, b)),
    }
}

/// Python's `float_divmod`: returns `(floor quotient, modulo)`.
fn float_divmod(x: f64, y: f64) -> (f64, f64) {
    let mut rem = x % y;
    let mut div = (x - rem) / y;
    if rem != 0.0 {
        if (y < 0.0) != (rem < 0.0) {
            rem += y;
            div -= 1.0;
        }
    } else {
        rem = 0.0_f64.copysign(y);
    }
    let floordiv = if div != 0.0 {
        let mut floored = div.floor();
        if div - floored > 0.5 {
            floored += 1.0;
        }
        floored
    } else {
        0.0_f64.copysign(x / y)
    };
    (floordiv, rem)
}

/// `a // b`, rounding toward negative infinity.
pub fn floordiv(a: &Value, b: &Value) -> Result<Value> {
    match operands("//", a, b)? {
        (Number::Int(x), Number::Int(y)) => {
            if y == 0 {
                return Err(SupportError::ZeroDivision(
                    "integer division or modulo by zero".into(),
                ));
            }
            let q = x
                .checked_div(y)
                .ok_or_else(|| SupportError::Overflow("integer division result too large".into()))?;
            if x % y != 0 && ((x < 0) != (y < 0)) {
                Ok(Value::Int(q - 1))
            } else {
                Ok(Value::Int(q))
            }
        }
        (x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            if y == 0.0 {
                return Err(SupportError::ZeroDivision("float floor division by zero".into()));
            }
            Ok(Value::Float(float_divmod(x, y).0))
        }
    }
}

/// `a % b`. The result takes the sign of the divisor. A string on the left
/// is printf-style formatting.
pub fn modulo(a: &Value, b: &Value) -> Result<Value> {
    if let Value::Str(template) = a {
        return percent_format(template, b).map(Value::Str);
    }
    match operands("%", a, b)? {
        (Number::Int(x), Number::Int(y)) => {
            if y == 0 {
                return Err(SupportError::ZeroDivision("integer modulo by zero".into()));
            }
            let r = x.checked_rem(y).unwrap_or(0);
            if r != 0 && ((r < 0) != (y < 0)) {
                Ok(Value::Int(r + y))
            } else {
                Ok(Value::Int(r))
            }
        }
        (x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            if y == 0.0 {
                return Err(SupportError::ZeroDivision("float modulo".into()));
            }
            Ok(Value::Float(float_divmod(x, y).1))
        }
    }
}

/// `a ** b`.
///
/// Integer bases with non-negative integer exponents stay integers and raise
/// `OverflowError` past the 64-bit range. A negative base with a fractional
/// exponent would be complex in Python; it raises `ValueError` here.
pub fn power(a: &Value, b: &Value) -> Result<Value> {
    match operands("**", a, b)? {
        (Number::Int(x), Number::Int(y)) if y >= 0 => int_pow(x, y).map(Value::Int),
        (Number::Int(0), Number::Int(_)) => Err(SupportError::ZeroDivision(
            "0.0 cannot be raised to a negative power".into(),
        )),
        (x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            if x == 0.0 && y < 0.0 {
                return Err(SupportError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".into(),
                ));
            }
            if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
                return Err(SupportError::Value(
                    "negative number cannot be raised to a fractional power".into(),
                ));
            }
            let result = x.powf(y);
            if result.is_infinite() && x.is_finite() && y.is_finite() {
                return Err(SupportError::Overflow("Numerical result out of range".into()));
            }
            Ok(Value::Float(result))
        }
    }
}

fn int_pow(base: i64, exp: i64) -> Result<i64> {
    match base {
        0 => return Ok(if exp == 0 { 1 } else { 0 }),
        1 => return Ok(1),
        -1 => return Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => {}
    }
    u32::try_from(exp)
        .ok()
        .and_then(|exp| base.checked_pow(exp))
        .ok_or_else(|| SupportError::Overflow("integer power result too large".into()))
}

/// `divmod(a, b)` as a two-element tuple.
pub fn divmod(a: &Value, b: &Value) -> Result<Value> {
    Ok(Value::Tuple(vec![floordiv(a, b)?, modulo(a, b)?]))
}

pub fn abs(value: &Value) -> Result<Value> {
    match value.as_number() {
        Some(Number::Int(i)) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| SupportError::Overflow("integer absolute value too large".into())),
        Some(Number::Float(f)) => Ok(Value::Float(f.abs())),
        None => Err(SupportError::Type(format!(
            "bad operand type for abs(): '{}'",
            value.type_name()
        ))),
    }
}

/// `round(x)` / `round(x, ndigits)` with ties rounding to even.
pub fn round(value: &Value, ndigits: Option<i64>) -> Result<Value> {
    match (value.as_number(), ndigits) {
        (Some(Number::Int(i)), None) => Ok(Value::Int(i)),
        (Some(Number::Int(i)), Some(n)) if n >= 0 => Ok(Value::Int(i)),
        (Some(Number::Int(i)), Some(n)) => round_int_to_tens(i, n.unsigned_abs()).map(Value::Int),
        (Some(Number::Float(f)), None) => {
            if f.is_nan() {
                return Err(SupportError::Value("cannot convert float NaN to integer".into()));
            }
            if f.is_infinite() {
                return Err(SupportError::Overflow(
                    "cannot convert float infinity to integer".into(),
                ));
            }
            let rounded = f.round_ties_even();
            if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(SupportError::Overflow("rounded value too large".into()));
            }
            Ok(Value::Int(rounded as i64))
        }
        (Some(Number::Float(f)), Some(n)) => {
            if !f.is_finite() || n > 330 {
                return Ok(Value::Float(f));
            }
            if n >= 0 {
                let text = format!("{:.*}", n as usize, f);
                Ok(Value::Float(text.parse().unwrap_or(f)))
            } else {
                let scale = 10f64.powi(n.unsigned_abs().min(330) as i32);
                Ok(Value::Float((f / scale).round_ties_even() * scale))
            }
        }
        (None, _) => Err(SupportError::Type(format!(
            "type {} doesn't define __round__ method",
            value.type_name()
        ))),
    }
}

fn round_int_to_tens(value: i64, digits: u64) -> Result<i64> {
    let Some(scale) = u32::try_from(digits).ok().and_then(|d| 10i64.checked_pow(d)) else {
        return Ok(0);
    };
    let quotient = value.div_euclid(scale);
    let remainder = value.rem_euclid(scale);
    let doubled = remainder * 2;
    let rounded = if doubled > scale || (doubled == scale && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    };
    rounded
        .checked_mul(scale)
        .ok_or_else(|| SupportError::Overflow("rounded value too large".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Int(i)
    }

    #[test]
    fn test_floordiv_rounds_toward_negative_infinity() {
        assert_eq!(floordiv(&int(7), &int(2)), Ok(int(3)));
        assert_eq!(floordiv(&int(-7), &int(2)), Ok(int(-4)));
        assert_eq!(floordiv(&int(7), &int(-2)), Ok(int(-4)));
        assert_eq!(floordiv(&int(-7), &int(-2)), Ok(int(3)));
    }

    #[test]
    fn test_floordiv_float_matches_python_divmod() {
        assert_eq!(floordiv(&Value::Float(1.0), &Value::Float(0.1)), Ok(Value::Float(9.0)));
        assert_eq!(floordiv(&Value::Float(-7.5), &int(2)), Ok(Value::Float(-4.0)));
    }

    #[test]
    fn test_modulo_takes_sign_of_divisor() {
        assert_eq!(modulo(&int(-7), &int(3)), Ok(int(2)));
        assert_eq!(modulo(&int(7), &int(-3)), Ok(int(-2)));
        assert_eq!(modulo(&Value::Float(-1.0), &Value::Float(3.0)), Ok(Value::Float(2.0)));
    }

    #[test]
    fn test_zero_divisor_raises() {
        assert!(matches!(
            floordiv(&int(1), &int(0)),
            Err(SupportError::ZeroDivision(_))
        ));
        assert!(matches!(
            modulo(&Value::Float(1.0), &Value::Float(0.0)),
            Err(SupportError::ZeroDivision(_))
        ));
    }

    #[test]
    fn test_string_modulo_formats() {
        assert_eq!(
            modulo(&Value::str("%s=%d"), &Value::tuple([Value::str("x"), int(3)])),
            Ok(Value::str("x=3"))
        );
    }

    #[test]
    fn test_power_keeps_integers() {
        assert_eq!(power(&int(2), &int(10)), Ok(int(1024)));
        assert_eq!(power(&int(2), &int(-1)), Ok(Value::Float(0.5)));
        assert_eq!(power(&int(-1), &int(i64::MAX)), Ok(int(-1)));
        assert!(matches!(power(&int(10), &int(40)), Err(SupportError::Overflow(_))));
        assert!(matches!(power(&int(0), &int(-2)), Err(SupportError::ZeroDivision(_))));
        assert!(matches!(
            power(&Value::Float(-8.0), &Value::Float(0.5)),
            Err(SupportError::Value(_))
        ));
    }

    #[test]
    fn test_round_ties_to_even() {
        assert_eq!(round(&Value::Float(2.5), None), Ok(int(2)));
        assert_eq!(round(&Value::Float(3.5), None), Ok(int(4)));
        assert_eq!(round(&Value::Float(2.675), Some(2)), Ok(Value::Float(2.67)));
        assert_eq!(round(&int(25), Some(-1)), Ok(int(20)));
        assert_eq!(round(&int(35), Some(-1)), Ok(int(40)));
    }

    #[test]
    fn test_divmod_and_abs() {
        assert_eq!(divmod(&int(-7), &int(2)), Ok(Value::tuple([int(-4), int(1)])));
        assert_eq!(abs(&int(-3)), Ok(int(3)));
        assert!(abs(&Value::str("x")).is_err());
    }
}
