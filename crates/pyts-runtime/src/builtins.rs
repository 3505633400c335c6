//! Remaining builtin functions: aggregation, ordering, collection
//! constructors and character/radix helpers.

use crate::error::{Result, SupportError};
use crate::value::{Number, Value, compare};
use std::cmp::Ordering;

/// Arguments for `min`/`max`: one iterable, or two or more values.
fn candidates(name: &str, args: &[Value]) -> Result<Vec<Value>> {
    match args {
        [] => Err(SupportError::Type(format!(
            "{name} expected at least 1 argument, got 0"
        ))),
        [single] => single.iter_values(),
        many => Ok(many.to_vec()),
    }
}

fn extreme(name: &str, args: &[Value], keep: Ordering) -> Result<Value> {
    let mut items = candidates(name, args)?.into_iter();
    let mut best = items
        .next()
        .ok_or_else(|| SupportError::Value(format!("{name}() arg is an empty sequence")))?;
    for item in items {
        if compare(&item, &best)? == keep {
            best = item;
        }
    }
    Ok(best)
}

pub fn min(args: &[Value]) -> Result<Value> {
    extreme("min", args, Ordering::Less)
}

pub fn max(args: &[Value]) -> Result<Value> {
    extreme("max", args, Ordering::Greater)
}

/// `sum(iterable, start=0)`.
pub fn sum(iterable: &Value, start: Option<&Value>) -> Result<Value> {
    let mut total = start.cloned().unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(SupportError::Type(
            "sum() can't sum strings [use ''.join(seq) instead]".into(),
        ));
    }
    for item in iterable.iter_values()? {
        total = add(&total, &item)?;
    }
    Ok(total)
}

fn add(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::List(x), Value::List(y)) => Ok(Value::List([x.clone(), y.clone()].concat())),
        (Value::Tuple(x), Value::Tuple(y)) => Ok(Value::Tuple([x.clone(), y.clone()].concat())),
        _ => match (a.as_number(), b.as_number()) {
            (Some(Number::Int(x)), Some(Number::Int(y))) => x
                .checked_add(y)
                .map(Value::Int)
                .ok_or_else(|| SupportError::Overflow("integer addition overflow".into())),
            (Some(x), Some(y)) => Ok(Value::Float(x.as_f64() + y.as_f64())),
            _ => Err(SupportError::Type(format!(
                "unsupported operand type(s) for +: '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// `sorted(iterable, reverse=False)`. Stable, like Python's sort.
pub fn sorted(iterable: &Value, reverse: bool) -> Result<Value> {
    let mut items = iterable.iter_values()?;
    let mut failure = None;
    items.sort_by(|a, b| {
        compare(a, b).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    if let Some(err) = failure {
        return Err(err);
    }
    if reverse {
        // Reverse while keeping equal elements in their original order.
        items = stable_reverse(items);
    }
    Ok(Value::List(items))
}

fn stable_reverse(items: Vec<Value>) -> Vec<Value> {
    let mut runs: Vec<Vec<Value>> = Vec::new();
    for item in items {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| *last == item) => run.push(item),
            _ => runs.push(vec![item]),
        }
    }
    runs.into_iter().rev().flatten().collect()
}

pub fn reversed(iterable: &Value) -> Result<Value> {
    match iterable {
        Value::Set(_) => Err(SupportError::Type("'set' object is not reversible".into())),
        other => {
            let mut items = other.iter_values()?;
            items.reverse();
            Ok(Value::List(items))
        }
    }
}

pub fn any(iterable: &Value) -> Result<bool> {
    Ok(iterable.iter_values()?.iter().any(Value::is_truthy))
}

pub fn all(iterable: &Value) -> Result<bool> {
    Ok(iterable.iter_values()?.iter().all(Value::is_truthy))
}

pub fn list(iterable: Option<&Value>) -> Result<Value> {
    match iterable {
        Some(value) => Ok(Value::List(value.iter_values()?)),
        None => Ok(Value::List(Vec::new())),
    }
}

pub fn tuple(iterable: Option<&Value>) -> Result<Value> {
    match iterable {
        Some(value) => Ok(Value::Tuple(value.iter_values()?)),
        None => Ok(Value::Tuple(Vec::new())),
    }
}

pub fn set(iterable: Option<&Value>) -> Result<Value> {
    match iterable {
        Some(value) => Ok(Value::set(value.iter_values()?)),
        None => Ok(Value::Set(Vec::new())),
    }
}

/// `dict(mapping)` or `dict(pairs)`.
pub fn dict(source: Option<&Value>) -> Result<Value> {
    let Some(source) = source else {
        return Ok(Value::Dict(Vec::new()));
    };
    if let Value::Dict(entries) = source {
        return Ok(Value::Dict(entries.clone()));
    }
    let mut pairs = Vec::new();
    for (position, item) in source.iter_values()?.into_iter().enumerate() {
        match item {
            Value::List(pair) | Value::Tuple(pair) if pair.len() == 2 => {
                let mut pair = pair.into_iter();
                if let (Some(k), Some(v)) = (pair.next(), pair.next()) {
                    pairs.push((k, v));
                }
            }
            _ => {
                return Err(SupportError::Value(format!(
                    "dictionary update sequence element #{position} has wrong length"
                )));
            }
        }
    }
    Ok(Value::dict(pairs))
}

pub fn ord(value: &Value) -> Result<i64> {
    match value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(i64::from(u32::from(c))),
                _ => Err(SupportError::Type(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        other => Err(SupportError::Type(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

pub fn chr(code: i64) -> Result<String> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| SupportError::Value("chr() arg not in range(0x110000)".into()))
}

fn radix_text(value: i64, prefix: &str, digits: String) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{prefix}{digits}")
}

pub fn hex(value: i64) -> String {
    radix_text(value, "0x", format!("{:x}", value.unsigned_abs()))
}

pub fn oct(value: i64) -> String {
    radix_text(value, "0o", format!("{:o}", value.unsigned_abs()))
}

pub fn bin(value: i64) -> String {
    radix_text(value, "0b", format!("{:b}", value.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Int))
    }

    #[test]
    fn test_min_max_over_iterable_and_arguments() {
        assert_eq!(min(&[ints(&[3, 1, 2])]), Ok(Value::Int(1)));
        assert_eq!(max(&[Value::Int(3), Value::Float(4.5)]), Ok(Value::Float(4.5)));
        assert!(matches!(min(&[ints(&[])]), Err(SupportError::Value(_))));
    }

    #[test]
    fn test_sum_with_start() {
        assert_eq!(sum(&ints(&[1, 2, 3]), None), Ok(Value::Int(6)));
        assert_eq!(
            sum(&ints(&[1, 2]), Some(&Value::Float(0.5))),
            Ok(Value::Float(3.5))
        );
        assert!(sum(&ints(&[1]), Some(&Value::str(""))).is_err());
    }

    #[test]
    fn test_sorted_and_reverse() {
        assert_eq!(sorted(&ints(&[3, 1, 2]), false), Ok(ints(&[1, 2, 3])));
        assert_eq!(sorted(&ints(&[3, 1, 2]), true), Ok(ints(&[3, 2, 1])));
        let mixed = Value::list([Value::Int(1), Value::str("a")]);
        assert!(matches!(sorted(&mixed, false), Err(SupportError::Type(_))));
    }

    #[test]
    fn test_collection_constructors() {
        assert_eq!(
            list(Some(&Value::str("ab"))),
            Ok(Value::list([Value::str("a"), Value::str("b")]))
        );
        assert_eq!(set(Some(&ints(&[1, 1, 2]))), Ok(Value::set([Value::Int(1), Value::Int(2)])));
        let pairs = Value::list([Value::tuple([Value::str("a"), Value::Int(1)])]);
        assert_eq!(
            dict(Some(&pairs)),
            Ok(Value::dict([(Value::str("a"), Value::Int(1))]))
        );
        assert!(dict(Some(&ints(&[1]))).is_err());
    }

    #[test]
    fn test_character_and_radix_helpers() {
        assert_eq!(ord(&Value::str("A")), Ok(65));
        assert!(ord(&Value::str("AB")).is_err());
        assert_eq!(chr(97), Ok("a".to_string()));
        assert!(chr(-1).is_err());
        assert_eq!(hex(-255), "-0xff");
        assert_eq!(oct(8), "0o10");
        assert_eq!(bin(5), "0b101");
    }

    #[test]
    fn test_any_all_reversed() {
        assert_eq!(any(&ints(&[0, 0, 1])), Ok(true));
        assert_eq!(all(&ints(&[])), Ok(true));
        assert_eq!(reversed(&ints(&[1, 2])), Ok(ints(&[2, 1])));
    }
}
