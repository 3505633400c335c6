//! Sequence access: slicing, negative indexing, membership and length.

use crate::error::{Result, SupportError};
use crate::value::Value;

fn not_subscriptable(value: &Value) -> SupportError {
    SupportError::Type(format!("'{}' object is not subscriptable", value.type_name()))
}

/// Resolve slice bounds against a sequence length the way Python does,
/// returning the selected positions in order.
///
/// Omitted bounds are `None`. Out-of-range bounds clamp; they never error.
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(SupportError::Value("slice step cannot be zero".into()));
    }
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |bound: i64| -> i64 {
        if bound < 0 {
            let shifted = bound + len;
            if shifted < 0 {
                if step < 0 { -1 } else { 0 }
            } else {
                shifted
            }
        } else if bound >= len {
            if step < 0 { len - 1 } else { len }
        } else {
            bound
        }
    };
    let (start, stop) = if step > 0 {
        (start.map_or(0, clamp), stop.map_or(len, clamp))
    } else {
        (start.map_or(len - 1, clamp), stop.map_or(-1, clamp))
    };

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        positions.push(i as usize);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(positions)
}

/// `obj[start:stop:step]`, preserving the sequence type.
pub fn slice(
    value: &Value,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Value> {
    match value {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked = slice_indices(chars.len(), start, stop, step)?;
            Ok(Value::Str(picked.into_iter().map(|i| chars[i]).collect()))
        }
        Value::List(items) => {
            let picked = slice_indices(items.len(), start, stop, step)?;
            Ok(Value::List(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::Tuple(items) => {
            let picked = slice_indices(items.len(), start, stop, step)?;
            Ok(Value::Tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        other => Err(not_subscriptable(other)),
    }
}

fn resolve_index(len: usize, index: i64, what: &str) -> Result<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(SupportError::Index(format!("{what} index out of range")))
    }
}

/// `obj[index]` where negative indices count from the end. Dicts look up
/// the key instead.
pub fn index_at(value: &Value, index: &Value) -> Result<Value> {
    match value {
        Value::Dict(entries) => entries
            .iter()
            .find(|(key, _)| key == index)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| SupportError::Key(crate::coerce::repr(index))),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = resolve_index(chars.len(), index.as_index()?, "string")?;
            Ok(Value::Str(chars[i].to_string()))
        }
        Value::List(items) => {
            let i = resolve_index(items.len(), index.as_index()?, "list")?;
            Ok(items[i].clone())
        }
        Value::Tuple(items) => {
            let i = resolve_index(items.len(), index.as_index()?, "tuple")?;
            Ok(items[i].clone())
        }
        other => Err(not_subscriptable(other)),
    }
}

/// `item in container`.
pub fn is_in(item: &Value, container: &Value) -> Result<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(SupportError::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.contains(item)),
        Value::Dict(entries) => Ok(entries.iter().any(|(key, _)| key == item)),
        other => Err(SupportError::Type(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// `len(obj)`; strings count characters.
pub fn len(value: &Value) -> Result<usize> {
    match value {
        Value::Str(s) => Ok(s.chars().count()),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.len()),
        Value::Dict(entries) => Ok(entries.len()),
        other => Err(SupportError::Type(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Int))
    }

    #[test]
    fn test_slice_negative_start_takes_tail() {
        let xs = ints(&[1, 2, 3, 4, 5]);
        assert_eq!(slice(&xs, Some(-2), None, None), Ok(ints(&[4, 5])));
    }

    #[test]
    fn test_slice_full_reverse() {
        let xs = ints(&[1, 2, 3]);
        assert_eq!(slice(&xs, None, None, Some(-1)), Ok(ints(&[3, 2, 1])));
    }

    #[test]
    fn test_slice_clamps_out_of_range_bounds() {
        let xs = ints(&[1, 2, 3]);
        assert_eq!(slice(&xs, Some(-10), Some(10), None), Ok(ints(&[1, 2, 3])));
        assert_eq!(slice(&xs, Some(5), None, None), Ok(ints(&[])));
        assert_eq!(slice(&xs, Some(10), None, Some(-2)), Ok(ints(&[3, 1])));
    }

    #[test]
    fn test_slice_zero_step_is_value_error() {
        let err = slice(&ints(&[1]), None, None, Some(0)).unwrap_err();
        assert_eq!(err, SupportError::Value("slice step cannot be zero".into()));
    }

    #[test]
    fn test_slice_keeps_sequence_type() {
        assert_eq!(
            slice(&Value::str("hello"), Some(1), Some(-1), None),
            Ok(Value::str("ell"))
        );
        let t = Value::tuple([Value::Int(1), Value::Int(2)]);
        assert!(matches!(slice(&t, None, None, None), Ok(Value::Tuple(_))));
    }

    #[test]
    fn test_index_at_negative_and_out_of_range() {
        let xs = ints(&[1, 2, 3]);
        assert_eq!(index_at(&xs, &Value::Int(-1)), Ok(Value::Int(3)));
        assert!(matches!(
            index_at(&xs, &Value::Int(-4)),
            Err(SupportError::Index(_))
        ));
        let d = Value::dict([(Value::str("a"), Value::Int(1))]);
        assert!(matches!(index_at(&d, &Value::str("b")), Err(SupportError::Key(_))));
    }

    #[test]
    fn test_is_in_by_container_kind() {
        assert_eq!(is_in(&Value::str("ell"), &Value::str("hello")), Ok(true));
        assert_eq!(is_in(&Value::Int(2), &ints(&[1, 2])), Ok(true));
        let d = Value::dict([(Value::str("k"), Value::Int(9))]);
        assert_eq!(is_in(&Value::Int(9), &d), Ok(false));
        assert!(is_in(&Value::Int(1), &Value::str("1")).is_err());
    }
}
