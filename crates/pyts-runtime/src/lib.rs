//! Semantic-support primitives for translated Python code.
//!
//! Translated TypeScript imports a fixed set of helpers (see [`Primitive`])
//! wherever Python semantics differ from the target's native operators:
//! flooring division, sign-of-divisor modulo, slicing with negative
//! indices, lazy ranges, Python-style stringification and the `format()`
//! mini-language. This crate is the executable reference for that
//! contract: every primitive is implemented here over the dynamic
//! [`Value`] type, with failures reported as [`SupportError`] variants
//! named after the Python exception they model.
//!
//! # Example
//!
//! ```
//! use pyts_runtime::{Primitive, Value, call};
//!
//! let q = call(Primitive::FloorDiv, &[Value::Int(-7), Value::Int(2)]).unwrap();
//! assert_eq!(q, Value::Int(-4));
//! ```

pub mod arith;
pub mod builtins;
pub mod coerce;
mod error;
pub mod format;
pub mod iter;
mod primitive;
pub mod sequence;
mod value;

pub use error::{Result, SupportError};
pub use primitive::{DEFAULT_MODULE, Primitive};
pub use value::{Number, Value, compare};

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(SupportError::Type(format!(
            "{name}() takes {expected} arguments ({} given)",
            args.len()
        )));
    }
    Ok(())
}

/// `None` (the emitted `undefined`) means "omitted".
fn optional_index(value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(other) => other.as_index().map(Some),
    }
}

fn modular_pow(base: i64, exp: i64, modulus: i64) -> Result<Value> {
    if modulus == 0 {
        return Err(SupportError::Value("pow() 3rd argument cannot be 0".into()));
    }
    if exp < 0 {
        return Err(SupportError::Value(
            "pow() 2nd argument cannot be negative when 3rd argument specified".into(),
        ));
    }
    let m = i128::from(modulus);
    let mut result: i128 = 1;
    let mut b = i128::from(base).rem_euclid(m);
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        e >>= 1;
    }
    // Python's result takes the sign of the modulus.
    let r = result.rem_euclid(m.abs());
    let r = if modulus < 0 && r != 0 { r + m } else { r };
    Ok(Value::Int(r as i64))
}

/// Invoke a primitive dynamically, the way emitted code calls it.
///
/// Lazy iterables (`range`, `enumerate`, `zip`) are materialized into
/// lists here. Calling an exception primitive yields that exception as the
/// error, which is what `throw new ValueError(msg)` produces at runtime.
pub fn call(primitive: Primitive, args: &[Value]) -> Result<Value> {
    let name = primitive.name();
    match primitive {
        Primitive::FloorDiv => {
            arity(name, args, 2, 2)?;
            arith::floordiv(&args[0], &args[1])
        }
        Primitive::Mod => {
            arity(name, args, 2, 2)?;
            arith::modulo(&args[0], &args[1])
        }
        Primitive::Pow => {
            arity(name, args, 2, 3)?;
            match args.get(2) {
                Some(m) => modular_pow(args[0].as_index()?, args[1].as_index()?, m.as_index()?),
                None => arith::power(&args[0], &args[1]),
            }
        }
        Primitive::Slice => {
            arity(name, args, 1, 4)?;
            sequence::slice(
                &args[0],
                optional_index(args.get(1))?,
                optional_index(args.get(2))?,
                optional_index(args.get(3))?,
            )
        }
        Primitive::At => {
            arity(name, args, 2, 2)?;
            sequence::index_at(&args[0], &args[1])
        }
        Primitive::IsIn => {
            arity(name, args, 2, 2)?;
            sequence::is_in(&args[0], &args[1]).map(Value::Bool)
        }
        Primitive::Range => {
            let range = match args {
                [stop] => iter::range_to(stop.as_index()?),
                [start, stop] => iter::range(start.as_index()?, stop.as_index()?, 1)?,
                [start, stop, step] => {
                    iter::range(start.as_index()?, stop.as_index()?, step.as_index()?)?
                }
                _ => return arity(name, args, 1, 3).map(|()| Value::None),
            };
            Ok(Value::List(range.map(Value::Int).collect()))
        }
        Primitive::Enumerate => {
            arity(name, args, 1, 2)?;
            let start = optional_index(args.get(1))?.unwrap_or(0);
            let items = args[0].iter_values()?;
            Ok(Value::List(
                iter::enumerate(items, start)
                    .map(|(i, v)| Value::Tuple(vec![Value::Int(i), v]))
                    .collect(),
            ))
        }
        Primitive::Zip => {
            let inputs = args
                .iter()
                .map(Value::iter_values)
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(iter::zip(inputs).map(Value::Tuple).collect()))
        }
        Primitive::Len => {
            arity(name, args, 1, 1)?;
            sequence::len(&args[0]).map(|n| Value::Int(n as i64))
        }
        Primitive::Str => {
            arity(name, args, 0, 1)?;
            Ok(Value::Str(args.first().map(coerce::to_str).unwrap_or_default()))
        }
        Primitive::Repr => {
            arity(name, args, 1, 1)?;
            Ok(Value::Str(coerce::repr(&args[0])))
        }
        Primitive::Int => {
            arity(name, args, 0, 2)?;
            let Some(value) = args.first() else {
                return Ok(Value::Int(0));
            };
            let base = match args.get(1) {
                Some(base) => Some(u32::try_from(base.as_index()?).map_err(|_| {
                    SupportError::Value("int() base must be >= 2 and <= 36, or 0".into())
                })?),
                None => None,
            };
            coerce::to_int(value, base).map(Value::Int)
        }
        Primitive::Float => {
            arity(name, args, 0, 1)?;
            match args.first() {
                Some(value) => coerce::to_float(value).map(Value::Float),
                None => Ok(Value::Float(0.0)),
            }
        }
        Primitive::Bool => {
            arity(name, args, 0, 1)?;
            Ok(Value::Bool(args.first().is_some_and(coerce::to_bool)))
        }
        Primitive::Format => {
            arity(name, args, 1, 2)?;
            let spec = match args.get(1) {
                Some(Value::Str(spec)) => spec.as_str(),
                Some(other) => {
                    return Err(SupportError::Type(format!(
                        "format() argument 2 must be str, not {}",
                        other.type_name()
                    )));
                }
                None => "",
            };
            format::format_value(&args[0], spec).map(Value::Str)
        }
        Primitive::Print => Ok(Value::Str(format::print_line(args, " ", "\n"))),
        Primitive::Abs => {
            arity(name, args, 1, 1)?;
            arith::abs(&args[0])
        }
        Primitive::Min => builtins::min(args),
        Primitive::Max => builtins::max(args),
        Primitive::Sum => {
            arity(name, args, 1, 2)?;
            builtins::sum(&args[0], args.get(1))
        }
        Primitive::Sorted => {
            arity(name, args, 1, 2)?;
            builtins::sorted(&args[0], args.get(1).is_some_and(Value::is_truthy))
        }
        Primitive::Reversed => {
            arity(name, args, 1, 1)?;
            builtins::reversed(&args[0])
        }
        Primitive::Any => {
            arity(name, args, 1, 1)?;
            builtins::any(&args[0]).map(Value::Bool)
        }
        Primitive::All => {
            arity(name, args, 1, 1)?;
            builtins::all(&args[0]).map(Value::Bool)
        }
        Primitive::Round => {
            arity(name, args, 1, 2)?;
            arith::round(&args[0], optional_index(args.get(1))?)
        }
        Primitive::DivMod => {
            arity(name, args, 2, 2)?;
            arith::divmod(&args[0], &args[1])
        }
        Primitive::List => {
            arity(name, args, 0, 1)?;
            builtins::list(args.first())
        }
        Primitive::Dict => {
            arity(name, args, 0, 1)?;
            builtins::dict(args.first())
        }
        Primitive::Set => {
            arity(name, args, 0, 1)?;
            builtins::set(args.first())
        }
        Primitive::Tuple => {
            arity(name, args, 0, 1)?;
            builtins::tuple(args.first())
        }
        Primitive::Ord => {
            arity(name, args, 1, 1)?;
            builtins::ord(&args[0]).map(Value::Int)
        }
        Primitive::Chr => {
            arity(name, args, 1, 1)?;
            builtins::chr(args[0].as_index()?).map(Value::Str)
        }
        Primitive::Hex => {
            arity(name, args, 1, 1)?;
            Ok(Value::Str(builtins::hex(args[0].as_index()?)))
        }
        Primitive::Oct => {
            arity(name, args, 1, 1)?;
            Ok(Value::Str(builtins::oct(args[0].as_index()?)))
        }
        Primitive::Bin => {
            arity(name, args, 1, 1)?;
            Ok(Value::Str(builtins::bin(args[0].as_index()?)))
        }
        Primitive::Exception
        | Primitive::ValueError
        | Primitive::TypeError
        | Primitive::KeyError
        | Primitive::IndexError
        | Primitive::RuntimeError
        | Primitive::ZeroDivisionError
        | Primitive::NotImplementedError
        | Primitive::AssertionError
        | Primitive::StopIteration
        | Primitive::AttributeError => {
            let message = args.first().map(coerce::to_str).unwrap_or_default();
            Err(raise(primitive, message))
        }
    }
}

/// The error an exception primitive represents.
fn raise(exception: Primitive, message: String) -> SupportError {
    match exception {
        Primitive::ValueError => SupportError::Value(message),
        Primitive::TypeError => SupportError::Type(message),
        Primitive::KeyError => SupportError::Key(message),
        Primitive::IndexError => SupportError::Index(message),
        Primitive::RuntimeError => SupportError::Runtime(message),
        Primitive::ZeroDivisionError => SupportError::ZeroDivision(message),
        Primitive::NotImplementedError => SupportError::NotImplemented(message),
        Primitive::AssertionError => SupportError::Assertion(message),
        Primitive::StopIteration => SupportError::StopIteration(message),
        Primitive::AttributeError => SupportError::Attribute(message),
        _ => SupportError::Exception(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_materializes_range() {
        let out = call(Primitive::Range, &[Value::Int(5), Value::Int(0), Value::Int(-2)]).unwrap();
        assert_eq!(out, Value::list([Value::Int(5), Value::Int(3), Value::Int(1)]));
    }

    #[test]
    fn test_call_slice_treats_none_as_omitted() {
        let xs = Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]);
        let out = call(
            Primitive::Slice,
            &[xs, Value::None, Value::None, Value::Int(-1)],
        )
        .unwrap();
        assert_eq!(out, Value::list([Value::Int(3), Value::Int(2), Value::Int(1)]));
    }

    #[test]
    fn test_call_exception_raises_it() {
        let err = call(Primitive::ValueError, &[Value::str("bad")]).unwrap_err();
        assert_eq!(err, SupportError::Value("bad".into()));
    }

    #[test]
    fn test_call_checks_arity() {
        assert!(matches!(
            call(Primitive::Len, &[]),
            Err(SupportError::Type(_))
        ));
    }

    #[test]
    fn test_modular_pow_sign_follows_modulus() {
        assert_eq!(
            call(Primitive::Pow, &[Value::Int(3), Value::Int(4), Value::Int(5)]),
            Ok(Value::Int(1))
        );
        assert_eq!(
            call(Primitive::Pow, &[Value::Int(3), Value::Int(1), Value::Int(-5)]),
            Ok(Value::Int(-2))
        );
    }

    #[test]
    fn test_every_function_primitive_is_callable() {
        for primitive in Primitive::ALL.iter().filter(|p| !p.is_exception()) {
            let err = call(*primitive, &[]);
            // Zero arguments either succeed or fail with an argument error;
            // none may panic.
            if let Err(err) = err {
                assert!(matches!(err, SupportError::Type(_) | SupportError::Value(_)));
            }
        }
    }
}
