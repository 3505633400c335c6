//! Invariants every runtime implementation of the primitives must satisfy.

use pyts_runtime::{Primitive, SupportError, Value, call};

fn int(i: i64) -> Value {
    Value::Int(i)
}

#[test]
fn floordiv_and_mod_reconstruct_the_dividend() {
    for a in -25..=25 {
        for b in (-7..=7).filter(|b| *b != 0) {
            let q = call(Primitive::FloorDiv, &[int(a), int(b)]).unwrap();
            let r = call(Primitive::Mod, &[int(a), int(b)]).unwrap();
            let (Value::Int(q), Value::Int(r)) = (q, r) else {
                panic!("integer operands must give integer results");
            };
            assert_eq!(q * b + r, a, "{a} // {b} and {a} % {b}");
            assert!(r == 0 || (r < 0) == (b < 0), "{a} % {b} = {r} has wrong sign");
        }
    }
}

#[test]
fn zero_divisor_raises_zero_division_error() {
    for primitive in [Primitive::FloorDiv, Primitive::Mod] {
        let err = call(primitive, &[int(3), int(0)]).unwrap_err();
        assert_eq!(err.exception_name(), "ZeroDivisionError");
    }
}

#[test]
fn slice_tail_and_reverse() {
    let xs = Value::list((1..=6).map(int));
    assert_eq!(
        call(Primitive::Slice, &[xs.clone(), int(-2), Value::None, Value::None]).unwrap(),
        Value::list([int(5), int(6)])
    );
    assert_eq!(
        call(Primitive::Slice, &[xs.clone(), Value::None, Value::None, int(-1)]).unwrap(),
        Value::list((1..=6).rev().map(int))
    );
    assert!(matches!(
        call(Primitive::Slice, &[xs, Value::None, Value::None, int(0)]),
        Err(SupportError::Value(_))
    ));
}

#[test]
fn slice_length_never_exceeds_source() {
    let xs = Value::list((0..5).map(int));
    for start in -7..=7 {
        for stop in -7..=7 {
            for step in [-3, -1, 1, 2] {
                let out = call(Primitive::Slice, &[xs.clone(), int(start), int(stop), int(step)])
                    .unwrap();
                let Value::List(items) = out else {
                    panic!("slicing a list must give a list");
                };
                assert!(items.len() <= 5);
            }
        }
    }
}

#[test]
fn format_width_is_a_lower_bound() {
    for width in 0..10 {
        for value in [int(7), int(-12345), Value::Float(2.5), Value::str("abc")] {
            for align in ["<", ">", "^"] {
                let spec = Value::str(format!("{align}{width}"));
                let Value::Str(out) = call(Primitive::Format, &[value.clone(), spec]).unwrap()
                else {
                    panic!("format must give a string");
                };
                let Value::Str(plain) = call(Primitive::Str, &[value.clone()]).unwrap() else {
                    panic!("str must give a string");
                };
                assert_eq!(out.chars().count(), width.max(plain.chars().count()));
            }
        }
    }
}

#[test]
fn str_and_repr_follow_python_conventions() {
    let nested = Value::list([
        Value::None,
        Value::Bool(true),
        Value::str("x"),
        Value::tuple([Value::Float(1.0)]),
    ]);
    assert_eq!(
        call(Primitive::Str, &[nested]).unwrap(),
        Value::str("[None, True, 'x', (1.0,)]")
    );
    assert_eq!(
        call(Primitive::Repr, &[Value::str("x")]).unwrap(),
        Value::str("'x'")
    );
}

#[test]
fn lazy_helpers_materialize_through_call() {
    let pairs = call(
        Primitive::Enumerate,
        &[Value::list([Value::str("a"), Value::str("b")]), int(1)],
    )
    .unwrap();
    assert_eq!(
        pairs,
        Value::list([
            Value::tuple([int(1), Value::str("a")]),
            Value::tuple([int(2), Value::str("b")]),
        ])
    );
    let zipped = call(
        Primitive::Zip,
        &[Value::list([int(1), int(2), int(3)]), Value::str("xy")],
    )
    .unwrap();
    assert_eq!(
        zipped,
        Value::list([
            Value::tuple([int(1), Value::str("x")]),
            Value::tuple([int(2), Value::str("y")]),
        ])
    );
}
