//! The closed set of names translated code may import from the runtime
//! module.

use std::cmp::Ordering;
use std::fmt;

/// Module specifier emitted by default for the runtime import.
pub const DEFAULT_MODULE: &str = "@pyts/runtime";

macro_rules! primitives {
    ($($variant:ident => $name:literal, $exception:literal;)*) => {
        /// A support primitive: a function or exception class exported by
        /// the runtime module under [`Primitive::name`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Primitive {
            $($variant,)*
        }

        impl Primitive {
            pub const ALL: &'static [Primitive] = &[$(Primitive::$variant,)*];

            /// Exported name in the runtime module.
            pub fn name(self) -> &'static str {
                match self {
                    $(Primitive::$variant => $name,)*
                }
            }

            /// Whether the export is an exception class rather than a function.
            pub fn is_exception(self) -> bool {
                match self {
                    $(Primitive::$variant => $exception,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Primitive> {
                match name {
                    $($name => Some(Primitive::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

primitives! {
    FloorDiv => "floordiv", false;
    Mod => "mod", false;
    Pow => "pow", false;
    Slice => "slice", false;
    At => "at", false;
    IsIn => "isIn", false;
    Range => "range", false;
    Enumerate => "enumerate", false;
    Zip => "zip", false;
    Len => "len", false;
    Str => "str", false;
    Repr => "repr", false;
    Int => "int", false;
    Float => "float", false;
    Bool => "bool", false;
    Format => "format", false;
    Print => "print", false;
    Abs => "abs", false;
    Min => "min", false;
    Max => "max", false;
    Sum => "sum", false;
    Sorted => "sorted", false;
    Reversed => "reversed", false;
    Any => "any", false;
    All => "all", false;
    Round => "round", false;
    DivMod => "divmod", false;
    List => "list", false;
    Dict => "dict", false;
    Set => "set", false;
    Tuple => "tuple", false;
    Ord => "ord", false;
    Chr => "chr", false;
    Hex => "hex", false;
    Oct => "oct", false;
    Bin => "bin", false;
    Exception => "Exception", true;
    ValueError => "ValueError", true;
    TypeError => "TypeError", true;
    KeyError => "KeyError", true;
    IndexError => "IndexError", true;
    RuntimeError => "RuntimeError", true;
    ZeroDivisionError => "ZeroDivisionError", true;
    NotImplementedError => "NotImplementedError", true;
    AssertionError => "AssertionError", true;
    StopIteration => "StopIteration", true;
    AttributeError => "AttributeError", true;
}

impl Primitive {
    /// The primitive a Python builtin call lowers to, if any.
    pub fn for_builtin(name: &str) -> Option<Primitive> {
        match name {
            "BaseException" => Some(Primitive::Exception),
            "divmod" => Some(Primitive::DivMod),
            other => Primitive::from_name(other).filter(|p| {
                !matches!(
                    p,
                    Primitive::FloorDiv
                        | Primitive::Mod
                        | Primitive::Slice
                        | Primitive::At
                        | Primitive::IsIn
                )
            }),
        }
    }
}

/// Ordered by exported name so import lists come out sorted.
impl Ord for Primitive {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl PartialOrd for Primitive {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_round_trip() {
        let mut seen = HashSet::new();
        for primitive in Primitive::ALL {
            assert!(seen.insert(primitive.name()), "duplicate {}", primitive.name());
            assert_eq!(Primitive::from_name(primitive.name()), Some(*primitive));
        }
    }

    #[test]
    fn test_builtin_lookup_excludes_operator_helpers() {
        assert_eq!(Primitive::for_builtin("len"), Some(Primitive::Len));
        assert_eq!(Primitive::for_builtin("pow"), Some(Primitive::Pow));
        assert_eq!(Primitive::for_builtin("isIn"), None);
        assert_eq!(Primitive::for_builtin("BaseException"), Some(Primitive::Exception));
        assert_eq!(Primitive::for_builtin("open"), None);
    }

    #[test]
    fn test_ordering_follows_names() {
        let mut names = vec![Primitive::Slice, Primitive::FloorDiv, Primitive::ValueError];
        names.sort();
        assert_eq!(names, vec![Primitive::ValueError, Primitive::FloorDiv, Primitive::Slice]);
    }
}
