//! Errors raised by support primitives.

/// Error raised by a primitive. Each variant models the Python exception of
/// the same name so translated code observes the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupportError {
    #[error("Exception: {0}")]
    Exception(String),

    #[error("ValueError: {0}")]
    Value(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("IndexError: {0}")]
    Index(String),

    #[error("KeyError: {0}")]
    Key(String),

    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),

    #[error("OverflowError: {0}")]
    Overflow(String),

    #[error("RuntimeError: {0}")]
    Runtime(String),

    #[error("NotImplementedError: {0}")]
    NotImplemented(String),

    #[error("AssertionError: {0}")]
    Assertion(String),

    #[error("StopIteration: {0}")]
    StopIteration(String),

    #[error("AttributeError: {0}")]
    Attribute(String),
}

impl SupportError {
    /// Name of the Python exception class this error models.
    pub fn exception_name(&self) -> &'static str {
        match self {
            SupportError::Exception(_) => "Exception",
            SupportError::Value(_) => "ValueError",
            SupportError::Type(_) => "TypeError",
            SupportError::Index(_) => "IndexError",
            SupportError::Key(_) => "KeyError",
            SupportError::ZeroDivision(_) => "ZeroDivisionError",
            SupportError::Overflow(_) => "OverflowError",
            SupportError::Runtime(_) => "RuntimeError",
            SupportError::NotImplemented(_) => "NotImplementedError",
            SupportError::Assertion(_) => "AssertionError",
            SupportError::StopIteration(_) => "StopIteration",
            SupportError::Attribute(_) => "AttributeError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SupportError::Exception(m)
            | SupportError::Value(m)
            | SupportError::Type(m)
            | SupportError::Index(m)
            | SupportError::Key(m)
            | SupportError::ZeroDivision(m)
            | SupportError::Overflow(m)
            | SupportError::Runtime(m)
            | SupportError::NotImplemented(m)
            | SupportError::Assertion(m)
            | SupportError::StopIteration(m)
            | SupportError::Attribute(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, SupportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_python_exception_name() {
        let err = SupportError::ZeroDivision("integer division or modulo by zero".into());
        assert_eq!(
            err.to_string(),
            "ZeroDivisionError: integer division or modulo by zero"
        );
        assert_eq!(err.exception_name(), "ZeroDivisionError");
        assert_eq!(err.message(), "integer division or modulo by zero");
    }
}
