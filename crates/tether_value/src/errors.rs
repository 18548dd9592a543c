//! Error types for conversions and wrapper operations.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries the typed data of each failure so callers can
//! match on the category instead of parsing strings. Factory functions
//! (e.g. `type_mismatch()`) are the public API: they populate both `kind`
//! and the rendered `message`.
//!
//! Operation context is prepended to the message, never to the kind:
//! `append: value of type string cannot be converted to type i64`.

use crate::suggest;
use crate::value::Value;

/// Result of a script-facing operation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
///
/// Every variant except `UnsupportedType` is an ordinary recoverable failure
/// that the script runtime reports to the script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Conversion
    #[error("unsupported native type {type_name}")]
    UnsupportedType { type_name: String },
    #[error("value of type {got} cannot be converted to type {want}")]
    TypeMismatch { got: String, want: String },
    #[error("value of type NoneType cannot be converted to non-nullable type {want}")]
    NotNullable { want: String },
    #[error("value {value} does not fit in type {want}")]
    NumericOverflow { value: String, want: String },
    #[error("value of type {got} cannot be converted to type {want}: {reason}")]
    Reinterpretation {
        got: String,
        want: String,
        reason: String,
    },

    // Calls
    #[error("{name}: got {got} arguments, want {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("{name}: got {got} arguments, want {min} to {max}")]
    ArityRangeMismatch {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("{name}: got {got} arguments, want at least {min}")]
    VariadicArityMismatch { name: String, min: usize, got: usize },
    #[error("{name}: unexpected keyword arguments")]
    UnexpectedKeywords { name: String },
    #[error("{type_name} is not callable")]
    NotCallable { type_name: String },
    #[error("{message}")]
    Host { message: String },

    // Access
    #[error("{type_name} index: got {got}, want int")]
    InvalidIndexType { type_name: String, got: String },
    #[error("{type_name} index {index} out of range [{low}:{high}]")]
    IndexOutOfRange {
        type_name: String,
        index: i128,
        low: i64,
        high: i64,
    },
    #[error("key {key} not found")]
    KeyNotFound { key: String },
    #[error("element {value} not found")]
    ElementNotFound { value: String },
    #[error("value {value} not in list")]
    ValueNotFound { value: String },
    #[error("{type_name} has no .{name} field or method{hint}")]
    AttributeNotFound {
        type_name: String,
        name: String,
        hint: String,
    },
    #[error("{type_name} has no method .{method}")]
    NoSuchMethod { type_name: String, method: String },
    #[error("{name} is not a settable field")]
    NotAssignable { name: String },
    #[error("{type_name} no longer refers to a struct value")]
    StaleReference { type_name: String },

    // Capabilities
    #[error("unhashable type: {type_name}")]
    NotHashable { type_name: String },
    #[error("argument is not iterable: {value} ({type_name})")]
    NotIterable { value: String, type_name: String },

    // Mutation
    #[error("cannot {action} frozen {noun}")]
    Frozen { action: String, noun: String },
    #[error("cannot {action} {noun} during iteration")]
    DuringIteration { action: String, noun: String },
    #[error("cannot {action} fixed-length {type_name}")]
    FixedLength { action: String, type_name: String },

    /// Catch-all for failures without a dedicated category.
    #[error("{message}")]
    Custom { message: String },
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message, including any operation context prefixes.
    pub message: String,
    /// Secondary information, such as the value that failed to convert.
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            notes: Vec::new(),
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            notes: Vec::new(),
        }
    }

    /// Prefix the message with the operation that failed.
    #[must_use]
    pub fn with_context(mut self, operation: &str) -> Self {
        self.message = format!("{operation}: {}", self.message);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Unsupported native kinds abort the whole conversion they occur in.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::UnsupportedType { .. })
    }
}

// Conversion Errors

/// Native kind with no script representation (channels, raw handles).
#[cold]
pub fn unsupported_type(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedType {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn type_mismatch(got: &str, want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        got: got.to_string(),
        want: want.to_string(),
    })
}

/// `None` passed where the native type has no nil.
#[cold]
pub fn not_nullable(want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotNullable {
        want: want.to_string(),
    })
}

#[cold]
pub fn numeric_overflow(value: &str, want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NumericOverflow {
        value: value.to_string(),
        want: want.to_string(),
    })
}

/// A script container nested inside a container being coerced.
#[cold]
pub fn nested_container(got: &str, want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Reinterpretation {
        got: got.to_string(),
        want: want.to_string(),
        reason: "nested containers are not reinterpreted".to_string(),
    })
}

/// A list whose elements are of different kinds, coerced into a dynamic slice.
#[cold]
pub fn mixed_elements(got: &str, want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Reinterpretation {
        got: got.to_string(),
        want: want.to_string(),
        reason: "elements are of mixed types".to_string(),
    })
}

// Call Errors

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn arity_range_mismatch(name: &str, min: usize, max: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityRangeMismatch {
        name: name.to_string(),
        min,
        max,
        got,
    })
}

/// Too few arguments for a function whose last parameter is variadic.
#[cold]
pub fn variadic_arity_mismatch(name: &str, min: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariadicArityMismatch {
        name: name.to_string(),
        min,
        got,
    })
}

#[cold]
pub fn unexpected_keywords(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnexpectedKeywords {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

/// Non-nil error returned by a host function.
#[cold]
pub fn host_error(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host {
        message: message.to_string(),
    })
}

// Access Errors

#[cold]
pub fn invalid_index_type(type_name: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIndexType {
        type_name: type_name.to_string(),
        got: got.to_string(),
    })
}

/// Index outside `[-len, len)`. The message names the valid range.
#[cold]
pub fn index_out_of_range(type_name: &str, index: i128, len: usize) -> EvalError {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange {
        type_name: type_name.to_string(),
        index,
        low: -len,
        high: len - 1,
    })
}

#[cold]
pub fn key_not_found(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

#[cold]
pub fn element_not_found(value: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ElementNotFound {
        value: value.to_string(),
    })
}

#[cold]
pub fn value_not_found(value: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ValueNotFound {
        value: value.to_string(),
    })
}

/// Unknown attribute, with a "did you mean" hint drawn from `candidates`.
#[cold]
pub fn attribute_not_found(type_name: &str, name: &str, candidates: &[String]) -> EvalError {
    let hint = suggest::suggest_similar(name, candidates.iter().map(String::as_str))
        .map(|best| format!(" (did you mean .{best}?)"))
        .unwrap_or_default();
    EvalError::from_kind(EvalErrorKind::AttributeNotFound {
        type_name: type_name.to_string(),
        name: name.to_string(),
        hint,
    })
}

#[cold]
pub fn no_such_method(type_name: &str, method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMethod {
        type_name: type_name.to_string(),
        method: method.to_string(),
    })
}

/// Field exists but the wrapped struct is a copy.
#[cold]
pub fn not_assignable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAssignable {
        name: name.to_string(),
    })
}

/// A field path that no longer resolves, e.g. after the host replaced a
/// nested struct with a different kind of value.
#[cold]
pub fn stale_reference(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StaleReference {
        type_name: type_name.to_string(),
    })
}

// Capability Errors

#[cold]
pub fn not_hashable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotHashable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_iterable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIterable {
        value: value.to_string(),
        type_name: value.type_name().into_owned(),
    })
}

// Mutation Errors

/// Mutation of a frozen container: `cannot append to frozen slice`.
#[cold]
pub fn frozen_violation(action: &str, noun: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Frozen {
        action: action.to_string(),
        noun: noun.to_string(),
    })
}

/// Mutation while an iterator is live: `cannot append to slice during iteration`.
#[cold]
pub fn mutation_during_iteration(action: &str, noun: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuringIteration {
        action: action.to_string(),
        noun: noun.to_string(),
    })
}

/// Length-changing operation on a fixed-size array.
#[cold]
pub fn fixed_length_violation(action: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FixedLength {
        action: action.to_string(),
        type_name: type_name.to_string(),
    })
}
