//! Tri-state parse results
//!
//! Every validation and parse path in the engine reports through
//! [`ParseResult`] instead of `Result`/panic: a parse either succeeds,
//! recovers with a fallback value, or fails hard. Callers that only care
//! about acceptance can use [`ParseResult::is_accepted`] on boolean
//! results.

use thiserror::Error;

/// Error produced by scalar parsing and value validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Text cannot be read as the expected scalar kind at all.
    #[error("malformed {expected} value: `{text}`")]
    Malformed {
        /// Name of the scalar kind that was expected.
        expected: &'static str,
        /// The offending input text.
        text: String,
    },

    /// Text is well-formed but rejected by a filter or constrained catalog.
    #[error("invalid value `{text}`: {reason}")]
    Validation {
        /// The offending input text.
        text: String,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// Decoded field count does not match the declared compound schema.
    #[error("expected {expected} fields, found {found}")]
    StructuralMismatch {
        /// Declared field count.
        expected: usize,
        /// Fields actually present in the input.
        found: usize,
    },
}

impl ParseError {
    /// Create a malformed-scalar error.
    pub fn malformed(expected: &'static str, text: impl Into<String>) -> Self {
        Self::Malformed {
            expected,
            text: text.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of parsing or validating one unit of configuration text.
///
/// `Partial` carries both a usable fallback value and the error that was
/// tolerated to produce it; `Failure` means the unit is unusable as-is and
/// the caller must keep its prior value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<T> {
    /// Parsed cleanly.
    Success(T),
    /// Recovered with a fallback value; the error explains what was lost.
    Partial {
        /// The fallback value.
        value: T,
        /// The tolerated error.
        error: ParseError,
    },
    /// Unusable input.
    Failure(ParseError),
}

impl<T> ParseResult<T> {
    /// Shorthand for [`ParseResult::Success`].
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Shorthand for [`ParseResult::Partial`].
    pub fn partial(value: T, error: ParseError) -> Self {
        Self::Partial { value, error }
    }

    /// Shorthand for [`ParseResult::Failure`].
    pub fn failure(error: ParseError) -> Self {
        Self::Failure(error)
    }

    /// The carried value, if any (present for `Success` and `Partial`).
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) | Self::Partial { value, .. } => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Consume the result, yielding the carried value if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) | Self::Partial { value, .. } => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The carried error, if any (present for `Partial` and `Failure`).
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Success(_) => None,
            Self::Partial { error, .. } | Self::Failure(error) => Some(error),
        }
    }

    /// Whether any error was recorded, recovered or not.
    pub fn has_error(&self) -> bool {
        !matches!(self, Self::Success(_))
    }

    /// Whether the parse succeeded without any recorded error.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Map the carried value, preserving the error state.
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            Self::Success(value) => ParseResult::Success(op(value)),
            Self::Partial { value, error } => ParseResult::Partial {
                value: op(value),
                error,
            },
            Self::Failure(error) => ParseResult::Failure(error),
        }
    }

    /// Re-type a result while keeping only its error.
    ///
    /// Panics if the result has no error; use when propagating a known
    /// failure from a differently-typed parse step.
    pub fn only_error<U>(self) -> ParseResult<U> {
        match self {
            Self::Partial { error, .. } | Self::Failure(error) => ParseResult::Failure(error),
            Self::Success(_) => panic!("only_error called on a successful ParseResult"),
        }
    }
}

impl ParseResult<bool> {
    /// Whether this validation outcome permits the candidate.
    ///
    /// A `Partial` carrying `true` still permits; errors and `false` do not.
    pub fn is_accepted(&self) -> bool {
        self.value().copied().unwrap_or(false)
    }
}
