use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure surfaced by the buffer, its readers, and its collaborators
/// is funneled through this type.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    /// Construct an InternalError from its classification and message.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a buffer-origin invalid-argument error.
    pub(crate) fn buffer_invalid_argument(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Buffer,
            message.into(),
        )
    }

    /// Construct an include-origin invalid-argument error.
    pub(crate) fn include_invalid_argument(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Include,
            message.into(),
        )
    }

    /// Construct a key-origin invalid-argument error.
    pub(crate) fn key_invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Key, message.into())
    }

    /// Construct a buffer-origin not-found error.
    pub(crate) fn buffer_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Buffer, message.into())
    }

    /// Construct an include-origin not-found error.
    pub(crate) fn include_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Include, message.into())
    }

    /// Construct a buffer-origin invariant violation.
    pub(crate) fn buffer_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Buffer,
            message.into(),
        )
    }

    /// Construct an include-origin invariant violation.
    pub(crate) fn include_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Include,
            message.into(),
        )
    }

    /// Construct a materializer-origin unsupported error.
    pub(crate) fn materializer_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Materializer,
            message.into(),
        )
    }

    /// Construct the error returned when an async include is cancelled.
    pub(crate) fn include_cancelled(navigation: &str, wired: usize) -> Self {
        Self::new(
            ErrorClass::Cancelled,
            ErrorOrigin::Include,
            format!("include of '{navigation}' cancelled after {wired} related rows"),
        )
    }

    /// Construct a standardized error for an instance the buffer never produced.
    pub fn unknown_instance(context: &str) -> Self {
        Self::buffer_not_found(format!(
            "{context}: instance was not produced by this buffer and is not tracked"
        ))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.class, ErrorClass::Cancelled)
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self.class, ErrorClass::InvalidArgument)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArgument,
    NotFound,
    Unsupported,
    InvariantViolation,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Buffer,
    Key,
    Reader,
    Materializer,
    Tracker,
    Accessor,
    Include,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buffer => "buffer",
            Self::Key => "key",
            Self::Reader => "reader",
            Self::Materializer => "materializer",
            Self::Tracker => "tracker",
            Self::Accessor => "accessor",
            Self::Include => "include",
        };
        write!(f, "{label}")
    }
}
