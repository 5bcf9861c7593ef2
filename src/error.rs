//! Failure values returned by transform construction, evaluation and operators.
use std::{fmt, panic::Location};

use crate::IndexTransform;

/// Status code of a [TransformError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller asked for something the transform cannot represent or tolerate.
    InvalidArgument,
    /// A coordinate, bound or computed index fell outside its valid range.
    OutOfRange,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => f.write_str("INVALID_ARGUMENT"),
            ErrorKind::OutOfRange => f.write_str("OUT_OF_RANGE"),
        }
    }
}

/// A described failure, annotated with the source location which raised it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransformError {
    kind: ErrorKind,
    message: String,
    location: &'static Location<'static>,
}

impl TransformError {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    #[track_caller]
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where in this crate the failure was raised.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Prefix the message with some context, keeping the kind and location.
    pub(crate) fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}

/// A mutation operator refused to run.
///
/// Operators validate everything before writing anything,
/// so the transform handed back here is exactly the one which was passed in.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Rejected {
    pub transform: IndexTransform,
    pub error: TransformError,
}

impl Rejected {
    pub fn into_parts(self) -> (IndexTransform, TransformError) {
        (self.transform, self.error)
    }
}

impl From<Rejected> for TransformError {
    fn from(value: Rejected) -> Self {
        value.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TransformError::invalid_argument("bad dimension 3");
        assert_eq!(err.to_string(), "INVALID_ARGUMENT: bad dimension 3");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_location_is_caller() {
        let line = line!() + 1;
        let err = TransformError::out_of_range("index 12");
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.location().line(), line);
    }

    #[test]
    fn test_context() {
        let err = TransformError::out_of_range("index 12").context("output dimension 0");
        assert_eq!(err.message(), "output dimension 0: index 12");
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_rejected_into_error() {
        let transform = IndexTransform::identity(1);
        let rejected = Rejected {
            transform: transform.clone(),
            error: TransformError::invalid_argument("nope"),
        };
        assert_eq!(rejected.to_string(), "INVALID_ARGUMENT: nope");
        let (returned, err) = rejected.into_parts();
        assert!(returned.shares_rep_with(&transform));
        assert_eq!(err.message(), "nope");
    }
}
