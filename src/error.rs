//! Error types for the reduced model and its document driver.

use std::fmt;

/// Result type alias for reduced model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Direction of a relative movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Backward => f.write_str("backward"),
        }
    }
}

/// Error type for reduced model operations.
///
/// `Boundary` is a caller error: the request reached outside the document.
/// `Invariant` is a bug in the model itself and should never be observed.
/// Neither covers the "no match" outcome of the balancing queries, which is
/// reported as `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Moving or deleting past the start or end of the token stream.
    Boundary {
        requested: usize,
        available: usize,
        direction: Direction,
    },
    /// Internal consistency failure.
    Invariant(&'static str),
    /// An absolute range outside the document.
    InvalidRange {
        offset: usize,
        len: usize,
        doc_len: usize,
    },
}

impl Error {
    /// Returns true for boundary violations.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary { .. })
    }

    /// Returns true for internal invariant violations.
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary {
                requested,
                available,
                direction,
            } => write!(
                f,
                "cannot move {requested} {direction}: only {available} characters available"
            ),
            Self::Invariant(what) => write!(f, "reduced model invariant violated: {what}"),
            Self::InvalidRange {
                offset,
                len,
                doc_len,
            } => write!(
                f,
                "range {offset}..{} out of bounds for document of length {doc_len}",
                offset + len
            ),
        }
    }
}

impl std::error::Error for Error {}
