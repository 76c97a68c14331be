use std::fmt;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for geometry operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A transform with no inverse was inverted.
    NonInvertible,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonInvertible => write!(f, "transform is not invertible"),
        }
    }
}

impl std::error::Error for Error {}
