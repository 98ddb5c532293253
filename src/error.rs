//! Errors reported when a structure is configured with invalid parameters.
//!
//! Looking up a missing key is never an error (it is `None`), and a broken
//! internal invariant is a bug that panics.

use thiserror::Error;

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A structure was constructed with a parameter outside its valid range.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    /// The scapegoat balance factor must be in `[0.5, 1)`.
    #[error("alpha must be in the range [0.5, 1), but was {0}")]
    InvalidAlpha(f64),

    /// The skip list promotion probability must be in `(0, 1)`.
    #[error("promotion probability must be in the range (0, 1), but was {0}")]
    InvalidProbability(f64),
}
