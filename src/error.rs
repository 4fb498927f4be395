//! Errors originating inside the library itself.
//!
//! Stream failures travel as [`Event::Error`](crate::event::Event) values of
//! the user's error type. The library only produces its own errors in a few
//! places (a disposed subject, runaway concatenation) and hands them to the
//! stream through `Err: From<RxError>`.

use thiserror::Error;

/// Errors raised by the reactive primitives.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxError {
  /// An object was used after `dispose()` was called on it.
  #[error("object `{object}` was already disposed")]
  Disposed {
    /// Name of the disposed object.
    object: &'static str,
  },

  /// Nested concatenation grew past the generator stack limit.
  #[error("tail recursion stack exceeded {limit} generators")]
  TailRecursionOverflow {
    /// The configured stack limit.
    limit: usize,
  },

  /// An argument was outside of its allowed range.
  #[error("argument out of range")]
  ArgumentOutOfRange,

  /// Unknown error.
  #[error("unknown error occurred")]
  Unknown,
}

impl RxError {
  /// Returns a short stable label (snake_case) for use in logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      RxError::Disposed { .. } => "rx_disposed",
      RxError::TailRecursionOverflow { .. } => "rx_tail_recursion_overflow",
      RxError::ArgumentOutOfRange => "rx_argument_out_of_range",
      RxError::Unknown => "rx_unknown",
    }
  }
}
