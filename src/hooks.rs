//! Process-wide hooks.
//!
//! An observer subscribed without an error handler has no way to react to
//! `Event::Error`. Such errors are routed to the default error handler so
//! they are never swallowed silently. The built-in handler logs through
//! `tracing::error!`, debug builds attach a captured backtrace.

use std::{fmt::Debug, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

type ErrorHandler = Arc<dyn Fn(&dyn Debug) + Send + Sync>;

static DEFAULT_ERROR_HANDLER: Lazy<RwLock<Option<ErrorHandler>>> = Lazy::new(|| RwLock::new(None));

pub struct Hooks;

impl Hooks {
  /// Replaces the handler invoked for unhandled stream errors.
  pub fn set_default_error_handler(handler: impl Fn(&dyn Debug) + Send + Sync + 'static) {
    *DEFAULT_ERROR_HANDLER.write() = Some(Arc::new(handler));
  }

  /// Restores the built-in logging handler.
  pub fn reset_default_error_handler() { *DEFAULT_ERROR_HANDLER.write() = None; }

  pub(crate) fn unhandled_error(err: &dyn Debug) {
    let custom = DEFAULT_ERROR_HANDLER.read().clone();
    match custom {
      Some(handler) => handler(err),
      None => log_unhandled_error(err),
    }
  }
}

#[cfg(debug_assertions)]
fn log_unhandled_error(err: &dyn Debug) {
  let backtrace = std::backtrace::Backtrace::capture();
  tracing::error!(error = ?err, %backtrace, "unhandled error in observable sequence");
}

#[cfg(not(debug_assertions))]
fn log_unhandled_error(err: &dyn Debug) {
  tracing::error!(error = ?err, "unhandled error in observable sequence");
}
