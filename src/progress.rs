//! Observer trait for step events.
//!
//! Inject an [`Arc<dyn StepObserver>`] via
//! [`crate::workflow::Session::with_observer`] to hear about each remote
//! call as it starts and finishes. The CLI uses it to drive a spinner; a
//! web front end could forward the same events over a socket.
//!
//! # Example
//!
//! ```rust
//! use cv_workflow::{Step, StepObserver};
//!
//! struct Log;
//!
//! impl StepObserver for Log {
//!     fn on_step_error(&self, step: Step, error: &str) {
//!         eprintln!("{step} failed: {error}");
//!     }
//! }
//! ```

use crate::workflow::Step;
use std::sync::Arc;

/// Called by a session around every remote call.
///
/// All methods default to no-ops so implementations only override what they
/// care about.
pub trait StepObserver: Send + Sync {
    /// Called just before the request for `step` is sent.
    fn on_step_start(&self, step: Step) {
        let _ = step;
    }

    /// Called after the step succeeded and the session state advanced.
    fn on_step_complete(&self, step: Step) {
        let _ = step;
    }

    /// Called when the step failed. Session state is unchanged.
    ///
    /// `error` is the error's display text, i.e. the raw service body for
    /// non-2xx replies.
    fn on_step_error(&self, step: Step, error: &str) {
        let _ = (step, error);
    }
}

/// Observer used when none is configured.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}

/// Convenience alias for the type a session stores.
pub type Observer = Arc<dyn StepObserver>;
