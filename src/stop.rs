//! Cooperative cancellation of a running solve.
//!
//! The wall clock already lives in the environment's [`Timer`]; the only
//! other way a solve ends early is an external interrupt. [`Stopper`] folds
//! the two into the single poll shared by the refinement, three-phase, and
//! subgradient loop heads: on a hit the in-flight inner step finishes and
//! the loops unwind with the best solution found so far, tagged with the
//! [`Status`] the poll produced.
//!
//! [`Timer`]: crate::env::Timer

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Status;
use crate::env::Environment;

/// Stop poll for a solve. Clones share the interrupt flag, so a handle can
/// be kept outside the solver to cancel it from elsewhere.
///
/// # Note
/// [`Stopper::with_ctrlc`] installs a global signal handler and can only be
/// called once per process; a second call panics.
#[derive(Debug, Clone, Default)]
pub struct Stopper {
    interrupted: Arc<AtomicBool>,
}

impl Stopper {
    /// A stopper that only ever reports the environment's time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stopper whose interrupt is raised by Ctrl-C (SIGINT).
    pub fn with_ctrlc() -> Self {
        let stopper = Self::new();
        ctrlc::set_handler({
            let interrupted = stopper.interrupted.clone();
            move || interrupted.store(true, Ordering::SeqCst)
        })
        .expect("Error setting Ctrl-C handler");
        stopper
    }

    /// Raises the interrupt; the solve winds down at its next poll exactly
    /// as if Ctrl-C had been hit.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    /// How the solve should end, if it should. The time limit is checked
    /// first so deadline runs keep a reproducible status.
    pub fn check(&self, env: &Environment) -> Option<Status> {
        if env.timer.expired() {
            return Some(Status::TimeLimit);
        }
        if self.interrupted.load(Ordering::SeqCst) {
            return Some(Status::Interrupted);
        }
        None
    }
}
