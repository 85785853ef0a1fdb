//! Cooperative cancellation.
//!
//! Generators poll `Feedback::is_canceled` once per outer loop iteration and
//! return the candidates produced so far when it reports true.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait Feedback {
    fn is_canceled(&self) -> bool;
}

/// Never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    #[inline]
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Shared flag, cancel from any thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Feedback for CancelFlag {
    #[inline]
    fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl<F: Fn() -> bool> Feedback for F {
    #[inline]
    fn is_canceled(&self) -> bool {
        self()
    }
}
