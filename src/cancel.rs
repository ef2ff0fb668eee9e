//! Cooperative cancellation shared by all in-flight checks of a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot broadcast cancellation signal.
///
/// The token starts unset. [`CancelToken::cancel`] flips it exactly once;
/// further calls have no additional effect. Clones share the same underlying
/// signal, so a handle handed to an interrupt handler is observed by every
/// worker polling [`CancelToken::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal. Returns `true` for the call that actually flipped
    /// it, `false` when the run was already cancelled.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
