//! Cancellation for background listeners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared "please stop" flag.
///
/// Long-running listeners such as `EventPoller` check it between polls; any
/// clone can raise it. Raising is one-way for the flag's lifetime.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag. Returns true if this call was the one that raised it.
    #[inline]
    pub fn stop(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}
