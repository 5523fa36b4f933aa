//! Cooperative cancellation for the busy-wait control loops.
//!
//! Every loop polls its token exactly once per iteration and stops as soon as
//! the token reports inactive.  Polling is also the caller's hook for any
//! periodic side work (refreshing a dashboard, feeding a watchdog).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Externally supplied "keep going?" predicate.
pub trait CancellationToken {
    fn is_active(&self) -> bool;
}

impl<F> CancellationToken for F
where
    F: Fn() -> bool,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// Shared run flag that another thread (e.g. a Ctrl-C handler) can clear.
///
/// ```
/// use tilerunner_control::cancel::{CancellationToken, RunFlag};
///
/// let flag = RunFlag::new();
/// let handle = flag.clone();
/// assert!(flag.is_active());
/// handle.stop();
/// assert!(!flag.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// A new flag in the active state.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Re-arm the flag for the next command.
    pub fn rearm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken for RunFlag {
    fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closure_is_a_token() {
        let polls = Cell::new(0);
        let token = || {
            polls.set(polls.get() + 1);
            polls.get() < 3
        };
        assert!(token.is_active());
        assert!(token.is_active());
        assert!(!token.is_active());
    }

    #[test]
    fn run_flag_stop_and_rearm() {
        let flag = RunFlag::default();
        assert!(flag.is_active());
        flag.stop();
        assert!(!flag.is_active());
        flag.rearm();
        assert!(flag.is_active());
    }

    #[test]
    fn run_flag_is_shared_across_threads() {
        let flag = RunFlag::new();
        let remote = flag.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(!flag.is_active());
    }
}
