//! Small synchronization helpers shared by the arbiter and agent threads.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lock `mutex`, recovering the guard if another thread panicked while holding it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One-way game termination flag.
///
/// Once triggered it stays triggered. Threads that sleep through
/// [`Shutdown::sleep`] are woken immediately when it fires.
#[derive(Debug, Default)]
pub struct Shutdown {
    triggered: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger termination. Returns true only for the call that flipped the flag.
    pub fn trigger(&self) -> bool {
        let mut triggered = lock(&self.triggered);
        if *triggered {
            return false;
        }
        *triggered = true;
        self.wake.notify_all();
        true
    }

    pub fn is_triggered(&self) -> bool {
        *lock(&self.triggered)
    }

    /// Sleep for `duration` unless termination fires first.
    ///
    /// Returns true if the game was (or became) terminated.
    pub fn sleep(&self, duration: Duration) -> bool {
        let triggered = lock(&self.triggered);
        let (triggered, _) = self
            .wake
            .wait_timeout_while(triggered, duration, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn trigger_is_idempotent() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn sleep_runs_full_duration_when_not_triggered() {
        let shutdown = Shutdown::new();
        let start = Instant::now();
        assert!(!shutdown.sleep(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn trigger_interrupts_sleep() {
        let shutdown = Arc::new(Shutdown::new());
        let sleeper = {
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || shutdown.sleep(Duration::from_secs(30)))
        };
        thread::sleep(Duration::from_millis(20));
        shutdown.trigger();
        assert!(sleeper.join().expect("join sleeper"));
    }
}
