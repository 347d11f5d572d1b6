//! Debounced invocation
//!
//! Collapses a burst of calls into one deferred call carrying the last
//! value. The debouncer is a two-state machine, idle or pending: every
//! [`Debouncer::call`] cancels the pending window (if any) and opens a new
//! one.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct Debouncer<T> {
    quiet: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    /// Cancel handle for the pending window. A window that already fired
    /// leaves its token behind; cancelling a spent token is a no-op.
    pending: Mutex<Option<CancellationToken>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            quiet,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    /// Defer `value` for the quiet period, superseding any pending call.
    ///
    /// N calls inside one window produce exactly one invocation, with the
    /// value of the last call. Must run on a tokio runtime.
    pub fn call(&self, value: T) {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().unwrap().replace(token.clone()) {
            previous.cancel();
        }
        let action = Arc::clone(&self.action);
        let quiet = self.quiet;
        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = token.cancelled() => {}
                () = tokio::time::sleep(quiet) => action(value),
            }
        });
    }

    /// Drop the pending window without invoking the action.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().unwrap().take() {
            pending.cancel();
        }
    }

    /// Cancel the pending window and invoke the action with `value`
    /// immediately. Used at teardown, where a deferred call could be lost.
    pub fn flush(&self, value: T) {
        self.cancel();
        (self.action)(value);
    }
}
