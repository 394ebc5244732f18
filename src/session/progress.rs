use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Progress fractions in `[0, 1]`, delivered to a listener on another thread.
///
/// Emitted values never decrease. Sending never blocks, and a listener that has gone away is
/// ignored.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    tx: Option<Sender<f64>>,
    last: Option<f64>,
}

impl ProgressReporter {
    /// Report into `tx`.
    pub fn new(tx: Sender<f64>) -> Self {
        Self {
            tx: Some(tx),
            last: None,
        }
    }

    /// A reporter that discards everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Emit `fraction`, clamped to `[0, 1]`. Values below the last emitted one are dropped.
    pub fn report(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let v = fraction.clamp(0.0, 1.0);
        if self.last.is_some_and(|last| v < last) {
            return;
        }
        self.last = Some(v);
        if let Some(tx) = &self.tx
            && tx.send(v).is_err()
        {
            self.tx = None;
        }
    }

    /// Emit `1.0` unless it was already the last value.
    pub fn finish_at_one(&mut self) {
        if self.last != Some(1.0) {
            self.report(1.0);
        }
    }

    /// Last emitted value.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Shared cancellation request, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not yet set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once [`CancelFlag::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
