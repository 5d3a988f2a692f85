//! Fault isolation policy for untrusted callbacks.
//!
//! The feed swallows producer faults by design; this module makes the
//! swallow-and-log behavior an explicit object so tests can assert on it
//! instead of trusting an implicit catch-all.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::error;

/// Deduplicates diagnostics per offender identity.
///
/// The first fault for an identity is logged; identical repeats are
/// swallowed silently so a provider failing on every rebuild cannot
/// flood the log.
#[derive(Debug, Default)]
pub struct FaultLog {
    seen: Mutex<HashSet<String>>,
}

impl FaultLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identity`; returns `true` only the first time it is seen.
    pub fn first_occurrence(&self, identity: &str) -> bool {
        lock_unpoisoned(&self.seen).insert(identity.to_owned())
    }

    /// Whether a fault for `identity` has already been recorded.
    #[must_use]
    pub fn has_seen(&self, identity: &str) -> bool {
        lock_unpoisoned(&self.seen).contains(identity)
    }
}

/// Runs a host-supplied callback, absorbing a panic instead of letting it
/// unwind into the caller. The first panic per `identity` is logged
/// through `faults`.
pub fn run_guarded(faults: &FaultLog, identity: &str, callback: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(callback))
        && faults.first_occurrence(identity)
    {
        error!(callback = identity, "callback panicked: {}", panic_message(&panic));
    }
}

/// Best-effort human-readable payload of a caught panic.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Locks a mutex, absorbing poisoning.
///
/// The feed must never fail observably; a poisoned guard only means some
/// thread panicked after completing its own mutation, and the protected
/// data is still well-formed.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_true_exactly_once() {
        let faults = FaultLog::new();
        assert!(faults.first_occurrence("p1"));
        assert!(!faults.first_occurrence("p1"));
        assert!(faults.first_occurrence("p2"));
        assert!(faults.has_seen("p1"));
        assert!(!faults.has_seen("p3"));
    }

    #[test]
    fn run_guarded_absorbs_panics() {
        let faults = FaultLog::new();
        run_guarded(&faults, "boom", || panic!("it broke"));
        assert!(faults.has_seen("boom"));
    }

    #[test]
    fn run_guarded_runs_the_callback() {
        let faults = FaultLog::new();
        let mut ran = false;
        run_guarded(&faults, "ok", || ran = true);
        assert!(ran);
        assert!(!faults.has_seen("ok"));
    }

    #[test]
    fn panic_message_extracts_common_payloads() {
        let str_panic: Box<dyn std::any::Any + Send> = Box::new("plain");
        assert_eq!(panic_message(str_panic.as_ref()), "plain");

        let string_panic: Box<dyn std::any::Any + Send> = Box::new("owned".to_owned());
        assert_eq!(panic_message(string_panic.as_ref()), "owned");

        let opaque_panic: Box<dyn std::any::Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(opaque_panic.as_ref()), "non-string panic payload");
    }
}
