//! Pluggable note providers and their guarded invocation.

use crate::guard::{FaultLog, panic_message};
use crate::sink::NoteSink;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Time budget per provider invocation. Exceeding it is logged but the
/// invocation is neither aborted nor retried; slow providers keep their
/// output.
pub const PROVIDER_WARN_BUDGET_MS: u64 = 50;

/// A registered capability invoked on each rebuild to contribute notes.
///
/// Implementations push zero or more notes into the sink. Returning an
/// error (or panicking) is isolated per provider: it is logged at most
/// once per registered instance and never affects other providers or the
/// rebuild itself.
pub trait NoteProvider: Send + Sync {
    fn contribute(&self, sink: &mut dyn NoteSink) -> anyhow::Result<()>;
}

/// Instance identity of a registered provider, used for re-registration
/// dedup and as the failure-log key.
pub(crate) fn provider_identity(provider: &Arc<dyn NoteProvider>) -> String {
    format!("{:p}", Arc::as_ptr(provider).cast::<()>())
}

/// Whether two registrations refer to the same provider instance.
pub(crate) fn same_instance(a: &Arc<dyn NoteProvider>, b: &Arc<dyn NoteProvider>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Invokes one provider with full fault isolation and latency
/// observation.
pub(crate) fn run_provider(
    provider: &Arc<dyn NoteProvider>,
    sink: &mut dyn NoteSink,
    failures: &FaultLog,
) {
    let identity = provider_identity(provider);
    let started = Instant::now();

    match catch_unwind(AssertUnwindSafe(|| provider.contribute(sink))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            if failures.first_occurrence(&identity) {
                error!(provider = %identity, "note provider failed: {error:#}");
            }
        }
        Err(panic) => {
            if failures.first_occurrence(&identity) {
                error!(provider = %identity, "note provider panicked: {}", panic_message(panic.as_ref()));
            }
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if elapsed_ms > PROVIDER_WARN_BUDGET_MS {
        warn!(
            provider = %identity,
            elapsed_ms,
            budget_ms = PROVIDER_WARN_BUDGET_MS,
            "note provider exceeded its time budget"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_types::RawNote;

    struct CountingSink(usize);

    impl NoteSink for CountingSink {
        fn push(&mut self, _note: RawNote) {
            self.0 += 1;
        }
    }

    struct OneNote;

    impl NoteProvider for OneNote {
        fn contribute(&self, sink: &mut dyn NoteSink) -> anyhow::Result<()> {
            sink.push(RawNote::default());
            Ok(())
        }
    }

    struct AlwaysFails;

    impl NoteProvider for AlwaysFails {
        fn contribute(&self, _sink: &mut dyn NoteSink) -> anyhow::Result<()> {
            anyhow::bail!("broken provider")
        }
    }

    struct AlwaysPanics;

    impl NoteProvider for AlwaysPanics {
        fn contribute(&self, _sink: &mut dyn NoteSink) -> anyhow::Result<()> {
            panic!("provider exploded")
        }
    }

    #[test]
    fn same_instance_distinguishes_registrations() {
        let a: Arc<dyn NoteProvider> = Arc::new(OneNote);
        let b: Arc<dyn NoteProvider> = Arc::new(OneNote);
        let a_again = Arc::clone(&a);
        assert!(same_instance(&a, &a_again));
        assert!(!same_instance(&a, &b));
    }

    #[test]
    fn failing_provider_is_logged_once() {
        let provider: Arc<dyn NoteProvider> = Arc::new(AlwaysFails);
        let failures = FaultLog::new();
        let mut sink = CountingSink(0);

        run_provider(&provider, &mut sink, &failures);
        run_provider(&provider, &mut sink, &failures);

        assert!(failures.has_seen(&provider_identity(&provider)));
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn panicking_provider_does_not_unwind() {
        let provider: Arc<dyn NoteProvider> = Arc::new(AlwaysPanics);
        let failures = FaultLog::new();
        let mut sink = CountingSink(0);

        run_provider(&provider, &mut sink, &failures);
        assert!(failures.has_seen(&provider_identity(&provider)));
    }

    #[test]
    fn healthy_provider_contributes() {
        let provider: Arc<dyn NoteProvider> = Arc::new(OneNote);
        let failures = FaultLog::new();
        let mut sink = CountingSink(0);

        run_provider(&provider, &mut sink, &failures);
        assert_eq!(sink.0, 1);
        assert!(!failures.has_seen(&provider_identity(&provider)));
    }
}
