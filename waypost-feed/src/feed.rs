//! The aggregation cache.

use crate::discovery::DiscoveryState;
use crate::guard::{FaultLog, lock_unpoisoned};
use crate::host::PackageHost;
use crate::merge::MergeSink;
use crate::provider::{NoteProvider, run_provider, same_instance};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;
use waypost_types::{NoteDigest, RawNote, UpdateNote};

/// The multi-source update-note aggregation cache.
///
/// One instance is constructed by the hosting application's bootstrap and
/// shared (`Arc`) with every producer and reader; there is no hidden
/// global. Producers publish notes or register providers from any thread;
/// readers call [`digest`](UpdateFeed::digest) and receive an immutable
/// snapshot. The snapshot is rebuilt lazily: any write marks the cache
/// dirty, and the next read rebuilds once under a mutex while concurrent
/// readers keep the previous complete snapshot.
pub struct UpdateFeed {
    host: Arc<dyn PackageHost>,
    version_label: String,

    /// Directly published notes, append-only.
    direct: Mutex<Vec<UpdateNote>>,
    /// Registered providers, append-only, deduped by instance identity.
    providers: Mutex<Vec<Arc<dyn NoteProvider>>>,
    discovery: Mutex<DiscoveryState>,

    /// Serializes rebuilds; the only blocking point in the feed.
    rebuild: Mutex<()>,
    snapshot: RwLock<Arc<NoteDigest>>,
    dirty: AtomicBool,

    config_seen: Mutex<String>,
    provider_faults: FaultLog,
    discovery_faults: FaultLog,
}

impl UpdateFeed {
    /// Creates a feed over the given host capabilities.
    ///
    /// `version_label` is the hosting bundle's own version, stamped on
    /// every digest; blank means `"latest"`.
    #[must_use]
    pub fn new(host: Arc<dyn PackageHost>, version_label: &str) -> Self {
        Self {
            host,
            version_label: version_label.trim().to_owned(),
            direct: Mutex::new(Vec::new()),
            providers: Mutex::new(Vec::new()),
            discovery: Mutex::new(DiscoveryState::new()),
            rebuild: Mutex::new(()),
            snapshot: RwLock::new(NoteDigest::empty()),
            dirty: AtomicBool::new(true),
            config_seen: Mutex::new(String::new()),
            provider_faults: FaultLog::new(),
            discovery_faults: FaultLog::new(),
        }
    }

    /// Publishes one note directly. Never fails observably; malformed
    /// fields degrade to their documented defaults.
    pub fn publish(&self, note: RawNote) {
        let note = UpdateNote::normalize(note);
        lock_unpoisoned(&self.direct).push(note);
        self.mark_dirty();
    }

    /// Registers a provider to be invoked on every rebuild.
    ///
    /// Idempotent by instance identity: re-registering the same `Arc`'d
    /// instance is a no-op.
    pub fn register_provider(&self, provider: Arc<dyn NoteProvider>) {
        {
            let mut providers = lock_unpoisoned(&self.providers);
            if providers.iter().any(|existing| same_instance(existing, &provider)) {
                return;
            }
            providers.push(provider);
        }
        self.mark_dirty();
    }

    /// Returns the aggregated digest, rebuilding it first if any upstream
    /// state changed since the last rebuild.
    ///
    /// At most one rebuild runs at a time; readers arriving during a
    /// rebuild receive either the previous complete snapshot or the
    /// freshly completed one, never a partial result.
    #[must_use]
    pub fn digest(&self) -> Arc<NoteDigest> {
        self.sync_config_fingerprint();

        if !self.dirty.load(Ordering::Acquire) {
            return self.current_snapshot();
        }

        let _rebuild = lock_unpoisoned(&self.rebuild);
        if !self.dirty.load(Ordering::Acquire) {
            // Another reader rebuilt while this one waited.
            return self.current_snapshot();
        }

        let digest = Arc::new(self.build_digest());
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&digest);
        self.dirty.store(false, Ordering::Release);
        digest
    }

    /// Forces the next read to rebuild, including a full re-scan of
    /// package documents. The reason is diagnostic only.
    pub fn invalidate(&self, reason: &str) {
        {
            let _rebuild = lock_unpoisoned(&self.rebuild);
            lock_unpoisoned(&self.discovery).reset();
            self.dirty.store(true, Ordering::Release);
        }
        if !reason.trim().is_empty() {
            debug!(reason, "note feed cache invalidated");
        }
    }

    fn current_snapshot(&self) -> Arc<NoteDigest> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Marks the cache dirty when the host's relevant configuration
    /// changed since the last read. Double-checked: the fast comparison
    /// runs without the rebuild lock, the transition is confirmed under
    /// it.
    fn sync_config_fingerprint(&self) {
        let current = self.host.config_fingerprint();
        if *lock_unpoisoned(&self.config_seen) == current {
            return;
        }

        let _rebuild = lock_unpoisoned(&self.rebuild);
        let mut seen = lock_unpoisoned(&self.config_seen);
        if *seen != current {
            *seen = current;
            self.dirty.store(true, Ordering::Release);
        }
    }

    /// Runs discovery, collects from every source in precedence order
    /// (discovered, then directly published, then providers), merges,
    /// and sorts. Callers must hold the rebuild lock.
    fn build_digest(&self) -> NoteDigest {
        let mut sink = MergeSink::new();

        {
            let mut discovery = lock_unpoisoned(&self.discovery);
            for note in discovery.ensure_scanned(self.host.as_ref(), &self.discovery_faults) {
                sink.push_note(note.clone());
            }
        }

        // Snapshot at iteration start: a publish racing this rebuild may
        // or may not be included, and will mark the cache dirty again.
        let direct: Vec<UpdateNote> = lock_unpoisoned(&self.direct).clone();
        for note in direct {
            sink.push_note(note);
        }

        let providers: Vec<Arc<dyn NoteProvider>> = lock_unpoisoned(&self.providers).clone();
        for provider in &providers {
            run_provider(provider, &mut sink, &self.provider_faults);
        }

        NoteDigest::from_sorted(&self.version_label, sink.into_sorted())
    }
}
