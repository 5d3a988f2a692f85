//! Multi-source update-note aggregation for the Waypost hub.
//!
//! Collects update notes from three kinds of producers (auto-discovered
//! package documents, directly published notes, and registered runtime
//! providers), deduplicates and orders them deterministically, and serves
//! the merged [`waypost_types::NoteDigest`] from a cache that rebuilds
//! only when upstream state plausibly changed.
//!
//! Producer faults never cascade: a misbehaving provider or a malformed
//! package document degrades to "fewer notes than ideal", logged at most
//! once per offender. Nothing in this crate renders, fetches from the
//! network, or persists to disk; the hosting shell supplies those
//! capabilities through [`PackageHost`].

mod compose;
mod discovery;
mod error;
mod feed;
mod guard;
mod host;
mod merge;
mod provider;
mod settings;
mod sink;

pub use compose::{ComposedNotes, NoteSection, compose_sections};
pub use error::DocumentError;
pub use feed::UpdateFeed;
pub use guard::{FaultLog, run_guarded};
pub use host::{CHANGES_DOCUMENT_PATH, PackageHost, PackageInfo};
pub use provider::{NoteProvider, PROVIDER_WARN_BUDGET_MS};
pub use settings::{FeedMode, FeedSettings};
pub use sink::NoteSink;
