//! The immutable aggregated snapshot served to readers.

use crate::note::UpdateNote;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// An immutable snapshot of the fully merged and ordered note feed.
///
/// Constructed wholesale on every rebuild and never mutated; readers hold
/// it through an `Arc` and may keep using a superseded snapshot safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDigest {
    version: String,
    notes: Vec<UpdateNote>,
    by_source: BTreeMap<String, Vec<UpdateNote>>,
}

impl NoteDigest {
    /// Builds a digest from notes already in final presentation order.
    ///
    /// The per-source grouping is derived here so that each group
    /// preserves the presentation order and the group keys iterate
    /// sorted. A blank version label becomes `"latest"`.
    #[must_use]
    pub fn from_sorted(version: &str, notes: Vec<UpdateNote>) -> Self {
        let version = version.trim();
        let mut by_source: BTreeMap<String, Vec<UpdateNote>> = BTreeMap::new();
        for note in &notes {
            by_source
                .entry(note.source_id().to_owned())
                .or_default()
                .push(note.clone());
        }
        Self {
            version: if version.is_empty() { "latest".to_owned() } else { version.to_owned() },
            notes,
            by_source,
        }
    }

    /// The shared empty digest, served before the first rebuild.
    #[must_use]
    pub fn empty() -> Arc<Self> {
        static EMPTY: OnceLock<Arc<NoteDigest>> = OnceLock::new();
        Arc::clone(EMPTY.get_or_init(|| Arc::new(NoteDigest::from_sorted("latest", Vec::new()))))
    }

    /// Version label of the hosting bundle, `"latest"` when unknown.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All notes in final presentation order.
    #[must_use]
    pub fn notes(&self) -> &[UpdateNote] {
        &self.notes
    }

    /// Notes grouped by `source_id`; keys iterate sorted, each group
    /// preserves the presentation order.
    #[must_use]
    pub const fn by_source(&self) -> &BTreeMap<String, Vec<UpdateNote>> {
        &self.by_source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
