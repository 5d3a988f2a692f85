//! Dedup and deterministic ordering of contributed notes.

use crate::sink::NoteSink;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use waypost_types::{RawNote, UpdateNote};

/// Rebuild-scoped collector that merge-inserts every contribution.
///
/// Notes sharing a dedup key collapse to one survivor: the strictly
/// newer timestamp wins, and on a timestamp tie the smaller sort order
/// wins. A later contribution with the same key can therefore be
/// silently superseded by an earlier-but-newer-timestamped one; callers
/// that need guaranteed precedence must set timestamps meaningfully.
#[derive(Debug, Default)]
pub(crate) struct MergeSink {
    deduped: BTreeMap<String, UpdateNote>,
}

impl MergeSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_note(&mut self, candidate: UpdateNote) {
        let key = dedup_key(&candidate);
        match self.deduped.get(&key) {
            Some(existing)
                if candidate.timestamp_ms() < existing.timestamp_ms()
                    || (candidate.timestamp_ms() == existing.timestamp_ms()
                        && candidate.sort_order() >= existing.sort_order()) => {}
            _ => {
                self.deduped.insert(key, candidate);
            }
        }
    }

    /// Consumes the sink and returns the survivors in final
    /// presentation order.
    pub(crate) fn into_sorted(self) -> Vec<UpdateNote> {
        let mut notes: Vec<UpdateNote> = self.deduped.into_values().collect();
        notes.sort_by(presentation_order);
        notes
    }
}

impl NoteSink for MergeSink {
    fn push(&mut self, note: RawNote) {
        self.push_note(UpdateNote::normalize(note));
    }
}

/// Case-insensitive identity of "the same note" across sources.
pub(crate) fn dedup_key(note: &UpdateNote) -> String {
    format!("{}|{}|{}", note.source_id(), note.version(), note.title()).to_lowercase()
}

/// Total presentation order: category rank, then newest first, then
/// sort order, then source id, then title.
pub(crate) fn presentation_order(a: &UpdateNote, b: &UpdateNote) -> Ordering {
    a.category()
        .rank()
        .cmp(&b.category().rank())
        .then_with(|| b.timestamp_ms().cmp(&a.timestamp_ms()))
        .then_with(|| a.sort_order().cmp(&b.sort_order()))
        .then_with(|| a.source_id().cmp(b.source_id()))
        .then_with(|| a.title().cmp(b.title()))
}
