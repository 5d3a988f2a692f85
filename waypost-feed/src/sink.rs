//! The write-only contract producers use to hand over notes.

use waypost_types::RawNote;

/// Narrow write-only interface for contributing notes one at a time.
///
/// `push` never fails observably: a malformed note is normalized to its
/// documented defaults rather than rejected, so one producer's bad input
/// can never cost other producers their updates.
pub trait NoteSink {
    fn push(&mut self, note: RawNote);
}
