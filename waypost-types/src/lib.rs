//! Core type definitions for Waypost.
//!
//! This crate defines the plugin-agnostic data model for the update-note
//! feed:
//! - `UpdateNote`: one normalized update-note record
//! - `NoteCategory`: the fixed category taxonomy and its presentation rank
//! - `NoteDigest`: an immutable aggregated snapshot served to readers
//!
//! Everything that collects, merges, or caches notes lives in
//! `waypost-feed`; this crate carries only values and their invariants.

mod category;
mod digest;
mod note;

pub use category::NoteCategory;
pub use digest::NoteDigest;
pub use note::{RawNote, UpdateNote};
