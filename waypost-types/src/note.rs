//! The normalized update-note record.

use crate::category::NoteCategory;
use serde::Serialize;

/// Unvalidated input for one update note, as handed over by a producer.
///
/// Every field is optional or unchecked; [`UpdateNote::normalize`] is the
/// only way to turn this into a canonical record.
#[derive(Debug, Clone, Default)]
pub struct RawNote {
    /// Identity of the contributing package.
    pub source_id: Option<String>,
    /// Human label for the contributing package.
    pub source_name: Option<String>,
    /// Free-text version the note applies to.
    pub version: Option<String>,
    /// Free-text category, parsed through [`NoteCategory::from_text`].
    pub category: Option<String>,
    /// Short headline of the note.
    pub title: Option<String>,
    /// Markdown body, may be empty.
    pub body: Option<String>,
    /// Milliseconds since the Unix epoch; negative values are clamped.
    pub timestamp_ms: i64,
    /// Caller-supplied tie-break, lower is more authoritative.
    pub sort_order: i32,
}

/// One normalized update-note record.
///
/// Invariant: every field is canonical from construction on: `source_id`
/// is lowercase and non-empty, `title`/`version` are non-blank,
/// `timestamp_ms` is non-negative, and the category is a member of the
/// fixed taxonomy. Downstream code never re-validates.
///
/// Deliberately `Serialize`-only: deserializing would bypass
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UpdateNote {
    source_id: String,
    source_name: String,
    version: String,
    category: NoteCategory,
    title: String,
    body: String,
    timestamp_ms: i64,
    sort_order: i32,
}

impl UpdateNote {
    /// Normalizes a raw note into its canonical form.
    ///
    /// Pure and total: every malformed field degrades to a documented
    /// default instead of failing.
    #[must_use]
    pub fn normalize(raw: RawNote) -> Self {
        let source_id = normalize_source_id(raw.source_id.as_deref());
        let source_name = normalize_or(raw.source_name.as_deref(), &source_id);
        Self {
            source_name,
            version: normalize_or(raw.version.as_deref(), "unknown"),
            category: NoteCategory::from_text(raw.category.as_deref().unwrap_or("")),
            title: normalize_or(raw.title.as_deref(), "Untitled update"),
            body: raw.body.as_deref().unwrap_or("").trim().to_owned(),
            timestamp_ms: raw.timestamp_ms.max(0),
            sort_order: raw.sort_order,
            source_id,
        }
    }

    /// Lowercase, non-empty identity of the contributing package.
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Human label of the contributing package.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Version the note applies to.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Category within the fixed taxonomy.
    #[must_use]
    pub const fn category(&self) -> NoteCategory {
        self.category
    }

    /// Headline, never blank.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed markdown body, possibly empty.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Milliseconds since the Unix epoch, never negative.
    #[must_use]
    pub const fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Caller-supplied tie-break; lower wins on equal timestamps.
    #[must_use]
    pub const fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

fn normalize_source_id(raw: Option<&str>) -> String {
    let clean = raw.unwrap_or("").trim().to_lowercase();
    if clean.is_empty() { "unknown".to_owned() } else { clean }
}

fn normalize_or(raw: Option<&str>, fallback: &str) -> String {
    let clean = raw.unwrap_or("").trim();
    if clean.is_empty() { fallback.to_owned() } else { clean.to_owned() }
}
