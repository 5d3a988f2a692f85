//! The fixed category taxonomy for update notes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an update note. The variant order is the presentation
/// order: `Highlights` renders first, `Other` last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteCategory {
    Highlights,
    Fixes,
    KnownIssues,
    PackChanges,
    ModUpdates,
    #[default]
    Other,
}

impl NoteCategory {
    /// All categories in presentation order.
    pub const ALL: [NoteCategory; 6] = [
        NoteCategory::Highlights,
        NoteCategory::Fixes,
        NoteCategory::KnownIssues,
        NoteCategory::PackChanges,
        NoteCategory::ModUpdates,
        NoteCategory::Other,
    ];

    /// Parses a category from free text.
    ///
    /// The match is case-insensitive and tolerant of `-` and ` ` as word
    /// separators; the compact legacy spellings (`knownissues`,
    /// `packchanges`, `modupdates`) are also accepted. Anything
    /// unrecognized maps to [`NoteCategory::Other`].
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .to_uppercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "HIGHLIGHTS" => NoteCategory::Highlights,
            "FIXES" => NoteCategory::Fixes,
            "KNOWN_ISSUES" | "KNOWNISSUES" => NoteCategory::KnownIssues,
            "PACK_CHANGES" | "PACKCHANGES" => NoteCategory::PackChanges,
            "MOD_UPDATES" | "MODUPDATES" => NoteCategory::ModUpdates,
            _ => NoteCategory::Other,
        }
    }

    /// Presentation rank; lower renders first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            NoteCategory::Highlights => 0,
            NoteCategory::Fixes => 1,
            NoteCategory::KnownIssues => 2,
            NoteCategory::PackChanges => 3,
            NoteCategory::ModUpdates => 4,
            NoteCategory::Other => 5,
        }
    }

    /// Human-readable section heading.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            NoteCategory::Highlights => "Highlights",
            NoteCategory::Fixes => "Fixes",
            NoteCategory::KnownIssues => "Known Issues",
            NoteCategory::PackChanges => "Pack Changes",
            NoteCategory::ModUpdates => "Mod Updates",
            NoteCategory::Other => "Other",
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
