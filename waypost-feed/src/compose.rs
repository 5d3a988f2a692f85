//! Composes the locally bundled markdown changelog with the aggregated
//! digest into render-agnostic category sections.
//!
//! The hosting shell reads its own bundled markdown (this module does no
//! I/O) and hands it over together with the current digest; the result
//! is a list of sections of plain `- ` bullet lines, ready for whatever
//! presentation layer the host uses.

use waypost_types::{NoteCategory, NoteDigest, UpdateNote};

/// One category section of composed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSection {
    title: String,
    lines: Vec<String>,
}

impl NoteSection {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// The composed changelog: local markdown merged with the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedNotes {
    version: String,
    sections: Vec<NoteSection>,
    has_content: bool,
}

impl ComposedNotes {
    /// Version label, `"latest"` when the digest had none.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sections in presentation order: the six default categories first,
    /// then any custom headings in order of first appearance.
    #[must_use]
    pub fn sections(&self) -> &[NoteSection] {
        &self.sections
    }

    /// Looks up a section by its heading.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&NoteSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Whether any configured content exists at all (non-blank local
    /// markdown or a non-empty digest).
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.has_content
    }
}

/// Merges the host's local markdown changelog with the aggregated digest.
///
/// Digest entries are appended as formatted lines under their category's
/// display-name section. Entries from packages other than the hosting
/// bundle itself (`own_source_id`) are prefixed with their source name.
#[must_use]
pub fn compose_sections(local_markdown: &str, digest: &NoteDigest, own_source_id: &str) -> ComposedNotes {
    let mut sections = parse_local_sections(local_markdown);

    for note in digest.notes() {
        let heading = note.category().display_name();
        push_line(&mut sections, heading, format_note_line(note, own_source_id));
    }

    let version = digest.version().trim();
    ComposedNotes {
        version: if version.is_empty() { "latest".to_owned() } else { version.to_owned() },
        has_content: !local_markdown.trim().is_empty() || !digest.notes().is_empty(),
        sections,
    }
}

/// Splits a markdown document into category sections.
///
/// `## ` headings switch the current section (mapped through the
/// category taxonomy), `# ` title lines are skipped, bullets are
/// normalized to `- `, numbered lines pass through, and bare lines
/// become bullets.
fn parse_local_sections(markdown: &str) -> Vec<NoteSection> {
    let mut sections: Vec<NoteSection> = NoteCategory::ALL
        .iter()
        .map(|category| NoteSection {
            title: category.display_name().to_owned(),
            lines: Vec::new(),
        })
        .collect();

    let mut current = NoteCategory::Highlights.display_name().to_owned();
    for raw_line in markdown.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(heading) = line.strip_prefix("## ") {
            current = normalize_heading(heading);
            ensure_section(&mut sections, &current);
            continue;
        }

        if line.starts_with("# ") {
            continue;
        }

        if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            push_line(&mut sections, &current, format!("- {}", rest.trim_start()));
            continue;
        }

        if is_numbered_line(line) {
            push_line(&mut sections, &current, line.to_owned());
            continue;
        }

        push_line(&mut sections, &current, format!("- {line}"));
    }

    sections
}

fn ensure_section(sections: &mut Vec<NoteSection>, title: &str) {
    if !sections.iter().any(|s| s.title == title) {
        sections.push(NoteSection {
            title: title.to_owned(),
            lines: Vec::new(),
        });
    }
}

fn push_line(sections: &mut Vec<NoteSection>, title: &str, line: String) {
    ensure_section(sections, title);
    if let Some(section) = sections.iter_mut().find(|s| s.title == title) {
        section.lines.push(line);
    }
}

/// Maps a heading through the category taxonomy; unknown headings keep
/// their own (trimmed) text, a blank heading means the first section.
fn normalize_heading(heading: &str) -> String {
    let clean = heading.trim();
    if clean.is_empty() {
        return NoteCategory::Highlights.display_name().to_owned();
    }

    let compact: String = clean
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(*c, '_' | '-' | ' '))
        .collect();
    match compact.as_str() {
        "highlights" => NoteCategory::Highlights.display_name().to_owned(),
        "fixes" => NoteCategory::Fixes.display_name().to_owned(),
        "knownissues" => NoteCategory::KnownIssues.display_name().to_owned(),
        "packchanges" => NoteCategory::PackChanges.display_name().to_owned(),
        "modupdates" => NoteCategory::ModUpdates.display_name().to_owned(),
        "other" => NoteCategory::Other.display_name().to_owned(),
        _ => clean.to_owned(),
    }
}

/// Matches `1. like this` ordered-list lines.
fn is_numbered_line(line: &str) -> bool {
    let Some((digits, rest)) = line.split_once('.') else {
        return false;
    };
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && rest.starts_with(char::is_whitespace)
        && !rest.trim().is_empty()
}

fn format_note_line(note: &UpdateNote, own_source_id: &str) -> String {
    let body = strip_inline_markdown(note.body());
    let from_own_bundle = note.source_id() == own_source_id
        || note.source_name().is_empty()
        || note.source_name().eq_ignore_ascii_case(note.source_id());
    let prefix = if from_own_bundle {
        String::new()
    } else {
        format!("[{}] ", note.source_name())
    };

    if body.is_empty() {
        format!("- {prefix}{}", note.title())
    } else {
        format!("- {prefix}{}: {body}", note.title())
    }
}

fn strip_inline_markdown(text: &str) -> String {
    text.replace('`', "")
        .replace("**", "")
        .replace("__", "")
        .replace('*', "")
        .replace('_', "")
        .replace(['[', ']', '(', ')'], "")
        .trim()
        .to_owned()
}
