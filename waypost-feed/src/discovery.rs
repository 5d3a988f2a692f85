//! Auto-discovery of per-package changes documents.
//!
//! Every loaded package may bundle one optional JSON document at
//! [`CHANGES_DOCUMENT_PATH`](crate::host::CHANGES_DOCUMENT_PATH). The
//! scanner converts each document into normalized notes and memoizes the
//! result on a signature of the loaded-package set, so an unchanged host
//! never pays for a second scan.

use crate::error::DocumentError;
use crate::guard::FaultLog;
use crate::host::{CHANGES_DOCUMENT_PATH, PackageHost, PackageInfo};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, warn};
use waypost_types::{RawNote, UpdateNote};

/// Discovered notes plus the memoization state that decides whether a
/// re-scan is due.
#[derive(Debug, Default)]
pub(crate) struct DiscoveryState {
    notes: Vec<UpdateNote>,
    signature: String,
    scanned: bool,
}

impl DiscoveryState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the discovered notes, re-scanning only when the
    /// loaded-package signature changed or no scan has completed yet.
    pub(crate) fn ensure_scanned(
        &mut self,
        host: &dyn PackageHost,
        failures: &FaultLog,
    ) -> &[UpdateNote] {
        let packages = host.loaded_packages();
        let signature = package_signature(&packages);
        if self.scanned && signature == self.signature {
            return &self.notes;
        }

        self.notes.clear();
        for package in &packages {
            self.scan_package(host, package, failures);
        }

        debug!(packages = packages.len(), notes = self.notes.len(), "auto-discovery scan completed");
        self.signature = signature;
        self.scanned = true;
        &self.notes
    }

    /// Drops all discovered notes and the memoized signature, forcing a
    /// full re-scan on the next rebuild.
    pub(crate) fn reset(&mut self) {
        self.notes.clear();
        self.signature.clear();
        self.scanned = false;
    }

    fn scan_package(&mut self, host: &dyn PackageHost, package: &PackageInfo, failures: &FaultLog) {
        let package_id = normalize_package_id(&package.id);
        let outcome = match host.open_changes_document(&package_id) {
            Ok(Some(text)) => parse_changes_document(&text, package),
            Ok(None) => return,
            Err(error) => Err(DocumentError::Open(error)),
        };

        match outcome {
            Ok(mut notes) => self.notes.append(&mut notes),
            Err(error) => {
                if failures.first_occurrence(&package_id) {
                    warn!(
                        package = %package_id,
                        document = CHANGES_DOCUMENT_PATH,
                        "auto-discovery failed: {error}"
                    );
                }
            }
        }
    }
}

/// Deterministic fingerprint of the loaded-package set: sorted
/// `id@version;` pairs.
pub(crate) fn package_signature(packages: &[PackageInfo]) -> String {
    let mut pairs: BTreeMap<String, String> = BTreeMap::new();
    for package in packages {
        pairs.insert(
            normalize_package_id(&package.id),
            non_blank(&package.version, "unknown"),
        );
    }

    let mut signature = String::new();
    for (id, version) in &pairs {
        let _ = write!(signature, "{id}@{version};");
    }
    signature
}

/// Parses one changes document into normalized notes.
///
/// The document may override the source id/name/version and supply a
/// default timestamp; each entry is defaulted field by field. Elements
/// that are not objects are skipped but still consume their position
/// index, so explicit `sortOrder` values around them stay meaningful.
pub(crate) fn parse_changes_document(
    text: &str,
    package: &PackageInfo,
) -> Result<Vec<UpdateNote>, DocumentError> {
    let parsed: Value = serde_json::from_str(text)?;
    let Value::Object(root) = parsed else {
        return Err(DocumentError::RootNotObject);
    };

    let fallback_id = normalize_package_id(&package.id);
    let fallback_name = non_blank(&package.name, &fallback_id);
    let fallback_version = non_blank(&package.version, "unknown");

    let source_id = string_field(&root, "modId", &fallback_id).to_lowercase();
    let source_name = string_field(&root, "modName", &fallback_name);
    let source_version = string_field(&root, "version", &fallback_version);
    let default_timestamp = i64_field(&root, "timestamp", 0);

    let Some(Value::Array(entries)) = root.get("entries") else {
        return Err(DocumentError::EntriesNotArray);
    };

    let mut notes = Vec::new();
    for (index, element) in entries.iter().enumerate() {
        let Value::Object(entry) = element else {
            continue;
        };

        let body = string_field(entry, "bodyMarkdown", &string_field(entry, "body", ""));
        notes.push(UpdateNote::normalize(RawNote {
            source_id: Some(source_id.clone()),
            source_name: Some(source_name.clone()),
            version: Some(source_version.clone()),
            category: Some(string_field(entry, "category", "Other")),
            title: Some(string_field(entry, "title", "Untitled update")),
            body: Some(body),
            timestamp_ms: i64_field(entry, "timestamp", default_timestamp),
            sort_order: i32_field(entry, "sortOrder", index as i32),
        }));
    }
    Ok(notes)
}

pub(crate) fn normalize_package_id(id: &str) -> String {
    non_blank(id, "unknown").to_lowercase()
}

/// Trimmed `value`, or the trimmed fallback when blank, or `"unknown"`
/// when both are blank.
fn non_blank(value: &str, fallback: &str) -> String {
    let clean = value.trim();
    if !clean.is_empty() {
        return clean.to_owned();
    }
    let fallback = fallback.trim();
    if fallback.is_empty() { "unknown".to_owned() } else { fallback.to_owned() }
}

/// Reads a string-ish field: strings are trimmed, numbers and booleans
/// stringified, anything else (or blank) falls back.
fn string_field(object: &Map<String, Value>, key: &str, fallback: &str) -> String {
    let text = match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    non_blank(&text, fallback)
}

fn i64_field(object: &Map<String, Value>, key: &str, fallback: i64) -> i64 {
    match object.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(fallback),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(fallback),
        _ => fallback,
    }
}

fn i32_field(object: &Map<String, Value>, key: &str, fallback: i32) -> i32 {
    match object.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(fallback),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(fallback),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use waypost_types::NoteCategory;

    fn package() -> PackageInfo {
        PackageInfo::new("Terrain-Pack", "Terrain Pack", "2.1.0")
    }

    #[test]
    fn signature_is_sorted_and_normalized() {
        let packages = vec![
            PackageInfo::new("Zeta", "Zeta", "2.0"),
            PackageInfo::new("alpha", "Alpha", ""),
        ];
        assert_eq!(package_signature(&packages), "alpha@unknown;zeta@2.0;");
    }

    #[test]
    fn signature_ignores_enumeration_order() {
        let a = vec![PackageInfo::new("a", "A", "1"), PackageInfo::new("b", "B", "2")];
        let b = vec![PackageInfo::new("b", "B", "2"), PackageInfo::new("a", "A", "1")];
        assert_eq!(package_signature(&a), package_signature(&b));
    }

    #[test]
    fn parses_full_document() {
        let text = r#"{
            "modId": "Terrain-Pack",
            "modName": "Terrain Pack",
            "version": "2.1.0",
            "timestamp": 1700000000000,
            "entries": [
                {"category": "highlights", "title": "New cliffs", "bodyMarkdown": "Tall ones."},
                {"category": "fixes", "title": "Fewer holes", "timestamp": 1700000000500, "sortOrder": 7}
            ]
        }"#;

        let notes = parse_changes_document(text, &package()).unwrap();
        assert_eq!(notes.len(), 2);

        assert_eq!(notes[0].source_id(), "terrain-pack");
        assert_eq!(notes[0].category(), NoteCategory::Highlights);
        assert_eq!(notes[0].timestamp_ms(), 1_700_000_000_000);
        assert_eq!(notes[0].sort_order(), 0);

        assert_eq!(notes[1].timestamp_ms(), 1_700_000_000_500);
        assert_eq!(notes[1].sort_order(), 7);
    }

    #[test]
    fn document_overrides_fall_back_to_package_identity() {
        let notes = parse_changes_document(r#"{"entries": [{"title": "t"}]}"#, &package()).unwrap();
        assert_eq!(notes[0].source_id(), "terrain-pack");
        assert_eq!(notes[0].source_name(), "Terrain Pack");
        assert_eq!(notes[0].version(), "2.1.0");
    }

    #[test]
    fn legacy_body_field_is_accepted() {
        let text = r#"{"entries": [{"title": "t", "body": "legacy body"}]}"#;
        let notes = parse_changes_document(text, &package()).unwrap();
        assert_eq!(notes[0].body(), "legacy body");
    }

    #[test]
    fn body_markdown_wins_over_legacy_body() {
        let text = r#"{"entries": [{"title": "t", "bodyMarkdown": "new", "body": "old"}]}"#;
        let notes = parse_changes_document(text, &package()).unwrap();
        assert_eq!(notes[0].body(), "new");
    }

    #[test]
    fn non_object_elements_keep_their_position_index() {
        let text = r#"{"entries": [{"title": "first"}, "noise", {"title": "third"}]}"#;
        let notes = parse_changes_document(text, &package()).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].sort_order(), 0);
        assert_eq!(notes[1].sort_order(), 2);
    }

    #[test]
    fn wrong_typed_fields_default_per_field() {
        let text = r#"{"entries": [{"category": [], "title": 42, "timestamp": "nonsense", "sortOrder": {}}]}"#;
        let notes = parse_changes_document(text, &package()).unwrap();
        assert_eq!(notes[0].category(), NoteCategory::Other);
        assert_eq!(notes[0].title(), "42");
        assert_eq!(notes[0].timestamp_ms(), 0);
        assert_eq!(notes[0].sort_order(), 0);
    }

    #[test]
    fn non_object_root_is_a_document_error() {
        assert!(matches!(
            parse_changes_document("[1, 2]", &package()),
            Err(DocumentError::RootNotObject)
        ));
    }

    #[test]
    fn missing_or_non_array_entries_is_a_document_error() {
        assert!(matches!(
            parse_changes_document("{}", &package()),
            Err(DocumentError::EntriesNotArray)
        ));
        assert!(matches!(
            parse_changes_document(r#"{"entries": "nope"}"#, &package()),
            Err(DocumentError::EntriesNotArray)
        ));
    }

    #[test]
    fn malformed_json_is_a_document_error() {
        assert!(matches!(
            parse_changes_document("{not json", &package()),
            Err(DocumentError::Json(_))
        ));
    }
}
