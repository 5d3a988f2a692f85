//! Property-based tests for normalization totality.
//!
//! For every raw field combination (including all-absent and all-blank),
//! constructing an `UpdateNote` must never panic and must always yield a
//! value satisfying the canonical-form invariants: non-blank
//! source/version/title, lowercase source id, non-negative timestamp,
//! category within the fixed taxonomy.

use proptest::prelude::*;
use waypost_types::{NoteCategory, RawNote, UpdateNote};

fn raw_field() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("   ".to_owned())),
        proptest::string::string_regex("[ -~]{0,40}").unwrap().prop_map(Some),
        proptest::string::string_regex("\\PC{0,20}").unwrap().prop_map(Some),
    ]
}

fn raw_note() -> impl Strategy<Value = RawNote> {
    (
        raw_field(),
        raw_field(),
        raw_field(),
        raw_field(),
        raw_field(),
        raw_field(),
        any::<i64>(),
        any::<i32>(),
    )
        .prop_map(
            |(source_id, source_name, version, category, title, body, timestamp_ms, sort_order)| {
                RawNote {
                    source_id,
                    source_name,
                    version,
                    category,
                    title,
                    body,
                    timestamp_ms,
                    sort_order,
                }
            },
        )
}

proptest! {
    #[test]
    fn normalize_is_total(raw in raw_note()) {
        let note = UpdateNote::normalize(raw);

        prop_assert!(!note.source_id().trim().is_empty());
        let normalized_source_id = note.source_id().to_lowercase();
        prop_assert_eq!(note.source_id(), normalized_source_id.trim());
        prop_assert!(!note.source_name().trim().is_empty());
        prop_assert!(!note.version().trim().is_empty());
        prop_assert!(!note.title().trim().is_empty());
        prop_assert_eq!(note.body(), note.body().trim());
        prop_assert!(note.timestamp_ms() >= 0);
        prop_assert!(NoteCategory::ALL.contains(&note.category()));
    }

    #[test]
    fn normalize_is_idempotent_on_canonical_fields(raw in raw_note()) {
        let first = UpdateNote::normalize(raw);
        let again = UpdateNote::normalize(RawNote {
            source_id: Some(first.source_id().to_owned()),
            source_name: Some(first.source_name().to_owned()),
            version: Some(first.version().to_owned()),
            category: Some(first.category().display_name().to_owned()),
            title: Some(first.title().to_owned()),
            body: Some(first.body().to_owned()),
            timestamp_ms: first.timestamp_ms(),
            sort_order: first.sort_order(),
        });
        prop_assert_eq!(first, again);
    }
}
