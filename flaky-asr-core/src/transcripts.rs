//! Static transcript dataset
//!
//! The built-in records are embedded at compile time and parsed once at
//! startup. The store is read-only after construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const BUILTIN_TRANSCRIPTS: &str = include_str!("../data/transcripts.json");

/// Mocked ASR result for one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub always_fails: bool,
}

impl TranscriptRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, always_fails: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            always_fails,
        }
    }
}

/// Lookup table from identifier to record
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    records: HashMap<String, TranscriptRecord>,
}

impl TranscriptStore {
    /// Build a store from records; a later duplicate id replaces an earlier one
    pub fn from_records(records: impl IntoIterator<Item = TranscriptRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }

    /// Parse a store from a JSON array of records
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let records: Vec<TranscriptRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// The dataset shipped with the binary
    pub fn builtin() -> serde_json::Result<Self> {
        Self::from_json(BUILTIN_TRANSCRIPTS)
    }

    pub fn lookup(&self, id: &str) -> Option<&TranscriptRecord> {
        self.records.get(id)
    }

    /// All identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_loads() {
        let store = TranscriptStore::builtin().unwrap();

        assert_eq!(store.len(), 10);
        let first = store.lookup("audio-file-1.wav").unwrap();
        assert!(!first.always_fails);
    }

    #[test]
    fn test_builtin_texts_are_served_verbatim() {
        let store = TranscriptStore::builtin().unwrap();

        let first = store.lookup("audio-file-1.wav").unwrap();
        assert!(first.text.starts_with("\nChapter 1: The Quest\nOnce upon a time"));

        let last = store.lookup("audio-file-10.wav").unwrap();
        assert!(last.text.starts_with("\n  Sarah and Squiggles"));
        assert!(last.text.ends_with("incredible adventure."));
    }

    #[test]
    fn test_builtin_dataset_flags_one_failing_item() {
        let store = TranscriptStore::builtin().unwrap();

        let failing: Vec<&str> = store
            .ids()
            .into_iter()
            .filter(|id| store.lookup(id).is_some_and(|r| r.always_fails))
            .collect();

        assert_eq!(failing, vec!["audio-file-8.wav"]);
    }

    #[test]
    fn test_lookup_missing_returns_none() {
        let store = TranscriptStore::from_records(vec![TranscriptRecord::new("a.wav", "a", false)]);

        assert!(store.lookup("missing-item").is_none());
        assert!(store.lookup("").is_none());
    }

    #[test]
    fn test_from_json_defaults_always_fails() {
        let store = TranscriptStore::from_json(r#"[{"id": "x.wav", "text": "x"}]"#).unwrap();

        assert_eq!(store.lookup("x.wav"), Some(&TranscriptRecord::new("x.wav", "x", false)));
    }

    #[test]
    fn test_ids_are_sorted() {
        let store = TranscriptStore::from_records(vec![
            TranscriptRecord::new("b", "", false),
            TranscriptRecord::new("a", "", false),
            TranscriptRecord::new("c", "", true),
        ]);

        assert_eq!(store.ids(), vec!["a", "b", "c"]);
    }
}
