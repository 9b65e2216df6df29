//! Acronym table in the layout read by the Quarto acronyms extension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One acronym definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymEntry {
    pub key: String,
    pub shortname: String,
    pub longname: String,
}

impl AcronymEntry {
    pub fn new(
        key: impl Into<String>,
        shortname: impl Into<String>,
        longname: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            shortname: shortname.into(),
            longname: longname.into(),
        }
    }
}

/// Acronym entries, unique by key and kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcronymTable {
    entries: BTreeMap<String, AcronymEntry>,
}

#[derive(Serialize, Deserialize)]
struct AcronymDocument {
    acronyms: AcronymKeys,
}

#[derive(Serialize, Deserialize)]
struct AcronymKeys {
    keys: Vec<AcronymEntry>,
}

impl AcronymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry unless its key is already present.
    /// Returns true when the entry was added.
    pub fn insert(&mut self, entry: AcronymEntry) -> bool {
        if self.entries.contains_key(&entry.key) {
            return false;
        }
        self.entries.insert(entry.key.clone(), entry);
        true
    }

    /// Replaces the entry for a key, inserting it if absent.
    pub fn upsert(&mut self, entry: AcronymEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AcronymEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &AcronymEntry> {
        self.entries.values()
    }

    /// Serializes the table as a YAML document wrapped in `---` delimiters.
    pub fn to_yaml(&self) -> crate::Result<String> {
        let document = AcronymDocument {
            acronyms: AcronymKeys {
                keys: self.entries.values().cloned().collect(),
            },
        };
        let body = serde_yaml::to_string(&document)?;
        Ok(format!("---\n{}---\n", body))
    }

    /// Parses a table previously written by [`AcronymTable::to_yaml`].
    pub fn from_yaml(input: &str) -> crate::Result<Self> {
        let body = input
            .trim()
            .trim_start_matches("---")
            .trim_end_matches("---");
        let document: AcronymDocument = serde_yaml::from_str(body)?;
        let mut table = Self::new();
        for entry in document.acronyms.keys {
            table.insert(entry);
        }
        Ok(table)
    }
}
