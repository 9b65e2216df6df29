//! Bibliography entries used for README reference lists.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// One bibliography record, keyed by citation key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    pub title: String,
    pub year: String,
    pub authors: String,
    pub journal: String,
    pub url: String,
}

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

impl BibEntry {
    /// Numeric year used for ordering: the first four-digit run, or 0.
    pub fn sort_year(&self) -> u32 {
        RE_YEAR
            .find(&self.year)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }
}

/// Bibliography keyed by citation key.
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: HashMap<String, BibEntry>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: BibEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: &str) -> BibEntry {
        BibEntry {
            year: year.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_year() {
        assert_eq!(entry("2024").sort_year(), 2024);
        assert_eq!(entry("circa 1999a").sort_year(), 1999);
        assert_eq!(entry("").sort_year(), 0);
        assert_eq!(entry("n.d.").sort_year(), 0);
    }
}
