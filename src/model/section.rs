//! Section outline records.

use serde::Serialize;

/// Ordered citation keys with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationKeys(Vec<String>);

impl CitationKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key unless it is already present.
    pub fn push(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !key.is_empty() && !self.0.contains(&key) {
            self.0.push(key);
        }
    }

    pub fn extend<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.push(key);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A heading found in a LaTeX section file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    /// 1 for `\section`, 2 for `\subsection`, 3 for `\subsubsection`.
    pub level: u8,
    pub title: String,
    pub label: Option<String>,
    /// Keys cited before the next heading of equal or higher priority.
    pub citations: CitationKeys,
    /// Keys cited before the next heading of any level.
    pub direct_citations: CitationKeys,
}
