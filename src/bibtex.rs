//! BibTeX reader for reference lists.
//!
//! Parsing is delegated to `biblatex`. A file that fails to parse as a whole
//! is retried entry by entry, so a single malformed record only loses
//! itself. Field values are reduced to plain text.

use crate::error::Result;
use crate::latex::strip_commands;
use crate::model::{BibEntry, Bibliography};
use biblatex::{ChunksExt, Entry};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

fn clean_field(value: &str) -> String {
    strip_commands(value).trim_end_matches(',').trim().to_string()
}

/// First non-empty field among `names`, as plain text.
fn field(entry: &Entry, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| entry.get(name))
        .map(|chunks| clean_field(&chunks.format_verbatim()))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Link for an entry: `url`, then `doi`, then `eprint`.
///
/// DOIs become `https://doi.org/...`; arXiv identifiers become
/// `https://arxiv.org/abs/...`.
fn entry_url(entry: &Entry) -> String {
    let url = field(entry, &["url"]);
    if !url.is_empty() {
        return url;
    }

    let doi = field(entry, &["doi"]);
    if !doi.is_empty() {
        return if doi.starts_with("http") {
            doi
        } else {
            format!("https://doi.org/{}", doi)
        };
    }

    let eprint = field(entry, &["eprint"]);
    if eprint.is_empty() || eprint.starts_with("http") {
        eprint
    } else {
        format!("https://arxiv.org/abs/{}", eprint)
    }
}

fn to_bib_entry(entry: &Entry) -> BibEntry {
    BibEntry {
        key: entry.key.clone(),
        entry_type: entry.entry_type.to_string().to_lowercase(),
        title: field(entry, &["title"]),
        year: field(entry, &["year", "date"]),
        authors: field(entry, &["author"]),
        journal: field(entry, &["journal", "journaltitle", "booktitle"]),
        url: entry_url(entry),
    }
}

fn insert_all(bibliography: &mut Bibliography, source: &biblatex::Bibliography) {
    for entry in source.iter() {
        bibliography.insert(to_bib_entry(entry));
    }
}

/// Parses BibTeX source text.
pub fn parse_bibtex(content: &str) -> Bibliography {
    let mut bibliography = Bibliography::new();
    let normalized = content.replace("\r\n", "\n");

    match biblatex::Bibliography::parse(&normalized) {
        Ok(source) => insert_all(&mut bibliography, &source),
        Err(err) => {
            warn!(error = %err, "bibliography did not parse as a whole, parsing entries one by one");
            for (index, chunk) in normalized.split("\n@").enumerate() {
                let text = if index == 0 {
                    chunk.to_string()
                } else {
                    format!("@{}", chunk)
                };
                match biblatex::Bibliography::parse(&text) {
                    Ok(source) => insert_all(&mut bibliography, &source),
                    Err(err) => {
                        let start: String = text.trim_start().chars().take(40).collect();
                        debug!(start = %start, error = %err, "skipped bibliography entry");
                    }
                }
            }
        }
    }

    bibliography
}

/// Reads and parses a BibTeX file.
pub fn read_bibtex(path: &Path) -> Result<Bibliography> {
    let bibliography = parse_bibtex(&fs::read_to_string(path)?);
    info!(path = %path.display(), entries = bibliography.len(), "parsed bibliography");
    Ok(bibliography)
}
