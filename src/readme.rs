//! README generation: each section file's references, grouped by heading.

use crate::bibtex::read_bibtex;
use crate::error::{Error, Result};
use crate::latex::extract_sections;
use crate::model::{BibEntry, Bibliography, CitationKeys, SectionRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_PREAMBLE: &str = "\
![Status](https://img.shields.io/badge/status-active-brightgreen?style=flat-square)
![Contributions Welcome](https://img.shields.io/badge/contributions-welcome-blue?style=flat-square)
![Platform](https://img.shields.io/badge/platform-web-blueviolet?style=flat-square)

## 📘 Read the Review

You can read the review directly on arXiv or access it as a collaborative online book:

👉 [arXiv](https://arxiv.org/pdf/2507.07456)

👉 [Online Book](https://lnkd.in/eWQVf4jJ)

We also **welcome community contributions**. This is a living resource of the references used in the review, kept current with the evolving ecosystem. If you don't find your work or your favourite work here, please add it.

### ✨ Join the Community

Help us grow and improve this resource by sharing your feedback or contributing directly via the online platform.";

const SUMMARY_LINE: &str =
    "This document provides an overview of the research sections and their associated references.";

/// README layout options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeOptions {
    pub title: String,
    /// Markdown placed between the title and the section lists.
    pub preamble: String,
    /// Section file stems listed first, in this order; others follow alphabetically.
    pub order: Vec<String>,
    /// File stem -> display name.
    pub display_names: BTreeMap<String, String>,
}

impl Default for ReadmeOptions {
    fn default() -> Self {
        let names = [
            ("introduction", "Introduction"),
            ("data_taxonomy", "The Shape and Structure of Chemical Data"),
            ("architectures", "Building Principles of GPMs"),
            ("evals", "Evaluations"),
            ("applications", "Applications"),
            ("ai_scientists", "Accelerating Applications"),
            ("safety", "Implications of GPMs: Education, Safety, and Ethics"),
            ("outlook_conclusions", "Outlook and Conclusions"),
        ];
        Self {
            title: "General Purpose Models for the Chemical Sciences ✨".to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            order: names.iter().map(|(stem, _)| stem.to_string()).collect(),
            display_names: names
                .iter()
                .map(|(stem, name)| (stem.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl ReadmeOptions {
    pub fn display_name<'a>(&'a self, stem: &'a str) -> &'a str {
        self.display_names.get(stem).map_or(stem, String::as_str)
    }

    /// File stems in output order.
    fn ordered<'a>(&self, stems: impl Iterator<Item = &'a String>) -> Vec<&'a String> {
        let rank = |stem: &str| {
            self.order
                .iter()
                .position(|o| o == stem)
                .unwrap_or(usize::MAX)
        };
        let mut stems: Vec<&String> = stems.collect();
        stems.sort_by(|a, b| rank(a.as_str()).cmp(&rank(b.as_str())).then_with(|| a.cmp(b)));
        stems
    }
}

/// README generation summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadmeReport {
    pub files: usize,
    pub sections: usize,
    pub citations: usize,
    pub bibliography_entries: usize,
    /// Cited keys absent from the bibliography, sorted.
    pub missing: Vec<String>,
}

fn format_entry(entry: &BibEntry) -> String {
    let title = if entry.title.is_empty() {
        format!("Citation {}", entry.key)
    } else {
        entry.title.clone()
    };
    let year = if entry.year.is_empty() {
        "Unknown"
    } else {
        entry.year.as_str()
    };

    if entry.url.is_empty() {
        format!("{} - {}", year, title)
    } else {
        format!("{} - [{}]({})", year, title, entry.url)
    }
}

/// Writes a citation list: found entries newest first, then missing keys.
fn write_citations(out: &mut String, keys: &CitationKeys, bibliography: &Bibliography) {
    if keys.is_empty() {
        return;
    }

    let (mut found, missing): (Vec<_>, Vec<_>) = keys
        .iter()
        .map(|key| (key, bibliography.get(key)))
        .partition(|(_, entry)| entry.is_some());
    found.sort_by_key(|(_, entry)| Reverse(entry.map_or(0, BibEntry::sort_year)));

    for (_, entry) in found {
        if let Some(entry) = entry {
            let _ = writeln!(out, "- {}", format_entry(entry));
        }
    }
    for (key, _) in missing {
        let _ = writeln!(out, "- {} *(citation not found in bibliography)*", key);
    }
    out.push('\n');
}

/// Renders the README from section records keyed by file stem.
pub fn render_readme(
    files: &BTreeMap<String, Vec<SectionRecord>>,
    bibliography: &Bibliography,
    options: &ReadmeOptions,
) -> String {
    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", options.title);
    if !options.preamble.is_empty() {
        let _ = write!(out, "{}\n\n", options.preamble.trim_end());
    }
    let _ = write!(out, "{}\n\n", SUMMARY_LINE);

    for stem in options.ordered(files.keys()) {
        let records = &files[stem];
        if records.is_empty() {
            continue;
        }

        let display = options.display_name(stem);
        let _ = write!(out, "## {}\n\n", display);

        for record in records {
            if !record.title.eq_ignore_ascii_case(display) {
                let hashes = "#".repeat(usize::from(record.level) + 2);
                let _ = write!(out, "{} {}\n\n", hashes, record.title);
            }
            write_citations(&mut out, &record.direct_citations, bibliography);
        }
    }

    out
}

/// Scans `sections_dir/*.tex`, reads the bibliography and renders the README.
pub fn generate_readme(
    sections_dir: &Path,
    bib_path: &Path,
    options: &ReadmeOptions,
) -> Result<(String, ReadmeReport)> {
    if !sections_dir.is_dir() {
        return Err(Error::MissingInput(sections_dir.to_path_buf()));
    }
    if !bib_path.is_file() {
        return Err(Error::MissingInput(bib_path.to_path_buf()));
    }

    let bibliography = read_bibtex(bib_path)?;

    let mut files = BTreeMap::new();
    for entry in fs::read_dir(sections_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("tex") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read section file");
                continue;
            }
        };
        let records = extract_sections(&content);
        if !records.is_empty() {
            files.insert(stem.to_string(), records);
        }
    }

    let mut report = ReadmeReport {
        files: files.len(),
        bibliography_entries: bibliography.len(),
        ..Default::default()
    };
    let mut missing = BTreeSet::new();
    for record in files.values().flatten() {
        report.sections += 1;
        report.citations += record.direct_citations.len();
        missing.extend(
            record
                .direct_citations
                .iter()
                .filter(|key| bibliography.get(key).is_none())
                .map(str::to_string),
        );
    }
    report.missing = missing.into_iter().collect();

    info!(
        files = report.files,
        sections = report.sections,
        citations = report.citations,
        missing = report.missing.len(),
        "generated README"
    );
    Ok((render_readme(&files, &bibliography, options), report))
}
