//! Heading outline of a LaTeX section file with the citations under each heading.

use crate::model::{CitationKeys, SectionRecord};
use crate::normalize::{parse_citation_keys, CITE_COMMAND_NAMES};
use regex::Regex;
use std::sync::LazyLock;

static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\\((?:sub)*)section\*?\{([^}]+)\}(?:\s*\\label\{([^}]+)\})?").unwrap()
});

static RE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\(?:{})\{{([^}}]*)\}}", CITE_COMMAND_NAMES)).unwrap()
});

struct Heading<'a> {
    level: u8,
    title: &'a str,
    label: Option<&'a str>,
    start: usize,
    end: usize,
}

fn citations_in(text: &str) -> CitationKeys {
    let mut keys = CitationKeys::new();
    for caps in RE_CITATION.captures_iter(text) {
        keys.extend(parse_citation_keys(&caps[1]));
    }
    keys
}

/// Scans `\section`, `\subsection` and `\subsubsection` headings.
///
/// Each record's `citations` covers the text up to the next heading of equal
/// or higher priority; `direct_citations` stops at the next heading of any level.
pub fn extract_sections(content: &str) -> Vec<SectionRecord> {
    let headings: Vec<Heading> = RE_HEADING
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let subs = caps.get(1).map_or(0, |m| m.len() / 3);
            Some(Heading {
                level: u8::try_from(subs + 1).unwrap_or(u8::MAX),
                title: caps.get(2)?.as_str().trim(),
                label: caps.get(3).map(|m| m.as_str().trim()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let next_any = headings.get(i + 1).map_or(content.len(), |h| h.start);
            let next_peer = headings[i + 1..]
                .iter()
                .find(|h| h.level <= heading.level)
                .map_or(content.len(), |h| h.start);

            SectionRecord {
                level: heading.level,
                title: heading.title.to_string(),
                label: heading.label.map(str::to_string),
                citations: citations_in(&content[heading.end..next_peer]),
                direct_citations: citations_in(&content[heading.end..next_any]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"
\section{Applications}\label{sec:apps}
Intro \autocite{a, b}.
\subsection{Prediction}
Models \cite{c} and \autocite{a}.
\subsubsection*{Details}
More \textcite{d}.
\section{Outlook}
Final \parencite{e}.
";

    #[test]
    fn test_levels_and_labels() {
        let records = extract_sections(SOURCE);
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.level, r.title.as_str(), r.label.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Applications", Some("sec:apps")),
                (2, "Prediction", None),
                (3, "Details", None),
                (1, "Outlook", None),
            ]
        );
    }

    #[test]
    fn test_citation_scopes() {
        let records = extract_sections(SOURCE);
        assert_eq!(records[0].citations.as_slice(), &["a", "b", "c", "d"]);
        assert_eq!(records[0].direct_citations.as_slice(), &["a", "b"]);
        assert_eq!(records[1].citations.as_slice(), &["c", "a", "d"]);
        assert_eq!(records[1].direct_citations.as_slice(), &["c", "a"]);
        assert_eq!(records[3].citations.as_slice(), &["e"]);
    }

    #[test]
    fn test_no_headings() {
        assert!(extract_sections("plain text \\cite{a}").is_empty());
    }
}
