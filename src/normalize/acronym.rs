//! Acronym reference normalization.
//!
//! Pandoc renders glossary references from the LaTeX source as
//! `[text]{acronym-label="key" ...}` spans or as
//! `<span data-acronym-label="key">text</span>`. Both become acronym
//! references whose displayed text matches what the author wrote.
//!
//! # Decision table
//!
//! | displayed text                          | output                          |
//! |-----------------------------------------|---------------------------------|
//! | equals key (case-insensitive)           | reference                       |
//! | key + `s`                               | reference + `s`                 |
//! | starts with key and contains `-`        | rewritten prefix + `-rest`      |
//! | contains a space or otherwise differs   | reference with text override    |

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Output syntax for acronym references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcronymSyntax {
    /// Quarto shortcode: `{{< acr key >}}`
    #[default]
    Shortcode,
    /// LaTeX-style command read by the acronyms filter: `\acr{key}`
    Command,
}

impl AcronymSyntax {
    /// Renders a reference, with optional displayed-text override.
    pub fn render(self, key: &str, text: Option<&str>) -> String {
        match (self, text) {
            (Self::Shortcode, None) => format!("{{{{< acr {} >}}}}", key),
            (Self::Shortcode, Some(text)) => {
                format!("{{{{< acr {} text=\"{}\" >}}}}", key, text.replace('"', "'"))
            }
            (Self::Command, None) => format!("\\acr{{{}}}", key),
            (Self::Command, Some(text)) => format!("\\acr[{}]{{{}}}", text, key),
        }
    }
}

// Bracketed span: the displayed text may not contain brackets
static RE_BRACKET_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\[\]\n]+)\]\{acronym-label="([^"]*)"[^}]*\}"#).unwrap()
});

static RE_HTML_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span data-acronym-label="([^"]*)"[^>]*>(.*?)</span>"#).unwrap()
});

/// How a displayed text relates to its acronym key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Exact,
    Plural,
    Override,
}

fn classify(display: &str, key: &str) -> Match {
    let display_lower = display.to_lowercase();
    let key_lower = key.to_lowercase();

    if display_lower == key_lower {
        return Match::Exact;
    }
    if !display.contains(' ')
        && display_lower.ends_with('s')
        && !key_lower.ends_with('s')
        && display_lower[..display_lower.len() - 1] == key_lower
    {
        return Match::Plural;
    }
    Match::Override
}

fn render_segment(display: &str, key: &str, syntax: AcronymSyntax) -> String {
    match classify(display, key) {
        Match::Exact => syntax.render(key, None),
        Match::Plural => format!("{}s", syntax.render(key, None)),
        Match::Override => syntax.render(key, Some(display)),
    }
}

/// Rewrites one acronym occurrence given its displayed text and label.
pub fn rewrite_acronym(display: &str, label: &str, syntax: AcronymSyntax) -> String {
    let key = label.split('+').next().unwrap_or(label);

    let (prefix, inner, suffix) = match display
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        Some(inner) if !inner.is_empty() => ("`", inner, "`"),
        _ => ("", display, ""),
    };

    let body = match inner.split_once('-') {
        Some((head, tail))
            if !head.is_empty()
                && inner.to_lowercase().starts_with(&key.to_lowercase()) =>
        {
            format!("{}-{}", render_segment(head, key, syntax), tail)
        }
        _ => render_segment(inner, key, syntax),
    };

    format!("{}{}{}", prefix, body, suffix)
}

/// Rewrites every acronym span in converted Markdown.
pub fn convert_acronyms(content: &str, syntax: AcronymSyntax) -> String {
    let bracketed = RE_BRACKET_SPAN.replace_all(content, |caps: &Captures| {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        // An escaped bracket is literal text
        if content[..start].ends_with('\\') {
            return caps[0].to_string();
        }
        rewrite_acronym(&caps[1], &caps[2], syntax)
    });

    RE_HTML_SPAN
        .replace_all(&bracketed, |caps: &Captures| {
            rewrite_acronym(&caps[2], &caps[1], syntax)
        })
        .into_owned()
}
