//! # Text Cleanup
//!
//! Character-level cleanup shared by the LaTeX stripper and the bibliography copy.
//!
//! ## Tables
//!
//! 1. **Punctuation** - typographic dashes and quotes mapped to ASCII (LaTeX bodies)
//! 2. **Bibliography** - punctuation plus symbols, Greek letters and thin spaces,
//!    applied after Unicode NFC normalization

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Character Tables
// ============================================================================

/// Dash and quote mapping table
const PUNCTUATION_MAPPINGS: &[(char, &str)] = &[
    ('\u{2011}', "-"), // Non-breaking hyphen
    ('\u{2012}', "-"), // Figure dash
    ('\u{2013}', "-"), // En dash
    ('\u{2014}', "-"), // Em dash
    ('\u{2015}', "-"), // Horizontal bar
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
];

/// Symbols that break BibTeX processing or citeproc output
const BIBLIOGRAPHY_MAPPINGS: &[(char, &str)] = &[
    ('\u{2026}', "..."),
    ('\u{00D7}', "x"),
    ('\u{00B0}', "deg"),
    ('\u{00B1}', "+/-"),
    ('\u{2212}', "-"), // Minus sign
    ('\u{2009}', " "), // Thin space
    ('\u{202F}', " "), // Narrow no-break space
    // Greek
    ('α', "alpha"),
    ('β', "beta"),
    ('γ', "gamma"),
    ('δ', "delta"),
    ('ε', "epsilon"),
    ('θ', "theta"),
    ('λ', "lambda"),
    ('μ', "mu"),
    ('π', "pi"),
    ('σ', "sigma"),
    ('τ', "tau"),
    ('φ', "phi"),
    ('χ', "chi"),
    ('ψ', "psi"),
    ('ω', "omega"),
];

fn lookup(table: &[(char, &'static str)], c: char) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, replacement)| *replacement)
}

// ============================================================================
// Public API
// ============================================================================

/// Replace typographic dashes and quotes with ASCII equivalents.
pub fn normalize_punctuation(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match lookup(PUNCTUATION_MAPPINGS, c) {
            Some(replacement) => result.push_str(replacement),
            None => result.push(c),
        }
    }
    result
}

/// Clean a BibTeX database for downstream citation processing.
///
/// - Unicode NFC normalization
/// - Dash and quote mapping
/// - Symbol and Greek letter spelling
pub fn clean_bibliography(input: &str) -> String {
    let mut result = String::with_capacity(input.len());

    for c in input.nfc() {
        if let Some(replacement) = lookup(PUNCTUATION_MAPPINGS, c) {
            result.push_str(replacement);
            continue;
        }
        if let Some(replacement) = lookup(BIBLIOGRAPHY_MAPPINGS, c) {
            result.push_str(replacement);
            continue;
        }
        result.push(c);
    }

    result
}

static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Collapse runs of two or more blank lines into a single blank line.
pub fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n\n").into_owned()
}
