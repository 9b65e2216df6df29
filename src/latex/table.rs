//! Simplification of `longtable` environments before conversion.
//!
//! Pandoc drops or mangles multi-page table furniture and fragmented
//! chemistry strings, so each `longtable` body is reduced to a plain
//! `tabular` with its cells joined back together. Text outside the tables
//! is left as is.

use crate::cleanup::collapse_blank_lines;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

static RE_LONGTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\begin\{longtable\}.*?\\end\{longtable\}").unwrap());

/// Cell rewrites, applied first and in order.
static CELL_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // SMILES examples stacked in a makecell
        (
            r"(?s)\\footnotesize \\makecell\[tl\]\{%\s*\\smi\{([^}]+)\}\\\\.*?\\smi\{([^}]+)\}\\\\.*?\\emph\{etc\.\}\s*\}",
            r"\footnotesize \texttt{${1}}, \texttt{${2}}, \emph{etc.}",
        ),
        // SELFIES split over four fragments
        (
            r"\\footnotesize \\texttt\{([^}]+)\}\s*\\texttt\{([^}]+)\}\s*\\texttt\{([^}]+)\}\s*\\texttt\{([^}]+)\}",
            r"\footnotesize \texttt{${1}${2}${3}${4}}",
        ),
        // InChI split over three fragments
        (
            r"\\footnotesize \\texttt\{(InChI=[^}]+)\}\s*\\texttt\{([^}]+)\}\s*\\texttt\{([^}]+)\}",
            r"\footnotesize \texttt{${1}${2}${3}}",
        ),
        (r"\\cellimage\{([^}]+)\}", "[Image: ${1}]"),
        (r"\\smi\{([^}]+)\}", r"\texttt{${1}}"),
        (r"\\makecell\[tl\]\{([^}]+)\}", "${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Table furniture rewrites, applied after the cell rules.
static FURNITURE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\begin\{longtable\}", r"\begin{tabular}"),
        (r"\\end\{longtable\}", r"\end{tabular}"),
        (r"(?s)\\caption\{.*?\}.*?\\label\{.*?\}.*?\\\\", ""),
        (r"(?s)\\endfirsthead.*?\\endhead", ""),
        (r"(?s)\\endfoot.*?\\endlastfoot", ""),
        (r"(?s)\\multicolumn\{\d+\}\{[cr]\}.*?\\\\", ""),
        (r"\\\\[ \t]*%[^\n]*\n", "\\\\ \n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

fn simplify_table(table: &str) -> String {
    let mut result = table.to_string();
    for (pattern, replacement) in CELL_RULES.iter().chain(FURNITURE_RULES.iter()) {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    collapse_blank_lines(&result)
}

/// Rewrites every `longtable` environment as a simple `tabular`.
pub fn simplify_longtables(content: &str) -> String {
    let mut count = 0usize;
    let result = RE_LONGTABLE.replace_all(content, |caps: &Captures| {
        count += 1;
        simplify_table(&caps[0])
    });
    if count > 0 {
        debug!(tables = count, "simplified longtable environments");
    }
    result.into_owned()
}
