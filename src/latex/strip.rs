//! Removal of document-level LaTeX that the section converter cannot use.

use crate::cleanup::{collapse_blank_lines, normalize_punctuation};
use crate::normalize::repair_citation_groups;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Title used when a section file has no `\section{...}`.
pub const UNTITLED: &str = "Untitled";

/// Ordered rewrite rules: preamble and document-structure commands are
/// removed, a few custom macros are rewritten.
static STRIP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\usepackage(?:\[[^\]]*\])?\{[^}]*\}", ""),
        (r"\\documentclass(?:\[[^\]]*\])?\{[^}]*\}", ""),
        (r"\\begin\{document\}", ""),
        (r"\\end\{document\}", ""),
        (r"\\maketitle\b", ""),
        (r"\\clearpage\b", ""),
        (r"\\tableofcontents\b", ""),
        (r"\\printbibliography(?:\[[^\]]*\])?", ""),
        (r"\\glsaddall\b", ""),
        (r"\\printnoidxglossary[^\n]*", ""),
        (r"\\section\*", r"\section"),
        (r"\\modelname\{([^}]+)\}", r"\texttt{${1}}"),
        (r"\\ce\{([^}]+)\}", "${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static RE_INPUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\input\{([^}]*)\}").unwrap());

static RE_ESCAPED_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\([&%_#$])").unwrap());
static RE_COMMAND_WITH_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\*?\{([^{}]*)\}").unwrap());
static RE_BARE_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\*?\s*").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Returns the balanced-brace argument starting at `open` (which must index a `{`)
/// and the byte index just past its closing brace.
pub fn braced_argument(content: &str, open: usize) -> Option<(&str, usize)> {
    if content.as_bytes().get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut escaped = false;
    for (offset, c) in content[open..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = open + offset;
                    return Some((&content[open + 1..end], end + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the first `\name{...}` and returns its argument.
pub fn command_argument<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("\\{}{{", name);
    let start = content.find(&needle)?;
    braced_argument(content, start + needle.len() - 1).map(|(arg, _)| arg)
}

/// Removes every `\name{...}` including its balanced argument.
pub fn remove_command(content: &str, name: &str) -> String {
    let needle = format!("\\{}{{", name);
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find(&needle) {
        result.push_str(&rest[..start]);
        match braced_argument(rest, start + needle.len() - 1) {
            Some((_, end)) => rest = &rest[end..],
            None => {
                // Unbalanced: keep the remainder untouched
                result.push_str(&rest[start..]);
                return result;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Reduces LaTeX markup to plain text: commands keep their argument text,
/// bare commands and braces are dropped, whitespace is collapsed.
pub fn strip_commands(text: &str) -> String {
    let mut result = text.replace("\\\\", " ").replace('~', " ");
    result = RE_ESCAPED_CHAR.replace_all(&result, "${1}").into_owned();
    loop {
        let next = RE_COMMAND_WITH_ARG.replace_all(&result, "${1}").into_owned();
        if next == result {
            break;
        }
        result = next;
    }
    let result = RE_BARE_COMMAND.replace_all(&result, "");
    let result = result.replace(['{', '}'], "");
    RE_SPACES.replace_all(result.trim(), " ").into_owned()
}

/// Applies the fixed strip rules to a section body.
///
/// Removes preamble and document-structure commands, `\input` commands
/// outside `sections/` and `\title{...}`; rewrites `\section*`,
/// `\modelname{x}` and `\ce{x}`; repairs citation key groups; maps
/// typographic punctuation to ASCII; collapses blank-line runs and trims.
pub fn strip_latex(content: &str) -> String {
    let mut result = content.to_string();

    for (pattern, replacement) in STRIP_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }

    result = RE_INPUT
        .replace_all(&result, |caps: &Captures| {
            if caps[1].starts_with("sections/") {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned();

    result = remove_command(&result, "title");
    result = repair_citation_groups(&result);
    result = normalize_punctuation(&result);
    collapse_blank_lines(&result).trim().to_string()
}

/// Title of a section file: the first `\section{...}` argument as plain text.
pub fn extract_section_title(content: &str) -> String {
    command_argument(content, "section")
        .or_else(|| command_argument(content, "section*"))
        .map(strip_commands)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Document title from `main.tex`, if present.
pub fn extract_document_title(content: &str) -> Option<String> {
    command_argument(content, "title")
        .map(strip_commands)
        .filter(|title| !title.is_empty())
}

/// Body of the `abstract` environment, stripped like a section body.
pub fn extract_abstract(content: &str) -> Option<String> {
    let start = content.find("\\begin{abstract}")? + "\\begin{abstract}".len();
    let end = start + content[start..].find("\\end{abstract}")?;
    let body = content[start..end].replace("\\noindent", "");
    Some(strip_latex(&body))
}

/// The two halves of a section file split at a `\section{...}` heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitParts {
    pub first: String,
    pub second: String,
    /// False when the heading was absent and `second` is a placeholder.
    pub found: bool,
}

/// Splits `content` at `\section{heading}`.
///
/// The first part is right-trimmed. Without the heading the whole content
/// becomes the first part and the second part is a placeholder section.
pub fn split_at_section(content: &str, heading: &str) -> SplitParts {
    let marker = format!("\\section{{{}}}", heading);
    match content.find(&marker) {
        Some(pos) => SplitParts {
            first: content[..pos].trim_end().to_string(),
            second: content[pos..].to_string(),
            found: true,
        },
        None => SplitParts {
            first: content.to_string(),
            second: format!("{}\n% No content found\n", marker),
            found: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_document_structure() {
        let input = concat!(
            "\\documentclass[a4paper]{article}\n",
            "\\usepackage[utf8]{inputenc}\n",
            "\\usepackage{amsmath}\n",
            "\\title{A \\textbf{Bold} Title}\n",
            "\\begin{document}\n",
            "\\maketitle\n",
            "\\tableofcontents\n",
            "\\section*{Intro}\n",
            "Text \\cite{a,,b}.\n",
            "\\printbibliography[heading=none]\n",
            "\\printnoidxglossary[type=acronym]\n",
            "\\end{document}\n",
        );
        let out = strip_latex(input);
        assert_eq!(out, "\\section{Intro}\nText \\cite{a,b}.");
    }

    #[test]
    fn test_macro_rewrites() {
        let out = strip_latex("\\modelname{GPT-4} on \\ce{H2O}");
        assert_eq!(out, "\\texttt{GPT-4} on H2O");
    }

    #[test]
    fn test_input_filtering() {
        let out = strip_latex("\\input{sections/intro}\n\\input{macros}");
        assert_eq!(out, "\\input{sections/intro}");
    }

    #[test]
    fn test_punctuation_and_blank_lines() {
        let out = strip_latex("a \u{2014} \u{201C}b\u{201D}\n\n\n\n\nc");
        assert_eq!(out, "a - \"b\"\n\nc");
    }

    #[test]
    fn test_section_title() {
        assert_eq!(
            extract_section_title("\\section{The \\textit{Shape} of Data}\\label{sec:x}"),
            "The Shape of Data"
        );
        assert_eq!(extract_section_title("\\section*{Starred}"), "Starred");
        assert_eq!(extract_section_title("no heading here"), UNTITLED);
    }

    #[test]
    fn test_document_title() {
        let main = "\\title{\\textsf{General Purpose Models}}\n\\author{X}";
        assert_eq!(
            extract_document_title(main).as_deref(),
            Some("General Purpose Models")
        );
        assert_eq!(extract_document_title("nothing"), None);
    }

    #[test]
    fn test_abstract() {
        let main = "\\begin{abstract}\n\\noindent Models \u{2013} many.\n\\end{abstract}";
        assert_eq!(extract_abstract(main).as_deref(), Some("Models - many."));
    }

    #[test]
    fn test_split_found() {
        let content = "\\section{Applications}\nA\n\n\\section{Accelerating Applications}\nB\n";
        let parts = split_at_section(content, "Accelerating Applications");
        assert!(parts.found);
        assert_eq!(parts.first, "\\section{Applications}\nA");
        assert_eq!(parts.second, "\\section{Accelerating Applications}\nB\n");
    }

    #[test]
    fn test_split_missing() {
        let parts = split_at_section("only one part", "Accelerating Applications");
        assert!(!parts.found);
        assert_eq!(parts.first, "only one part");
        assert!(parts.second.starts_with("\\section{Accelerating Applications}"));
    }

    #[test]
    fn test_braced_argument_nested() {
        let content = "\\title{a {b} c} rest";
        let (arg, end) = braced_argument(content, 6).unwrap();
        assert_eq!(arg, "a {b} c");
        assert_eq!(&content[end..], " rest");
    }

    #[test]
    fn test_remove_command_unbalanced() {
        assert_eq!(remove_command("x \\title{open", "title"), "x \\title{open");
    }
}
