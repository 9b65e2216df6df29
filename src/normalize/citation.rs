//! Citation command normalization.
//!
//! LaTeX citation commands become Pandoc citation syntax before conversion,
//! and escaped `\@` markers left by Pandoc are removed afterwards.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// The citation commands recognized in LaTeX sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiteCommand {
    Cite,
    TextCite,
    AutoCite,
    ParenCite,
    CiteT,
    CiteP,
}

impl CiteCommand {
    /// Parses a command name without its leading backslash.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cite" => Some(Self::Cite),
            "textcite" => Some(Self::TextCite),
            "autocite" => Some(Self::AutoCite),
            "parencite" => Some(Self::ParenCite),
            "citet" => Some(Self::CiteT),
            "citep" => Some(Self::CiteP),
            _ => None,
        }
    }

    /// Author-prominent commands render a single key inline as `@key`.
    pub fn is_author_prominent(self) -> bool {
        matches!(self, Self::TextCite | Self::CiteT)
    }
}

/// Alternation of all command names, longest names first.
pub(crate) const CITE_COMMAND_NAMES: &str = "textcite|parencite|autocite|citet|citep|cite";

static RE_CITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\({})\{{([^}}]*)\}}", CITE_COMMAND_NAMES)).unwrap()
});

// Malformed key groups inside LaTeX commands
static RE_CMD_DOUBLE_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\({})\{{([^}}]*?),\s*,\s*([^}}]*)\}}", CITE_COMMAND_NAMES)).unwrap()
});
static RE_CMD_LEADING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\({})\{{\s*,\s*([^}}]*)\}}", CITE_COMMAND_NAMES)).unwrap()
});
static RE_CMD_TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\({})\{{([^}}]*?),\s*\}}", CITE_COMMAND_NAMES)).unwrap()
});

// Malformed bracketed groups
static RE_GROUP_DOUBLE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[@([^\]]*?),\s*,\s*([^\]]*)\]").unwrap());
static RE_GROUP_LEADING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[@,\s*([^\]]*)\]").unwrap());
static RE_GROUP_TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[@([^\]]*?),\s*\]").unwrap());

/// Splits a key group on commas, trimming whitespace and dropping empty keys.
pub fn parse_citation_keys(group: &str) -> Vec<String> {
    group
        .split(',')
        .map(|key| key.trim().trim_matches(|c| c == ' ' || c == ','))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders keys in Pandoc citation syntax.
///
/// A single key of an author-prominent command becomes `@key`; everything
/// else becomes `[@k1; @k2]`. No keys yields an empty string.
pub fn format_citation(command: CiteCommand, keys: &[String]) -> String {
    match keys {
        [] => String::new(),
        [key] if command.is_author_prominent() => format!("@{}", key),
        _ => {
            let refs: Vec<String> = keys.iter().map(|k| format!("@{}", k)).collect();
            format!("[{}]", refs.join("; "))
        }
    }
}

/// Repairs doubled, leading and trailing commas inside citation commands.
pub fn repair_citation_groups(content: &str) -> String {
    let mut result = content.to_string();

    // Doubled commas can repeat within one group
    loop {
        let next = RE_CMD_DOUBLE_COMMA
            .replace_all(&result, r"\${1}{${2},${3}}")
            .into_owned();
        if next == result {
            break;
        }
        result = next;
    }

    result = RE_CMD_LEADING_COMMA
        .replace_all(&result, r"\${1}{${2}}")
        .into_owned();
    RE_CMD_TRAILING_COMMA
        .replace_all(&result, r"\${1}{${2}}")
        .into_owned()
}

/// Rewrites every LaTeX citation command into Pandoc citation syntax.
///
/// Idempotent: the output contains no citation commands and only well-formed
/// bracketed groups.
pub fn convert_citations(content: &str) -> String {
    let repaired = repair_citation_groups(content);

    let converted = RE_CITE.replace_all(&repaired, |caps: &Captures| {
        let keys = parse_citation_keys(&caps[2]);
        match CiteCommand::from_name(&caps[1]) {
            Some(command) => format_citation(command, &keys),
            None => caps[0].to_string(),
        }
    });

    repair_bracketed_groups(&converted).replace("\\@", "@")
}

fn repair_bracketed_groups(content: &str) -> String {
    let mut result = content.to_string();
    loop {
        let next = RE_GROUP_DOUBLE_COMMA
            .replace_all(&result, "[@${1}; @${2}]")
            .into_owned();
        if next == result {
            break;
        }
        result = next;
    }
    result = RE_GROUP_LEADING_COMMA
        .replace_all(&result, "[@${1}]")
        .into_owned();
    RE_GROUP_TRAILING_COMMA
        .replace_all(&result, "[@${1}]")
        .into_owned()
}

/// Removes `\@` escapes that Pandoc's Markdown writer inserts before citation markers.
pub fn clean_citation_markup(content: &str) -> String {
    content.replace("\\@", "@")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthetical_multiple_keys() {
        assert_eq!(
            convert_citations(r"see \autocite{a, b,c}."),
            "see [@a; @b; @c]."
        );
    }

    #[test]
    fn test_author_prominent_single_key() {
        assert_eq!(
            convert_citations(r"\textcite{smith2020} showed"),
            "@smith2020 showed"
        );
        assert_eq!(convert_citations(r"\citet{x}"), "@x");
    }

    #[test]
    fn test_author_prominent_multiple_keys() {
        assert_eq!(convert_citations(r"\citet{x,y}"), "[@x; @y]");
    }

    #[test]
    fn test_all_parenthetical_forms() {
        for cmd in ["cite", "autocite", "parencite", "citep"] {
            let input = format!("\\{}{{k}}", cmd);
            assert_eq!(convert_citations(&input), "[@k]", "command {}", cmd);
        }
    }

    #[test]
    fn test_empty_key_list() {
        assert_eq!(convert_citations(r"text \cite{} more"), "text  more");
        assert_eq!(convert_citations(r"text \cite{ , } more"), "text  more");
    }

    #[test]
    fn test_malformed_commas() {
        assert_eq!(convert_citations(r"\cite{a,,b}"), "[@a; @b]");
        assert_eq!(convert_citations(r"\cite{a, , b, ,c}"), "[@a; @b; @c]");
        assert_eq!(convert_citations(r"\cite{,a}"), "[@a]");
        assert_eq!(convert_citations(r"\cite{a,}"), "[@a]");
    }

    #[test]
    fn test_key_count_matches() {
        let keys: Vec<String> = (0..7).map(|i| format!("key{}", i)).collect();
        let input = format!("\\parencite{{{}}}", keys.join(","));
        let output = convert_citations(&input);
        assert_eq!(output.matches('@').count(), keys.len());
    }

    #[test]
    fn test_idempotent() {
        let input = r"A \cite{a,b} and \textcite{c} and \citep{d,,e} end";
        let once = convert_citations(input);
        assert_eq!(convert_citations(&once), once);
    }

    #[test]
    fn test_bracket_group_repair() {
        assert_eq!(convert_citations("[@a, , b]"), "[@a; @b]");
        assert_eq!(convert_citations("[@a, ]"), "[@a]");
    }

    #[test]
    fn test_clean_markup() {
        assert_eq!(
            clean_citation_markup(r"as shown [\@a; \@b] and \@c"),
            "as shown [@a; @b] and @c"
        );
    }

    #[test]
    fn test_other_commands_untouched() {
        let input = r"\citeauthor{x} \nocite{y}";
        assert_eq!(convert_citations(input), input);
    }
}
