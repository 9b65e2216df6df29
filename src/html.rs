//! Post-processing of rendered book HTML.
//!
//! Injects a script that shuffles the title-block author list on every
//! page load, so no author is permanently listed first.

use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static RE_AUTHOR_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="quarto-title-meta-heading">Author</div>\s*<div class="quarto-title-meta-contents">\s*<p>(.*?)</p>"#,
    )
    .unwrap()
});

/// Marker identifying an injected script.
const SCRIPT_MARKER: &str = "data-texbook=\"author-shuffle\"";

/// Authors listed in a Quarto title block, split on commas.
pub fn extract_authors(html: &str) -> Result<Vec<String>> {
    let caps = RE_AUTHOR_BLOCK
        .captures(html)
        .ok_or_else(|| Error::PatternNotFound("title-block author list".to_string()))?;
    Ok(caps[1]
        .split(',')
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(str::to_string)
        .collect())
}

/// Builds the shuffle script for `authors`.
pub fn shuffle_script(authors: &[String]) -> Result<String> {
    // `</` would close the script element early
    let array = serde_json::to_string(authors)?.replace("</", "<\\/");
    Ok(format!(
        r#"<script {marker}>
document.addEventListener('DOMContentLoaded', function() {{
    const authors = {array};

    // Fisher-Yates
    function shuffleArray(array) {{
        const shuffled = [...array];
        for (let i = shuffled.length - 1; i > 0; i--) {{
            const j = Math.floor(Math.random() * (i + 1));
            [shuffled[i], shuffled[j]] = [shuffled[j], shuffled[i]];
        }}
        return shuffled;
    }}

    const authorContent = document.querySelector('#title-block-header .quarto-title-meta-contents p');
    if (authorContent) {{
        authorContent.textContent = shuffleArray(authors).join(', ') + ' ';
    }}
}});
</script>"#,
        marker = SCRIPT_MARKER,
        array = array
    ))
}

/// Inserts the author shuffle script before `</head>`.
///
/// Pages that already carry the script are returned unchanged.
pub fn inject_author_randomizer(html: &str) -> Result<String> {
    if html.contains(SCRIPT_MARKER) {
        return Ok(html.to_string());
    }

    let authors = extract_authors(html)?;
    let head_end = html
        .find("</head>")
        .ok_or_else(|| Error::PatternNotFound("</head>".to_string()))?;

    let script = shuffle_script(&authors)?;
    let mut result = String::with_capacity(html.len() + script.len() + 1);
    result.push_str(&html[..head_end]);
    result.push_str(&script);
    result.push('\n');
    result.push_str(&html[head_end..]);

    info!(authors = authors.len(), "injected author randomizer");
    Ok(result)
}

/// Processes `input`, writing to `output` (or back to `input`).
pub fn randomize_file(input: &Path, output: Option<&Path>) -> Result<()> {
    if !input.is_file() {
        return Err(Error::MissingInput(input.to_path_buf()));
    }
    let html = fs::read_to_string(input)?;
    let updated = inject_author_randomizer(&html)?;
    fs::write(output.unwrap_or(input), updated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Book</title></head>
<body><header id="title-block-header">
<div class="quarto-title-meta-heading">Author</div>
  <div class="quarto-title-meta-contents">
  <p>Ana "A" Smith, Bo Lee,  Cy </p>
</div></header></body></html>"#;

    #[test]
    fn test_extract_authors() {
        assert_eq!(
            extract_authors(PAGE).unwrap(),
            vec!["Ana \"A\" Smith", "Bo Lee", "Cy"]
        );
    }

    #[test]
    fn test_inject() {
        let html = inject_author_randomizer(PAGE).unwrap();
        let script_at = html.find("<script").unwrap();
        assert!(script_at < html.find("</head>").unwrap());
        assert!(html.contains(r#"const authors = ["Ana \"A\" Smith","Bo Lee","Cy"];"#));
        assert_eq!(html.matches("</head>").count(), 1);
    }

    #[test]
    fn test_inject_is_idempotent() {
        let once = inject_author_randomizer(PAGE).unwrap();
        assert_eq!(inject_author_randomizer(&once).unwrap(), once);
    }

    #[test]
    fn test_script_escapes_closing_tags() {
        let script = shuffle_script(&["</script>".to_string()]).unwrap();
        assert!(script.contains(r#"["<\/script>"]"#));
    }

    #[test]
    fn test_missing_patterns() {
        let no_head = PAGE.replace("</head>", "");
        assert!(matches!(
            inject_author_randomizer(&no_head),
            Err(Error::PatternNotFound(_))
        ));
        assert!(matches!(
            inject_author_randomizer("<html><head></head></html>"),
            Err(Error::PatternNotFound(_))
        ));
    }

    #[test]
    fn test_randomize_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("index.html");
        let output = dir.path().join("out.html");
        fs::write(&input, PAGE).unwrap();

        randomize_file(&input, Some(&output)).unwrap();
        assert_eq!(fs::read_to_string(&input).unwrap(), PAGE);
        assert!(fs::read_to_string(&output).unwrap().contains("shuffleArray"));
    }
}
