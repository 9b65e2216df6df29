//! `\input{...}` resolution.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Extension appended when the literal path does not exist.
pub const DEFAULT_EXTENSION: &str = "tex";

static RE_INPUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\input\{([^}]+)\}").unwrap());

/// Replaces each `\input{name}` with the referenced file's contents.
///
/// Paths are relative to `base_dir`; `name` is tried as given, then with a
/// `.tex` extension. Unreadable files become `% Could not include name` and
/// missing files `% Input file name not found`. Only one level is resolved:
/// `\input` commands inside included files are left as they are.
pub fn resolve_inputs(content: &str, base_dir: &Path) -> String {
    RE_INPUT
        .replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            let literal = base_dir.join(name);
            let path = if literal.is_file() {
                literal
            } else {
                base_dir.join(format!("{}.{}", name, DEFAULT_EXTENSION))
            };

            if !path.is_file() {
                warn!(input = name, "input file not found");
                return format!("% Input file {} not found", name);
            }

            match std::fs::read_to_string(&path) {
                Ok(included) => {
                    debug!(path = %path.display(), "resolved input");
                    included
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not read input file");
                    format!("% Could not include {}", name)
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_with_default_extension() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tables")).unwrap();
        fs::write(dir.path().join("tables/results.tex"), "TABLE").unwrap();

        let out = resolve_inputs(r"before \input{tables/results} after", dir.path());
        assert_eq!(out, "before TABLE after");
    }

    #[test]
    fn test_literal_path_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("snippet.txt"), "literal").unwrap();
        fs::write(dir.path().join("snippet.txt.tex"), "suffixed").unwrap();

        assert_eq!(resolve_inputs(r"\input{snippet.txt}", dir.path()), "literal");
    }

    #[test]
    fn test_missing_file_comment() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolve_inputs(r"\input{nowhere}", dir.path()),
            "% Input file nowhere not found"
        );
    }

    #[test]
    fn test_single_level() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("outer.tex"), r"outer \input{inner}").unwrap();
        fs::write(dir.path().join("inner.tex"), "inner").unwrap();

        assert_eq!(
            resolve_inputs(r"\input{outer}", dir.path()),
            r"outer \input{inner}"
        );
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("figures")).unwrap();
        assert_eq!(
            resolve_inputs(r"\input{figures}", dir.path()),
            "% Input file figures not found"
        );
    }
}
