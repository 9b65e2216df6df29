//! Section conversion through an external LaTeX-to-Markdown converter.
//!
//! The converter is a black box behind [`DocumentConverter`]; the default
//! implementation runs Pandoc on a scoped temporary file. When conversion
//! fails the section still produces a page: the cleaned LaTeX under a
//! manual-review note.

use crate::error::{Error, Result};
use crate::latex::{extract_section_title, resolve_inputs, simplify_longtables, strip_latex};
use crate::normalize::{
    convert_citations, fallback_document, normalize_markdown, strip_frontmatter, NormalizeOptions,
};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Converts a LaTeX fragment to Markdown.
pub trait DocumentConverter {
    /// Tool name used in logs and errors.
    fn name(&self) -> &str;

    /// Converts `latex`, extracting embedded media under `media_dir`.
    fn convert(&self, latex: &str, media_dir: &Path) -> Result<String>;
}

/// Pandoc invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
    from: String,
    to: String,
    extra_args: Vec<String>,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            from: "latex".to_string(),
            to: "markdown+yaml_metadata_block+raw_tex".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl PandocConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pandoc executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Appends an extra command-line argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Command-line arguments for converting `input`.
    pub fn args(&self, input: &Path, media_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            "-s".into(),
            format!("--from={}", self.from).into(),
            format!("--to={}", self.to).into(),
        ];
        let mut extract = OsString::from("--extract-media=");
        extract.push(media_dir.as_os_str());
        args.push(extract);
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}

impl DocumentConverter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn convert(&self, latex: &str, media_dir: &Path) -> Result<String> {
        // Removed on drop, whichever way this function returns
        let mut input = tempfile::Builder::new()
            .prefix("texbook-")
            .suffix(".tex")
            .tempfile()?;
        input.write_all(latex.as_bytes())?;
        input.flush()?;

        let output = Command::new(&self.program)
            .args(self.args(input.path(), media_dir))
            .output()?;

        if !output.status.success() {
            return Err(Error::ExternalTool {
                tool: self.name().to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// How a section page was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    Converted,
    Fallback,
}

/// A section after the pre-conversion passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSection {
    pub title: String,
    pub latex: String,
}

/// Runs the per-section pipeline: input resolution, stripping and citation
/// rewriting, external conversion, frontmatter injection, normalization.
pub struct SectionConverter<'a> {
    converter: &'a dyn DocumentConverter,
    frontmatter: String,
    options: NormalizeOptions,
    media_dir: PathBuf,
}

impl<'a> SectionConverter<'a> {
    pub fn new(
        converter: &'a dyn DocumentConverter,
        frontmatter: impl Into<String>,
        options: NormalizeOptions,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            converter,
            frontmatter: frontmatter.into(),
            options,
            media_dir: media_dir.into(),
        }
    }

    /// Pre-conversion passes. `\input` paths are relative to `base_dir`.
    pub fn prepare(&self, latex: &str, base_dir: &Path) -> PreparedSection {
        let resolved = resolve_inputs(latex, base_dir);
        let title = extract_section_title(&resolved);
        let cleaned = simplify_longtables(&strip_latex(&resolved));
        PreparedSection {
            title,
            latex: convert_citations(&cleaned),
        }
    }

    /// Converts a prepared section into a page.
    pub fn render(&self, section: &PreparedSection) -> Result<(String, SectionOutcome)> {
        match self.converter.convert(&section.latex, &self.media_dir) {
            Ok(markdown) => {
                let body = strip_frontmatter(&markdown);
                let page = format!("{}{}", self.frontmatter, body);
                Ok((
                    normalize_markdown(&page, &self.options),
                    SectionOutcome::Converted,
                ))
            }
            Err(err) => {
                warn!(
                    converter = self.converter.name(),
                    title = %section.title,
                    error = %err,
                    "conversion failed, writing fallback page"
                );
                Ok((
                    fallback_document(&section.title, &section.latex)?,
                    SectionOutcome::Fallback,
                ))
            }
        }
    }

    /// Converts one section file and writes the page to `output`.
    pub fn convert_file(
        &self,
        source: &Path,
        output: &Path,
        base_dir: &Path,
    ) -> Result<SectionOutcome> {
        info!(source = %source.display(), "converting section");
        let latex = fs::read_to_string(source)?;
        let prepared = self.prepare(&latex, base_dir);
        debug!(title = %prepared.title, bytes = prepared.latex.len(), "prepared section");

        let (page, outcome) = self.render(&prepared)?;
        fs::write(output, page)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Converter returning canned Markdown.
    struct Canned(&'static str);

    impl DocumentConverter for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn convert(&self, _latex: &str, _media_dir: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl DocumentConverter for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn convert(&self, _latex: &str, _media_dir: &Path) -> Result<String> {
            Err(Error::ExternalTool {
                tool: "failing".to_string(),
                status: Some(1),
                stderr: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_prepare() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("table.tex"), "TABLE \\citet{k}").unwrap();
        let converter = Canned("");
        let sections = SectionConverter::new(&converter, "", NormalizeOptions::default(), "media");

        let prepared = sections.prepare(
            "\\section*{Data \\& Models}\n\\input{table}\n\\usepackage{x}\nSee \\cite{a,b}.",
            dir.path(),
        );
        assert_eq!(prepared.title, "Data & Models");
        assert!(prepared.latex.contains("TABLE @k"));
        assert!(prepared.latex.contains("See [@a; @b]."));
        assert!(!prepared.latex.contains("usepackage"));
    }

    #[test]
    fn test_prepare_simplifies_input_longtable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("rep.tex"),
            "\\begin{longtable}{ll}\nSMILES & \\smi{CCO} \\cite{weininger} \\\\\n\\end{longtable}\n",
        )
        .unwrap();
        let converter = Canned("");
        let sections = SectionConverter::new(&converter, "", NormalizeOptions::default(), "media");

        let prepared = sections.prepare("\\section{Tables}\n\\input{rep}", dir.path());
        assert!(prepared.latex.contains("\\begin{tabular}{ll}"));
        assert!(prepared.latex.contains("SMILES & \\texttt{CCO} [@weininger] \\\\"));
        assert!(!prepared.latex.contains("longtable"));
    }

    #[test]
    fn test_render_success() {
        let converter = Canned("---\ntitle: x\n---\n\n# Intro\n\n### Deep [\\@a]\n");
        let sections = SectionConverter::new(
            &converter,
            "---\ntoc: true\n---\n\n",
            NormalizeOptions::default(),
            "media",
        );
        let prepared = PreparedSection {
            title: "Intro".to_string(),
            latex: String::new(),
        };
        let (page, outcome) = sections.render(&prepared).unwrap();
        assert_eq!(outcome, SectionOutcome::Converted);
        assert_eq!(page, "---\ntoc: true\n---\n\n# Intro\n\n## Deep [@a]\n");
    }

    #[test]
    fn test_render_fallback() {
        let sections = SectionConverter::new(&Failing, "", NormalizeOptions::default(), "media");
        let prepared = PreparedSection {
            title: "Safety".to_string(),
            latex: "\\section{Safety} body".to_string(),
        };
        let (page, outcome) = sections.render(&prepared).unwrap();
        assert_eq!(outcome, SectionOutcome::Fallback);
        assert!(page.contains("# Safety"));
        assert!(page.contains("needs manual review"));
        assert!(page.contains("\\section{Safety} body"));
    }

    #[test]
    fn test_pandoc_args() {
        let pandoc = PandocConverter::new().with_arg("--wrap=none");
        let args = pandoc.args(Path::new("in.tex"), Path::new("out/media"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "in.tex",
                "-s",
                "--from=latex",
                "--to=markdown+yaml_metadata_block+raw_tex",
                "--extract-media=out/media",
                "--wrap=none",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_error() {
        let pandoc = PandocConverter::new().with_program("/nonexistent/texbook-pandoc");
        let dir = TempDir::new().unwrap();
        assert!(pandoc.convert("x", dir.path()).is_err());
    }
}
