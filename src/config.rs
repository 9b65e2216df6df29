//! Book build configuration.
//!
//! Every manuscript-specific constant (section map, split rule, site links,
//! book metadata) lives in [`BookConfig`]. The defaults describe the
//! "General Purpose Models for the Chemical Sciences" manuscript; a YAML
//! file can override any field.

use crate::error::{Error, Result};
use crate::latex::{default_overrides, AcronymOverride};
use crate::normalize::{NormalizeOptions, SiteLink};
use crate::readme::ReadmeOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Stylesheet written next to `_quarto.yml`.
pub const DEFAULT_STYLESHEET: &str = r#"
/* Custom styles for the chemistry book */
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
}

.quarto-title-block {
    margin-bottom: 2rem;
}

/* Chemistry-specific styling */
.chem-formula {
    font-family: 'Times New Roman', serif;
}

/* Table styling */
table {
    margin: 1rem 0;
}

/* Figure captions */
.figure-caption {
    font-style: italic;
    margin-top: 0.5rem;
}

/* Code blocks */
pre {
    background-color: #f8f9fa;
    padding: 1rem;
    border-radius: 0.375rem;
}
"#;

const DEFAULT_TITLE: &str = "General Purpose Models for the Chemical Sciences";

const DEFAULT_AUTHORS: &[&str] = &[
    "Nawaf Alampara",
    "Anagha Aneesh",
    "Martiño Ríos-García",
    "Adrian Mirza",
    "Mara Schilling-Wilhelmi",
    "Ali Asghar Aghajani",
    "Meiling Sun",
    "Gordan Prastalo",
    "Kevin Maik Jablonka",
];

const DEFAULT_FOOTER_LEFT: &str = concat!(
    r#"<img src="https://raw.githubusercontent.com/lamalab-org/lamalab.github.io/main/static/png-file.png" "#,
    r#"alt="Lab for AI in Materials Science logo" "#,
    r#"style="height:3rem;vertical-align:middle;margin-right:0.4rem;">"#,
);

const DEFAULT_CITATION: &str = "@article{alampara2025general,
  title   = {General purpose models for the chemical sciences},
  author  = {Nawaf Alampara and Anagha Aneesh and Martiño Ríos-García and Adrian Mirza and Mara Schilling-Wilhelmi and Ali Asghar Aghajani and Meiling Sun and Gordan Prastalo and Kevin Maik Jablonka},
  year    = {2025},
  journal = {arXiv preprint arXiv: 2507.07456}
}";

/// One chapter: a LaTeX file under `sections/` and the page it becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Source file name, looked up in `sections/` or among split parts.
    pub source: String,
    /// Output page name, e.g. `01-introduction.qmd`.
    pub output: String,
    /// Display title in the index table of contents.
    pub title: String,
}

impl SectionSpec {
    pub fn new(
        source: impl Into<String>,
        output: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            title: title.into(),
        }
    }
}

/// Splits one section file into two part files at a `\section{...}` heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRule {
    /// File under `sections/` to split.
    pub source: String,
    /// Heading text of the `\section{...}` that starts the second part.
    pub heading: String,
    /// File name of the first part.
    pub first: String,
    /// File name of the second part.
    pub second: String,
}

/// Book build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub title: String,
    pub authors: Vec<String>,
    /// Quarto render output directory, relative to the book directory.
    pub project_output_dir: String,
    pub footer_left: String,
    pub footer_right: String,
    /// Chapters in book order.
    pub sections: Vec<SectionSpec>,
    pub split: Option<SplitRule>,
    pub index_page: String,
    pub references_page: String,
    pub references_title: String,
    pub bibliography_file: String,
    /// Links shown in every page's sidebar.
    pub site_links: Vec<SiteLink>,
    /// Path to the acronym YAML as referenced from page frontmatter.
    pub acronyms_file: String,
    pub acronym_overrides: BTreeMap<String, AcronymOverride>,
    /// Explicit equation image directory, searched before the defaults.
    pub equation_images_dir: Option<PathBuf>,
    /// Markdown file appended to the index after the abstract.
    pub index_appendix: Option<PathBuf>,
    /// BibTeX entry shown in the index citation block.
    pub citation_bibtex: Option<String>,
    /// Quarto `_extensions` directory copied into the book.
    pub extensions_dir: Option<PathBuf>,
    pub stylesheet: String,
    pub normalize: NormalizeOptions,
    pub readme: ReadmeOptions,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            authors: DEFAULT_AUTHORS.iter().map(|a| a.to_string()).collect(),
            project_output_dir: "../docs".to_string(),
            footer_left: DEFAULT_FOOTER_LEFT.to_string(),
            footer_right: "Copyright © 2025 Lab for AI in Materials Science".to_string(),
            sections: vec![
                SectionSpec::new("introduction.tex", "01-introduction.qmd", "Introduction"),
                SectionSpec::new(
                    "data_taxonomy.tex",
                    "02-data_taxonomy.qmd",
                    "The Shape and Structure of Chemical Data",
                ),
                SectionSpec::new(
                    "architectures.tex",
                    "03-architectures.qmd",
                    "Building Principles of GPMs",
                ),
                SectionSpec::new("evals.tex", "04-evals.qmd", "Evaluations"),
                SectionSpec::new("applications_part1.tex", "05-applications.qmd", "Applications"),
                SectionSpec::new(
                    "applications_part2.tex",
                    "06-accelerating_applications.qmd",
                    "Accelerating Applications",
                ),
                SectionSpec::new(
                    "safety.tex",
                    "07-safety.qmd",
                    "Implications of GPMs: Education, Safety, and Ethics",
                ),
                SectionSpec::new(
                    "outlook_conclusions.tex",
                    "08-outlook_conclusions.qmd",
                    "Outlook and Conclusions",
                ),
            ],
            split: Some(SplitRule {
                source: "applications.tex".to_string(),
                heading: "Accelerating Applications".to_string(),
                first: "applications_part1.tex".to_string(),
                second: "applications_part2.tex".to_string(),
            }),
            index_page: "index.qmd".to_string(),
            references_page: "09-references.qmd".to_string(),
            references_title: "References".to_string(),
            bibliography_file: "references.bib".to_string(),
            site_links: vec![
                SiteLink::new("Visit our website", "https://lamalab.org/", "globe"),
                SiteLink::new(
                    "Follow us on X (Twitter)",
                    "https://x.com/jablonkagroup",
                    "twitter-x",
                ),
                SiteLink::new(
                    "We are hiring!",
                    "https://forms.fillout.com/t/eoGA7AhnAKus",
                    "person-badge",
                ),
                SiteLink::new("Contact us", "mailto:contact@lamalab.org", "mailbox"),
            ],
            acronyms_file: "./acronyms.yml".to_string(),
            acronym_overrides: default_overrides(),
            equation_images_dir: None,
            index_appendix: None,
            citation_bibtex: Some(DEFAULT_CITATION.to_string()),
            extensions_dir: None,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            normalize: NormalizeOptions::default(),
            readme: ReadmeOptions::default(),
        }
    }
}

impl BookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from YAML; absent fields keep their defaults.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::InvalidConfig("no sections configured".to_string()));
        }
        let mut outputs: Vec<&str> = self.sections.iter().map(|s| s.output.as_str()).collect();
        outputs.push(&self.index_page);
        outputs.push(&self.references_page);
        if let Some(page) = outputs.iter().find(|page| !page.ends_with(".qmd")) {
            return Err(Error::InvalidConfig(format!(
                "page '{}' must have a .qmd extension",
                page
            )));
        }
        let mut unique = outputs.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != outputs.len() {
            return Err(Error::InvalidConfig("duplicate output page".to_string()));
        }
        Ok(())
    }

    /// Sets the media directory used by the normalization passes.
    pub fn with_media_dir(mut self, dir: impl Into<String>) -> Self {
        self.normalize = self.normalize.with_media_dir(dir);
        self
    }

    /// Converts the split source as a single chapter.
    ///
    /// The chapter reading the first part reads the whole source instead;
    /// the chapter reading the second part is dropped.
    pub fn without_split(mut self) -> Self {
        if let Some(rule) = self.split.take() {
            self.sections.retain(|s| s.source != rule.second);
            for section in &mut self.sections {
                if section.source == rule.first {
                    section.source = rule.source.clone();
                }
            }
        }
        self
    }

    pub fn with_extensions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extensions_dir = Some(dir.into());
        self
    }

    pub fn with_equation_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.equation_images_dir = Some(dir.into());
        self
    }

    /// Book chapter list: index, sections, references.
    pub fn chapters(&self) -> Vec<&str> {
        std::iter::once(self.index_page.as_str())
            .chain(self.sections.iter().map(|s| s.output.as_str()))
            .chain(std::iter::once(self.references_page.as_str()))
            .collect()
    }

    /// Renders `_quarto.yml`.
    pub fn quarto_yaml(&self) -> Result<String> {
        let project = QuartoProject {
            project: ProjectSection {
                kind: "book",
                output_dir: &self.project_output_dir,
                title: &self.title,
            },
            book: BookSection {
                title: &self.title,
                author: self.authors.join(", "),
                date: "today",
                page_footer: PageFooter {
                    left: &self.footer_left,
                    right: &self.footer_right,
                },
                chapters: self.chapters(),
            },
            bibliography: &self.bibliography_file,
            format: FormatSection {
                html: HtmlFormat {
                    theme: "cosmo",
                    css: "styles.css",
                    toc: true,
                    toc_depth: 5,
                    number_sections: true,
                    highlight_style: "github",
                    code_link: true,
                    toc_title: "On this page",
                    code_overflow: "wrap",
                },
            },
            execute: ExecuteSection { freeze: "auto" },
            filters: vec!["acronyms"],
        };
        Ok(serde_yaml::to_string(&project)?)
    }
}

// ============================================================================
// _quarto.yml layout
// ============================================================================

#[derive(Serialize)]
struct QuartoProject<'a> {
    project: ProjectSection<'a>,
    book: BookSection<'a>,
    bibliography: &'a str,
    format: FormatSection,
    execute: ExecuteSection,
    filters: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct ProjectSection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    output_dir: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct BookSection<'a> {
    title: &'a str,
    author: String,
    date: &'static str,
    page_footer: PageFooter<'a>,
    chapters: Vec<&'a str>,
}

#[derive(Serialize)]
struct PageFooter<'a> {
    left: &'a str,
    right: &'a str,
}

#[derive(Serialize)]
struct FormatSection {
    html: HtmlFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct HtmlFormat {
    theme: &'static str,
    css: &'static str,
    toc: bool,
    toc_depth: u8,
    number_sections: bool,
    highlight_style: &'static str,
    code_link: bool,
    toc_title: &'static str,
    code_overflow: &'static str,
}

#[derive(Serialize)]
struct ExecuteSection {
    freeze: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chapters() {
        let config = BookConfig::default();
        let chapters = config.chapters();
        assert_eq!(chapters.first(), Some(&"index.qmd"));
        assert_eq!(chapters.last(), Some(&"09-references.qmd"));
        assert_eq!(chapters.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_without_split() {
        let config = BookConfig::default().without_split();
        assert!(config.split.is_none());
        assert_eq!(config.sections.len(), 7);
        let apps = config
            .sections
            .iter()
            .find(|s| s.output == "05-applications.qmd")
            .unwrap();
        assert_eq!(apps.source, "applications.tex");
        assert!(!config.chapters().contains(&"06-accelerating_applications.qmd"));
    }

    #[test]
    fn test_quarto_yaml() {
        let yaml = BookConfig::default().quarto_yaml().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["project"]["type"].as_str(), Some("book"));
        assert_eq!(value["project"]["output-dir"].as_str(), Some("../docs"));
        assert_eq!(value["book"]["date"].as_str(), Some("today"));
        assert!(value["book"]["author"]
            .as_str()
            .unwrap()
            .starts_with("Nawaf Alampara, Anagha Aneesh"));
        assert_eq!(value["book"]["chapters"].as_sequence().unwrap().len(), 10);
        assert_eq!(value["bibliography"].as_str(), Some("references.bib"));
        assert_eq!(value["format"]["html"]["toc-depth"].as_u64(), Some(5));
        assert_eq!(value["format"]["html"]["toc-title"].as_str(), Some("On this page"));
        assert_eq!(value["execute"]["freeze"].as_str(), Some("auto"));
        assert_eq!(value["filters"][0].as_str(), Some("acronyms"));
        // Key order follows the struct layout
        assert!(yaml.find("project:").unwrap() < yaml.find("book:").unwrap());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = BookConfig::from_yaml_str("title: My Book\nsplit: null\n").unwrap();
        assert_eq!(config.title, "My Book");
        assert!(config.split.is_none());
        assert_eq!(config.sections.len(), 8);
        assert_eq!(config.references_page, "09-references.qmd");
    }

    #[test]
    fn test_invalid_config() {
        let err = BookConfig::from_yaml_str("sections: []\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let dup = "sections:\n  - {source: a.tex, output: index.qmd, title: A}\n";
        assert!(BookConfig::from_yaml_str(dup).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = BookConfig::from_yaml_file("/nonexistent/book.yml").unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }
}
