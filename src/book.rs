//! # Book Builder
//!
//! Turns a manuscript source tree into a Quarto book directory.
//!
//! ## Build Steps
//!
//! 1. **Bibliography** - copy `references.bib` with typographic cleanup
//! 2. **Split** - optionally split one section file into two chapters
//! 3. **Sections** - convert every configured chapter
//! 4. **Index** - title, abstract, citation block, table of contents
//! 5. **References** - bibliography page
//! 6. **Media** - copy `media/` and `figures/`, rasterize PDF figures
//! 7. **Equation images** - copy pre-rendered box images
//! 8. **Final passes** - normalize every generated page
//! 9. **Site files** - `_extensions`, `_quarto.yml`, `acronyms.yml`, `styles.css`
//!
//! Only a missing input directory aborts the build. Every other failure is
//! logged and recorded in the [`BuildReport`].

use crate::cleanup::clean_bibliography;
use crate::config::BookConfig;
use crate::convert::{DocumentConverter, PandocConverter, SectionConverter, SectionOutcome};
use crate::error::{Error, Result};
use crate::latex::{extract_abstract, extract_document_title, parse_acronyms, split_at_section};
use crate::media::{copy_equation_images, copy_tree, find_equation_images_dir};
use crate::normalize::{
    clean_citation_markup, fix_heading_levels, normalize_markdown, section_frontmatter,
    NormalizeOptions,
};
use crate::rasterize::Rasterizer;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Main document file.
pub const MAIN_TEX: &str = "main.tex";
/// Acronym definitions file.
pub const ACRONYMS_TEX: &str = "acronyms.tex";
/// Bibliography source file.
pub const REFERENCES_BIB: &str = "references.bib";
/// Directory holding section files.
pub const SECTIONS_DIR: &str = "sections";

/// What a build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub sections_converted: usize,
    pub sections_fallback: usize,
    /// Configured section sources that were not found.
    pub sections_missing: Vec<String>,
    pub pdfs_converted: usize,
    pub equation_images: usize,
    pub acronyms: usize,
    /// Pages written, in book order.
    pub pages: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    fn warn(&mut self, step: &str, message: impl std::fmt::Display) {
        warn!(step, "{}", message);
        self.warnings.push(format!("{}: {}", step, message));
    }

    /// Records a failed step and continues.
    fn check(&mut self, step: &str, result: Result<()>) {
        if let Err(err) = result {
            self.warn(step, err);
        }
    }
}

/// Builds a Quarto book from a LaTeX manuscript.
pub struct BookBuilder {
    config: BookConfig,
    converter: Box<dyn DocumentConverter>,
    rasterizer: Rasterizer,
}

impl BookBuilder {
    /// Creates a builder using Pandoc and the default rasterizer.
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            converter: Box::new(PandocConverter::new()),
            rasterizer: Rasterizer::new(),
        }
    }

    /// Replaces the LaTeX-to-Markdown converter.
    pub fn with_converter(mut self, converter: Box<dyn DocumentConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Builds the book from `input_dir` into `output_dir`.
    ///
    /// `media_dir` is the media directory name inside `output_dir`.
    pub fn build(&self, input_dir: &Path, output_dir: &Path, media_dir: &str) -> Result<BuildReport> {
        if !input_dir.is_dir() {
            return Err(Error::MissingInput(input_dir.to_path_buf()));
        }
        fs::create_dir_all(output_dir)?;
        info!(input = %input_dir.display(), output = %output_dir.display(), "building book");

        let mut report = BuildReport::default();
        let options = self.config.normalize.clone().with_media_dir(media_dir);
        let media_output = output_dir.join(media_dir);
        let frontmatter = section_frontmatter(&self.config.site_links, &self.config.acronyms_file)?;

        report.check("bibliography", self.copy_bibliography(input_dir, output_dir));

        // Part files live until every section has been converted
        let split_dir = match self.split_sections(input_dir) {
            Ok(dir) => dir,
            Err(err) => {
                report.warn("split", err);
                None
            }
        };

        let sections =
            SectionConverter::new(self.converter.as_ref(), frontmatter.as_str(), options.clone(), &media_output);
        self.convert_sections(&sections, input_dir, output_dir, split_dir.as_ref(), &mut report);
        drop(split_dir);

        let index = self.write_index(input_dir, output_dir, &frontmatter);
        report.check("index", index);
        let references = self.write_references(output_dir, &frontmatter);
        report.check("references", references);

        report.check("media", self.copy_media(input_dir, &media_output));
        match self.rasterizer.convert_dir(&media_output) {
            Ok(raster) => {
                report.pdfs_converted = raster.converted;
                for pdf in raster.failed {
                    report.warn("rasterize", format!("could not convert {}", pdf));
                }
            }
            Err(err) => report.warn("rasterize", err),
        }

        match self.copy_equation_images(input_dir, &media_output, &options) {
            Ok(copied) => report.equation_images = copied,
            Err(err) => report.warn("equation images", err),
        }

        report.check("final passes", self.final_passes(output_dir, &options));
        report.check("extensions", self.copy_extensions(output_dir));
        report.check("quarto config", self.write_quarto_config(output_dir));
        match self.write_acronyms(input_dir, output_dir) {
            Ok(count) => report.acronyms = count,
            Err(err) => report.warn("acronyms", err),
        }
        report.check(
            "stylesheet",
            fs::write(output_dir.join("styles.css"), &self.config.stylesheet).map_err(Error::from),
        );

        report.pages = self
            .config
            .chapters()
            .into_iter()
            .filter(|page| output_dir.join(page).is_file())
            .map(str::to_string)
            .collect();

        info!(
            converted = report.sections_converted,
            fallback = report.sections_fallback,
            missing = report.sections_missing.len(),
            warnings = report.warnings.len(),
            "book build complete"
        );
        Ok(report)
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn copy_bibliography(&self, input_dir: &Path, output_dir: &Path) -> Result<()> {
        let source = input_dir.join(REFERENCES_BIB);
        if !source.is_file() {
            return Err(Error::MissingInput(source));
        }
        let cleaned = clean_bibliography(&fs::read_to_string(&source)?);
        fs::write(output_dir.join(&self.config.bibliography_file), cleaned)?;
        info!("copied and cleaned bibliography");
        Ok(())
    }

    /// Writes the split rule's part files into a temporary directory.
    fn split_sections(&self, input_dir: &Path) -> Result<Option<TempDir>> {
        let Some(rule) = &self.config.split else {
            return Ok(None);
        };
        let source = input_dir.join(SECTIONS_DIR).join(&rule.source);
        if !source.is_file() {
            return Err(Error::MissingInput(source));
        }

        let parts = split_at_section(&fs::read_to_string(&source)?, &rule.heading);
        if !parts.found {
            warn!(heading = %rule.heading, "split heading not found, second part is a placeholder");
        }

        let dir = tempfile::Builder::new().prefix("texbook-split-").tempdir()?;
        fs::write(dir.path().join(&rule.first), parts.first)?;
        fs::write(dir.path().join(&rule.second), parts.second)?;
        info!(source = %rule.source, "split section file");
        Ok(Some(dir))
    }

    fn convert_sections(
        &self,
        sections: &SectionConverter<'_>,
        input_dir: &Path,
        output_dir: &Path,
        split_dir: Option<&TempDir>,
        report: &mut BuildReport,
    ) {
        let sections_dir = input_dir.join(SECTIONS_DIR);

        for chapter in &self.config.sections {
            let source = split_dir
                .map(|dir| dir.path().join(&chapter.source))
                .filter(|path| path.is_file())
                .unwrap_or_else(|| sections_dir.join(&chapter.source));

            if !source.is_file() {
                report.warn("sections", format!("section file {} not found", source.display()));
                report.sections_missing.push(chapter.source.clone());
                continue;
            }

            match sections.convert_file(&source, &output_dir.join(&chapter.output), input_dir) {
                Ok(SectionOutcome::Converted) => report.sections_converted += 1,
                Ok(SectionOutcome::Fallback) => {
                    report.sections_fallback += 1;
                    report.warnings.push(format!(
                        "sections: {} needs manual review",
                        chapter.output
                    ));
                }
                Err(err) => report.warn("sections", format!("{}: {}", chapter.source, err)),
            }
        }
    }

    fn write_index(&self, input_dir: &Path, output_dir: &Path, frontmatter: &str) -> Result<()> {
        let main = input_dir.join(MAIN_TEX);
        if !main.is_file() {
            return Err(Error::MissingInput(main));
        }

        let appendix = match &self.config.index_appendix {
            Some(path) => {
                let path = if path.is_relative() {
                    input_dir.join(path)
                } else {
                    path.clone()
                };
                Some(fs::read_to_string(&path)?)
            }
            None => None,
        };

        let page = render_index(
            &self.config,
            &fs::read_to_string(&main)?,
            appendix.as_deref(),
            frontmatter,
        );
        fs::write(output_dir.join(&self.config.index_page), page)?;
        info!(page = %self.config.index_page, "created index page");
        Ok(())
    }

    fn write_references(&self, output_dir: &Path, frontmatter: &str) -> Result<()> {
        let page = format!(
            "{}# {} {{.unnumbered}}\n\n::: {{#refs}}\n:::\n",
            frontmatter, self.config.references_title
        );
        fs::write(output_dir.join(&self.config.references_page), page)?;
        Ok(())
    }

    fn copy_media(&self, input_dir: &Path, media_output: &Path) -> Result<()> {
        let media = input_dir.join("media");
        if media.is_dir() {
            let copied = copy_tree(&media, media_output)?;
            info!(copied, "copied media directory");
        }

        let figures = input_dir.join("figures");
        if figures.is_dir() {
            let copied = copy_tree(&figures, &media_output.join("figures"))?;
            info!(copied, "copied figures directory");
        }
        Ok(())
    }

    fn copy_equation_images(
        &self,
        input_dir: &Path,
        media_output: &Path,
        options: &NormalizeOptions,
    ) -> Result<usize> {
        let explicit = self.config.equation_images_dir.as_deref();
        let Some(source) = find_equation_images_dir(input_dir, explicit) else {
            return Err(Error::PatternNotFound(
                "equation image directory (docs/eq_images)".to_string(),
            ));
        };

        info!(dir = %source.display(), "found equation images");
        let dest = media_output.join(&options.boxes.images_subdir);
        let report = copy_equation_images(&source, &dest, &options.boxes.expected_images())?;
        Ok(report.copied)
    }

    /// Re-runs normalization over every page in the book directory.
    fn final_passes(&self, output_dir: &Path, options: &NormalizeOptions) -> Result<()> {
        let options = NormalizeOptions {
            convert_acronyms: false,
            ..options.clone()
        };

        let mut pages: Vec<PathBuf> = fs::read_dir(output_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "qmd"))
            .collect();
        pages.sort();

        for page in pages {
            let content = fs::read_to_string(&page)?;
            let normalized = normalize_markdown(&content, &options);
            if normalized != content {
                fs::write(&page, normalized)?;
                debug!(page = %page.display(), "normalized page");
            }
        }
        Ok(())
    }

    fn copy_extensions(&self, output_dir: &Path) -> Result<()> {
        let Some(source) = &self.config.extensions_dir else {
            debug!("no extensions directory configured");
            return Ok(());
        };
        if !source.is_dir() {
            return Err(Error::MissingInput(source.clone()));
        }
        copy_tree(source, &output_dir.join("_extensions"))?;
        info!("copied Quarto extensions");
        Ok(())
    }

    fn write_quarto_config(&self, output_dir: &Path) -> Result<()> {
        fs::write(output_dir.join("_quarto.yml"), self.config.quarto_yaml()?)?;
        info!("created _quarto.yml");
        Ok(())
    }

    fn write_acronyms(&self, input_dir: &Path, output_dir: &Path) -> Result<usize> {
        let source = input_dir.join(ACRONYMS_TEX);
        if !source.is_file() {
            return Err(Error::MissingInput(source));
        }
        let table = parse_acronyms(&fs::read_to_string(&source)?, &self.config.acronym_overrides);
        let target = output_dir.join(self.config.acronyms_file.trim_start_matches("./"));
        fs::write(target, table.to_yaml()?)?;
        info!(acronyms = table.len(), "converted acronyms");
        Ok(table.len())
    }
}

/// Renders the index page from `main.tex`.
pub fn render_index(
    config: &BookConfig,
    main_tex: &str,
    appendix: Option<&str>,
    frontmatter: &str,
) -> String {
    let title = extract_document_title(main_tex).unwrap_or_else(|| config.title.clone());
    let abstract_text = extract_abstract(main_tex).unwrap_or_default();

    let mut page = String::from(frontmatter);
    let _ = write!(
        page,
        "# {} {{.unnumbered}}\n\n## Abstract\n\n{}\n\n",
        title, abstract_text
    );

    if let Some(appendix) = appendix.map(str::trim).filter(|a| !a.is_empty()) {
        let _ = write!(page, "{}\n\n", appendix);
    }

    if let Some(bibtex) = &config.citation_bibtex {
        let _ = write!(page, "## Citation\n\n```bibtex\n{}\n```\n\n", bibtex.trim());
    }

    page.push_str("---\n\n## Table of Contents\n\nThis book covers the following topics:\n\n");
    for (i, section) in config.sections.iter().enumerate() {
        let _ = writeln!(page, "{}. [{}]({})", i + 1, section.title, section.output);
    }
    let _ = writeln!(
        page,
        "-  [{}]({})",
        config.references_title, config.references_page
    );

    fix_heading_levels(&clean_citation_markup(&page))
}

/// Chooses the input directory, extracting `zip_file` into `extract_to` first.
///
/// When extraction succeeds the detected source root of the extracted tree
/// is used; otherwise `input_dir` is returned.
pub fn prepare_input(zip_file: Option<&Path>, extract_to: &Path, input_dir: &Path) -> PathBuf {
    let Some(zip_file) = zip_file else {
        return input_dir.to_path_buf();
    };
    if !zip_file.is_file() {
        warn!(zip = %zip_file.display(), "zip file not found, using input directory");
        return input_dir.to_path_buf();
    }

    match extract_sources(zip_file, extract_to) {
        Ok(root) => {
            info!(root = %root.display(), "using extracted sources");
            root
        }
        Err(err) => {
            warn!(error = %err, "extraction failed, using input directory");
            input_dir.to_path_buf()
        }
    }
}

#[cfg(feature = "archive")]
fn extract_sources(zip_file: &Path, extract_to: &Path) -> Result<PathBuf> {
    crate::archive::extract_archive(zip_file, extract_to)?;
    Ok(crate::detect::locate_source_root(extract_to))
}

#[cfg(not(feature = "archive"))]
fn extract_sources(_zip_file: &Path, _extract_to: &Path) -> Result<PathBuf> {
    Err(Error::InvalidConfig(
        "built without the `archive` feature".to_string(),
    ))
}
