//! # Markdown Normalization Pipeline
//!
//! Post-conversion passes applied to every book page.
//!
//! ## Pipeline Stages
//!
//! 1. **Citation cleanup** - remove `\@` escapes left by the Markdown writer
//! 2. **Heading correction** - clamp skipped heading levels
//! 3. **Acronyms** - glossary spans to acronym references
//! 4. **Boxes** - mapped equation/prompt boxes to images
//! 5. **Images** - PDF to PNG, media prefix, full-width `<img>`
//!
//! Every stage is a pure, idempotent `&str -> String` function.

mod acronym;
mod boxes;
mod citation;
mod frontmatter;
mod heading;
mod image;

pub use acronym::{convert_acronyms, rewrite_acronym, AcronymSyntax};
pub use boxes::{replace_boxes_with_images, BoxImageOptions, BoxKind};
pub use citation::{
    clean_citation_markup, convert_citations, format_citation, parse_citation_keys,
    repair_citation_groups, CiteCommand,
};
pub(crate) use citation::CITE_COMMAND_NAMES;
pub use frontmatter::{
    fallback_document, section_frontmatter, split_frontmatter, strip_frontmatter,
    title_frontmatter, SiteLink,
};
pub use heading::{fix_heading_levels, HeadingCorrector, MAX_HEADING_DEPTH};
pub use image::{normalize_img_tag, rewrite_image_references, ImageOptions};

use serde::{Deserialize, Serialize};

/// Normalization configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Stage 1: remove escaped citation markers
    pub clean_citations: bool,
    /// Stage 2: clamp heading levels
    pub fix_headings: bool,
    /// Stage 3: rewrite acronym spans
    pub convert_acronyms: bool,
    /// Output syntax for acronym references
    pub acronym_syntax: AcronymSyntax,
    /// Stage 4: replace mapped boxes with images
    pub replace_boxes: bool,
    /// Stage 5: rewrite image references
    pub rewrite_images: bool,
    pub images: ImageOptions,
    pub boxes: BoxImageOptions,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            clean_citations: true,
            fix_headings: true,
            convert_acronyms: true,
            acronym_syntax: AcronymSyntax::Shortcode,
            replace_boxes: true,
            rewrite_images: true,
            images: ImageOptions::default(),
            boxes: BoxImageOptions::default(),
        }
    }
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pages not produced by the converter (index, references)
    pub fn minimal() -> Self {
        Self {
            convert_acronyms: false,
            replace_boxes: false,
            rewrite_images: false,
            ..Self::default()
        }
    }

    /// Sets the media directory for image and box rewriting.
    pub fn with_media_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        self.images.media_dir = dir.clone();
        self.boxes.media_dir = dir;
        self
    }

    /// Sets the acronym output syntax.
    pub fn with_acronym_syntax(mut self, syntax: AcronymSyntax) -> Self {
        self.acronym_syntax = syntax;
        self
    }

    /// Sets whether every image is forced to full width.
    pub fn with_full_width(mut self, force: bool) -> Self {
        self.images.force_full_width = force;
        self
    }
}

/// Run the normalization pipeline on converted Markdown
///
/// # Example
///
/// ```
/// use texbook::normalize::{normalize_markdown, NormalizeOptions};
///
/// let markdown = "# Title\n\n#### Deep\n\n![plot](figures/plot.pdf)\n";
/// let clean = normalize_markdown(markdown, &NormalizeOptions::default());
/// assert!(clean.contains("## Deep"));
/// assert!(clean.contains("media/figures/plot.png"));
/// ```
pub fn normalize_markdown(input: &str, options: &NormalizeOptions) -> String {
    let mut result = input.to_string();

    if options.clean_citations {
        result = clean_citation_markup(&result);
    }

    if options.fix_headings {
        result = fix_heading_levels(&result);
    }

    if options.convert_acronyms {
        result = convert_acronyms(&result, options.acronym_syntax);
    }

    if options.replace_boxes {
        result = replace_boxes_with_images(&result, &options.boxes);
    }

    if options.rewrite_images {
        result = rewrite_image_references(&result, &options.images);
    }

    result
}
