//! Image reference rewriting.
//!
//! Browsers cannot display PDF figures, so references are redirected to the
//! rasterized PNG siblings, figure paths are moved under the media directory,
//! and every image is rendered as an `<img>` element at full width.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Image rewriting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Media directory name inside the book, prefixed to figure paths.
    pub media_dir: String,
    /// Figure directory name as referenced from the LaTeX sources.
    pub figures_dir: String,
    /// Convert every Markdown image to `<img>` and force `width="100%"`.
    pub force_full_width: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            media_dir: "media".to_string(),
            figures_dir: "figures".to_string(),
            force_full_width: true,
        }
    }
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the media directory name.
    pub fn with_media_dir(mut self, dir: impl Into<String>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Sets the figures directory name.
    pub fn with_figures_dir(mut self, dir: impl Into<String>) -> Self {
        self.figures_dir = dir.into();
        self
    }

    /// Sets whether all images are forced to full width.
    pub fn with_full_width(mut self, force: bool) -> Self {
        self.force_full_width = force;
        self
    }
}

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];

static RE_MD_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(?:\s+"([^"]*)")?\)"#).unwrap()
});

static RE_IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img\b[^>]*>").unwrap());

static RE_IMG_PDF_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<img\b[^>]*\ssrc=")([^"]+)\.pdf""#).unwrap());

static RE_ORIGINAL_SRC_PDF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-original-image-src="([^"]+)\.pdf""#).unwrap());

static RE_REFERENCE_PDF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\[[^\]]*\]:\s*)(\S+)\.pdf\b").unwrap());

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span class="image placeholder"[^>]*>([^<]*)</span>"#).unwrap()
});

static RE_ATTR_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\salt="([^"]*)""#).unwrap());

static RE_ATTR_ORIGINAL_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-original-image-src="([^"]*)""#).unwrap());

static RE_ATTR_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-original-image-title="([^"]*)""#).unwrap());

static RE_ATTR_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+width\s*=\s*(?:"[^"]*"|'[^']*'|[^\s/>]+)"#).unwrap()
});

fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn is_raster(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| RASTER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn img_tag(src: &str, alt: &str, title: Option<&str>) -> String {
    let mut tag = format!(
        r#"<img src="{}" alt="{}" width="100%""#,
        escape_attr(src),
        escape_attr(alt)
    );
    if let Some(title) = title {
        tag.push_str(&format!(r#" title="{}""#, escape_attr(title)));
    }
    tag.push_str(" />");
    tag
}

/// Rewrites Markdown image syntax. PDF targets always become `<img>` with
/// the PNG sibling; other targets become `<img>` when forcing full width.
fn rewrite_markdown_images(content: &str, options: &ImageOptions) -> String {
    RE_MD_IMAGE
        .replace_all(content, |caps: &Captures| {
            let alt = &caps[1];
            let path = &caps[2];
            let title = caps.get(3).map(|m| m.as_str());

            if let Some(stem) = path.strip_suffix(".pdf") {
                return img_tag(&format!("{}.png", stem), alt, title);
            }
            if options.force_full_width || is_raster(path) {
                return img_tag(path, alt, title);
            }
            caps[0].to_string()
        })
        .into_owned()
}

fn rewrite_placeholders(content: &str) -> String {
    RE_PLACEHOLDER
        .replace_all(content, |caps: &Captures| {
            let span = &caps[0];
            let Some(src) = RE_ATTR_ORIGINAL_SRC.captures(span) else {
                return span.to_string();
            };
            // alt attribute, then span text, then the original title
            let alt = RE_ATTR_ALT
                .captures(span)
                .map(|c| c[1].trim().to_string())
                .filter(|alt| !alt.is_empty())
                .or_else(|| Some(caps[1].trim().to_string()).filter(|text| !text.is_empty()))
                .or_else(|| RE_ATTR_TITLE.captures(span).map(|c| c[1].to_string()))
                .unwrap_or_default();
            img_tag(&src[1], &alt, None)
        })
        .into_owned()
}

fn prefix_figure_paths(content: &str, options: &ImageOptions) -> String {
    let figures = format!("{}/", options.figures_dir);
    let prefixed = format!("{}/{}", options.media_dir, figures);

    let html = content.replace(
        &format!("src=\"{}", figures),
        &format!("src=\"{}", prefixed),
    );
    let markdown = html.replace(&format!("]({}", figures), &format!("]({}", prefixed));
    markdown.replace(
        &format!("data-original-image-src=\"{}", figures),
        &format!("data-original-image-src=\"{}", prefixed),
    )
}

/// Rewrites one `<img>` element so it carries exactly one `width="100%"`.
pub fn normalize_img_tag(tag: &str) -> String {
    let inner = tag
        .strip_prefix("<img")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(tag);

    let trimmed = inner.trim_end();
    let (body, self_closing) = match trimmed.strip_suffix('/') {
        Some(body) => (body.trim_end(), true),
        None => (trimmed, false),
    };

    let body = RE_ATTR_WIDTH.replace_all(body, "");
    let closer = if self_closing { " />" } else { ">" };
    format!(r#"<img{} width="100%"{}"#, body, closer)
}

/// Rewrites image references in a Markdown document. Idempotent.
pub fn rewrite_image_references(content: &str, options: &ImageOptions) -> String {
    let mut result = rewrite_markdown_images(content, options);

    result = RE_IMG_PDF_SRC
        .replace_all(&result, r#"${1}${2}.png""#)
        .into_owned();
    result = RE_ORIGINAL_SRC_PDF
        .replace_all(&result, r#"data-original-image-src="${1}.png""#)
        .into_owned();
    result = RE_REFERENCE_PDF
        .replace_all(&result, "${1}${2}.png")
        .into_owned();
    result = rewrite_placeholders(&result);
    result = prefix_figure_paths(&result, options);

    if options.force_full_width {
        result = RE_IMG_TAG
            .replace_all(&result, |caps: &Captures| normalize_img_tag(&caps[0]))
            .into_owned();
    }

    result
}
