//! Replacement of equation and prompt boxes with pre-rendered images.
//!
//! Pandoc emits `tcolorbox` and `promptbox` environments as fenced divs
//! whose math does not render well on the web. Boxes whose label maps to a
//! known image are replaced by that image; text after the math block is kept.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Fenced box kinds produced by Pandoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    TColorBox,
    PromptBox,
}

impl BoxKind {
    fn label_prefix(self) -> &'static str {
        match self {
            BoxKind::TColorBox => "eq:",
            BoxKind::PromptBox => "box:",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            BoxKind::TColorBox => "Tcolorbox",
            BoxKind::PromptBox => "Promptbox",
        }
    }
}

/// Box replacement options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxImageOptions {
    /// Media directory name inside the book.
    pub media_dir: String,
    /// Subdirectory of the media directory holding equation images.
    pub images_subdir: String,
    /// Label without its `eq:`/`box:` prefix -> image file name.
    pub mappings: BTreeMap<String, String>,
    /// Phrase found in a box body -> label, checked before label discovery.
    pub phrase_hints: BTreeMap<String, String>,
}

impl Default for BoxImageOptions {
    fn default() -> Self {
        let mappings = ["nexttoken", "infonce", "rl_objective", "cot_prompting"]
            .into_iter()
            .map(|name| (name.to_string(), format!("{}.png", name)))
            .collect();
        let phrase_hints = BTreeMap::from([(
            "Reinforcement Learning Framework".to_string(),
            "eq:rl_objective".to_string(),
        )]);
        Self {
            media_dir: "media".to_string(),
            images_subdir: "eq_images".to_string(),
            mappings,
            phrase_hints,
        }
    }
}

impl BoxImageOptions {
    /// Image file names every mapping expects to find.
    pub fn expected_images(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappings.values().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn image_for(&self, label: &str) -> Option<&str> {
        if let Some(image) = self.mappings.get(label) {
            return Some(image);
        }
        self.mappings.get(clean_label(label)).map(String::as_str)
    }
}

/// Strips an `eq:` or `box:` prefix from a label.
fn clean_label(label: &str) -> &str {
    label
        .strip_prefix("eq:")
        .or_else(|| label.strip_prefix("box:"))
        .unwrap_or(label)
        .trim()
}

// Fences are matched as whole lines so a longer fence never matches.
static RE_TCOLORBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^:::::[ \t]+tcolorbox[ \t]*\n(.*?)\n:::::[ \t]*$").unwrap()
});
static RE_PROMPTBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^:::[ \t]+promptbox[ \t]*\n(.*?)\n:::[ \t]*$").unwrap()
});

static RE_ANCHOR_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[\]\{#[^}\s]+\s+label="([^"]+)"\}"#).unwrap());
static RE_LABEL_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"label="([^"]+)""#).unwrap());
static RE_EQ_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(eq:[^\s}]+)").unwrap());
static RE_BOX_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(box:[^\s}]+)").unwrap());
static RE_EQUATION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\begin\{equation\}.*?\\label\{(eq:[^}]+)\}").unwrap()
});
static RE_ANY_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\label\{([^}]+)\}").unwrap());
static RE_MATH_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\$\$.*?\$\$|\\\[.*?\\\]|\\begin\{equation\}.*?\\end\{equation\})").unwrap()
});
static RE_FENCE_CLOSERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":::\s*::::|:::").unwrap());

/// Finds the label of a box body, trying the most explicit forms first.
fn find_label(body: &str, kind: BoxKind, options: &BoxImageOptions) -> Option<String> {
    if let Some(label) = options
        .phrase_hints
        .iter()
        .find(|(phrase, _)| body.contains(phrase.as_str()))
        .map(|(_, label)| label.clone())
    {
        return Some(label);
    }

    if let Some(caps) = RE_ANCHOR_LABEL.captures(body) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = RE_LABEL_ATTR.captures(body) {
        return Some(caps[1].to_string());
    }

    let anchor = match kind {
        BoxKind::TColorBox => RE_EQ_ANCHOR
            .captures(body)
            .or_else(|| RE_EQUATION_LABEL.captures(body)),
        BoxKind::PromptBox => RE_BOX_ANCHOR.captures(body),
    };
    if let Some(caps) = anchor {
        return Some(caps[1].to_string());
    }

    let labels: Vec<&str> = RE_ANY_LABEL
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if let Some(label) = labels
        .iter()
        .find(|l| l.contains("eq:") || l.contains("box:"))
        .or_else(|| labels.first())
    {
        return Some(label.to_string());
    }

    // Infer from mapped names appearing in the body
    let lower = body.to_lowercase();
    options
        .mappings
        .keys()
        .find(|name| lower.contains(name.as_str()) || lower.contains(&name.replace('_', " ")))
        .map(|name| format!("{}{}", kind.label_prefix(), name))
}

/// Text after the math block of an equation box, without fence remnants.
fn trailing_description(body: &str) -> Option<String> {
    let math = RE_MATH_BLOCK.find(body)?;
    let after = RE_FENCE_CLOSERS.replace_all(&body[math.end()..], "");
    let after = after.trim();
    (!after.is_empty()).then(|| after.to_string())
}

fn replace_kind(content: &str, kind: BoxKind, options: &BoxImageOptions) -> String {
    let pattern = match kind {
        BoxKind::TColorBox => &*RE_TCOLORBOX,
        BoxKind::PromptBox => &*RE_PROMPTBOX,
    };

    pattern
        .replace_all(content, |caps: &Captures| {
            let body = &caps[1];
            let Some(label) = find_label(body, kind, options) else {
                warn!(
                    kind = kind.display_name(),
                    "no label found in box, leaving it unchanged"
                );
                return caps[0].to_string();
            };
            let Some(image) = options.image_for(&label) else {
                warn!(%label, "no image mapping for box label");
                return caps[0].to_string();
            };

            debug!(%label, %image, "replacing box with image");
            let mut replacement = format!(
                r#"<img src="{}/{}/{}" width="100%" alt="{}: {}" />"#,
                options.media_dir,
                options.images_subdir,
                image,
                kind.display_name(),
                label
            );
            if kind == BoxKind::TColorBox {
                if let Some(description) = trailing_description(body) {
                    replacement.push_str("\n\n");
                    replacement.push_str(&description);
                }
            }
            replacement
        })
        .into_owned()
}

/// Replaces mapped equation and prompt boxes with their images.
pub fn replace_boxes_with_images(content: &str, options: &BoxImageOptions) -> String {
    let result = replace_kind(content, BoxKind::TColorBox, options);
    replace_kind(&result, BoxKind::PromptBox, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equation_label_replaced() {
        let input = concat!(
            "Before\n\n",
            "::::: tcolorbox\n",
            "$$p(x) = \\prod_i p(x_i | x_{<i}) \\label{eq:nexttoken}$$\n",
            "where $x$ is a token sequence.\n",
            ":::::\n\nAfter"
        );
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert!(out.contains(
            r#"<img src="media/eq_images/nexttoken.png" width="100%" alt="Tcolorbox: eq:nexttoken" />"#
        ));
        assert!(out.contains("where $x$ is a token sequence."));
        assert!(!out.contains("tcolorbox\n"));
        assert!(out.ends_with("After"));
    }

    #[test]
    fn test_promptbox_anchor() {
        let input = "::: promptbox\n[]{#box:cot_prompting label=\"box:cot_prompting\"} Think step by step\n:::";
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert_eq!(
            out,
            r#"<img src="media/eq_images/cot_prompting.png" width="100%" alt="Promptbox: box:cot_prompting" />"#
        );
    }

    #[test]
    fn test_promptbox_fence_length() {
        let nested = concat!(
            ":::: {.outer}\n",
            "::: promptbox\n",
            "[]{#box:cot_prompting label=\"box:cot_prompting\"} Think step by step\n",
            ":::\n",
            "::::",
        );
        let out = replace_boxes_with_images(nested, &BoxImageOptions::default());
        assert_eq!(
            out,
            concat!(
                ":::: {.outer}\n",
                r#"<img src="media/eq_images/cot_prompting.png" width="100%" alt="Promptbox: box:cot_prompting" />"#,
                "\n::::",
            )
        );

        let longer = "::::: promptbox\n[]{#box:cot_prompting label=\"box:cot_prompting\"} Think\n:::::";
        assert_eq!(
            replace_boxes_with_images(longer, &BoxImageOptions::default()),
            longer
        );
    }

    #[test]
    fn test_phrase_hint() {
        let input = "::::: tcolorbox\n**Reinforcement Learning Framework**\n$$J(\\theta)$$\n:::::";
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert!(out.starts_with(r#"<img src="media/eq_images/rl_objective.png""#));
    }

    #[test]
    fn test_inferred_from_content() {
        let input = "::::: tcolorbox\nThe InfoNCE loss\n$$L = -\\log x$$\n:::::";
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert!(out.contains("infonce.png"));
    }

    #[test]
    fn test_unmapped_label_unchanged() {
        let input = "::::: tcolorbox\n$$a=b \\label{eq:unknown}$$\n:::::";
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_no_label_unchanged() {
        let input = "::: promptbox\nJust some prompt\n:::";
        let out = replace_boxes_with_images(input, &BoxImageOptions::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_expected_images() {
        let options = BoxImageOptions::default();
        assert_eq!(
            options.expected_images(),
            vec!["cot_prompting.png", "infonce.png", "nexttoken.png", "rl_objective.png"]
        );
    }
}
