//! YAML frontmatter handling for book pages.

use serde::{Deserialize, Serialize};

/// A navigation link shown in each page's sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLink {
    pub text: String,
    pub href: String,
    pub icon: String,
}

impl SiteLink {
    pub fn new(text: impl Into<String>, href: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Serialize)]
struct PageFrontmatter<'a> {
    format: PageFormat,
    acronyms: PageAcronyms<'a>,
}

#[derive(Serialize)]
struct PageFormat {
    html: PageHtml,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct PageHtml {
    toc: bool,
    smooth_scroll: bool,
    anchor_sections: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    other_links: Vec<SiteLink>,
}

#[derive(Serialize)]
struct PageAcronyms<'a> {
    insert_loa: bool,
    insert_links: bool,
    fromfile: &'a str,
}

#[derive(Serialize)]
struct TitleOnly<'a> {
    title: &'a str,
}

fn wrap(yaml: &str) -> String {
    format!("---\n{}---\n\n", yaml)
}

/// Builds the frontmatter block prepended to every book page.
pub fn section_frontmatter(links: &[SiteLink], acronyms_file: &str) -> crate::Result<String> {
    let frontmatter = PageFrontmatter {
        format: PageFormat {
            html: PageHtml {
                toc: true,
                smooth_scroll: true,
                anchor_sections: true,
                other_links: links.to_vec(),
            },
        },
        acronyms: PageAcronyms {
            insert_loa: false,
            insert_links: false,
            fromfile: acronyms_file,
        },
    };
    Ok(wrap(&serde_yaml::to_string(&frontmatter)?))
}

/// Builds a frontmatter block holding only a title.
pub fn title_frontmatter(title: &str) -> crate::Result<String> {
    Ok(wrap(&serde_yaml::to_string(&TitleOnly { title })?))
}

/// Splits leading YAML frontmatter from a Markdown document.
///
/// Returns `(frontmatter, body)`. The frontmatter excludes its `---`
/// delimiters; the body starts after the closing delimiter line.
pub fn split_frontmatter(input: &str) -> (Option<&str>, &str) {
    let Some(after_open) = input
        .strip_prefix("---\n")
        .or_else(|| input.strip_prefix("---\r\n"))
    else {
        return (None, input);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, input)
}

/// Removes leading YAML frontmatter, if any, along with the blank lines after it.
pub fn strip_frontmatter(input: &str) -> &str {
    match split_frontmatter(input) {
        (Some(_), body) => body.trim_start_matches(['\n', '\r']),
        (None, body) => body,
    }
}

/// Page written when the external converter fails: title frontmatter, a
/// heading, a manual-review note and the cleaned source.
pub fn fallback_document(title: &str, body: &str) -> crate::Result<String> {
    Ok(format!(
        "{}# {}\n\n*Note: This section had conversion issues and needs manual review.*\n\n{}\n",
        title_frontmatter(title)?,
        title,
        body
    ))
}
