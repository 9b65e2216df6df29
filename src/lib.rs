//! # texbook
//!
//! Converts a LaTeX academic manuscript into a Quarto book: one `.qmd` page
//! per section plus index, references page, `_quarto.yml`, `acronyms.yml`
//! and `styles.css`.
//!
//! ## Pipeline
//!
//! Each section goes through input resolution, LaTeX stripping and citation
//! rewriting, an external LaTeX-to-Markdown converter (Pandoc by default),
//! then the [`normalize`] passes: citation cleanup, heading correction,
//! acronym references, box images and image references.
//!
//! ## Quick Start
//!
//! ```no_run
//! use texbook::{BookBuilder, BookConfig};
//! use std::path::Path;
//!
//! fn main() -> texbook::Result<()> {
//!     let builder = BookBuilder::new(BookConfig::default());
//!     let report = builder.build(Path::new("latex"), Path::new("book"), "media")?;
//!     println!("{} sections converted", report.sections_converted);
//!     Ok(())
//! }
//! ```
//!
//! The normalization passes are plain string functions and need no
//! external tools:
//!
//! ```
//! use texbook::normalize::convert_citations;
//!
//! assert_eq!(convert_citations(r"see \cite{a,b}"), "see [@a; @b]");
//! ```
//!
//! ## Features
//!
//! - `archive` (default): ZIP source bundle extraction

pub mod bibtex;
pub mod book;
pub mod cleanup;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod html;
pub mod latex;
pub mod media;
pub mod model;
pub mod normalize;
pub mod rasterize;
pub mod readme;

#[cfg(feature = "archive")]
pub mod archive;

// Re-exports
pub use bibtex::{parse_bibtex, read_bibtex};
pub use book::{prepare_input, BookBuilder, BuildReport};
pub use config::{BookConfig, SectionSpec, SplitRule};
pub use convert::{DocumentConverter, PandocConverter, SectionConverter, SectionOutcome};
pub use detect::locate_source_root;
pub use error::{Error, Result};
pub use html::{inject_author_randomizer, randomize_file};
pub use model::{AcronymEntry, AcronymTable, BibEntry, Bibliography, SectionRecord};
pub use normalize::{normalize_markdown, NormalizeOptions};
pub use rasterize::Rasterizer;
pub use readme::{generate_readme, ReadmeOptions, ReadmeReport};
