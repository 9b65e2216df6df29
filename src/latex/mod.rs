//! Readers for the LaTeX side of a manuscript.
//!
//! Nothing here parses LaTeX in general: each function recognizes the
//! handful of constructs the book build needs and leaves the rest to Pandoc.

mod acronyms;
mod input;
mod outline;
mod strip;
mod table;

pub use acronyms::{default_overrides, parse_acronyms, AcronymOverride};
pub use input::{resolve_inputs, DEFAULT_EXTENSION};
pub use outline::extract_sections;
pub use strip::{
    braced_argument, command_argument, extract_abstract, extract_document_title,
    extract_section_title, remove_command, split_at_section, strip_commands, strip_latex,
    SplitParts, UNTITLED,
};
pub use table::simplify_longtables;
