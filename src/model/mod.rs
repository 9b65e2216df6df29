//! Data model shared by the LaTeX readers, the book builder and the README generator.

mod acronym;
mod bibliography;
mod section;

pub use acronym::*;
pub use bibliography::*;
pub use section::*;
