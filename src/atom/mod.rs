//! Atom 1.0 codec.
//!
//! - [`formatter`] - entities → content tree → XML fragment, with XHTML and XML content splicing
//! - [`parser`] - content tree → entities, for elements in the Atom namespace or none

mod formatter;
pub mod names;
mod parser;

pub use formatter::AtomFormatter;
pub use parser::AtomParser;
