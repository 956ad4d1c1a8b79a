//! XML plumbing between content trees and `quick-xml`.
//!
//! - [`writer`] - namespace/prefix resolution and fragment splicing on output
//! - [`reader`] - recursive-descent content parser on input
//! - [`names`] - qualified-name and media-type helpers shared by both

pub mod names;
pub mod reader;
pub mod writer;

pub use reader::{element_inner_markup, parse_content, parse_content_with, read_content};
pub use writer::XmlEmitter;
