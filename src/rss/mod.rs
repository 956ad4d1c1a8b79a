//! RSS 2.0 codec.
//!
//! - [`parser`] - content tree → entities, enforcing RSS 2.0 element identity
//! - [`formatter`] - entities → content tree → XML fragment
//! - [`writer`] - `<rss><channel>` document writer over any [`FeedFormatter`]
//!
//! [`FeedFormatter`]: crate::codec::FeedFormatter

mod formatter;
pub mod names;
mod parser;
mod writer;

pub use formatter::RssFormatter;
pub use parser::RssParser;
pub use writer::RssFeedWriter;
