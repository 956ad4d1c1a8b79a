//! Transcoding between RSS 2.0 / Atom 1.0 XML and format-neutral feed entities.
//!
//! Every conversion goes through a [`ContentNode`] tree:
//!
//! - [`xml`] - content tree ↔ XML text, with namespace-aware emission
//! - [`rss`] / [`atom`] - typed projections between trees and [`model`] entities
//! - [`codec`] - the [`FeedFormatter`] / [`FeedParser`] traits both formats implement
//! - [`transcode`] - RSS item → Atom entry

pub mod atom;
pub mod codec;
pub mod config;
pub mod content;
pub mod error;
pub mod model;
pub mod rss;
pub mod transcode;
pub mod value;
pub mod xml;

pub use codec::{FeedFormatter, FeedParser};
pub use config::WriterConfig;
pub use content::{Attribute, ContentNode};
pub use error::{FeedError, Result};
