use thiserror::Error;

/// Errors raised while transcoding between feed entities, content trees and XML.
///
/// Every variant is raised at the point of violation and returned to the
/// caller unchanged; a failed call never yields a partial tree or entity.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A mandatory field or attribute is missing or empty (e.g. `Id`, `Title`, `Uri`).
    #[error("Required value missing: {0}")]
    RequiredValue(&'static str),

    /// Well-formed input that violates the feed grammar.
    #[error("Invalid feed format: {0}")]
    Format(String),

    /// The caller supplied a value the format does not allow.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The underlying XML reader or writer failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// SEC-003: Content nesting depth exceeds safety limit.
    #[error("Content nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

impl FeedError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        FeedError::Format(msg.into())
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        FeedError::Argument(msg.into())
    }
}

impl From<quick_xml::Error> for FeedError {
    fn from(e: quick_xml::Error) -> Self {
        FeedError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FeedError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        FeedError::Xml(e.to_string())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(e: std::io::Error) -> Self {
        FeedError::Xml(e.to_string())
    }
}

/// Maps any XML-layer failure into [`FeedError::Xml`].
pub(crate) fn xml_err(e: impl std::fmt::Display) -> FeedError {
    FeedError::Xml(e.to_string())
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, FeedError>;
