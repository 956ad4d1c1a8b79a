//! Format-independent feed entities.
//!
//! These are plain owned values: an [`Item`] owns its links, contributors and
//! categories by value. Formatters turn them into [`ContentNode`] trees and
//! parsers build them back from trees.
//!
//! [`ContentNode`]: crate::content::ContentNode

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use url::Url;

/// A hyperlink attached to an item or channel.
///
/// `relationship_type` selects the serialized shape (`alternate`, `content`,
/// `source`, `enclosure`, `comments`, `guid`, ...). `None` is treated as
/// `alternate` by both formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Link {
    pub uri: Option<Url>,
    pub relationship_type: Option<String>,
    pub title: Option<String>,
    pub media_type: Option<String>,
    /// Byte length of the target; `0` means unknown.
    pub length: u64,
    /// Only meaningful for `source` links.
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl Link {
    pub fn new(uri: Url) -> Self {
        Self {
            uri: Some(uri),
            ..Self::default()
        }
    }

    pub fn with_type(uri: Url, relationship_type: impl Into<String>) -> Self {
        Self {
            uri: Some(uri),
            relationship_type: Some(relationship_type.into()),
            ..Self::default()
        }
    }

    /// Relationship type, or `None` when it is unset or blank.
    pub fn rel(&self) -> Option<&str> {
        self.relationship_type.as_deref().filter(|r| !r.is_empty())
    }
}

/// An author, contributor or editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
    pub relationship_type: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn with_type(
        name: impl Into<String>,
        email: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            relationship_type: Some(relationship_type.into()),
            ..Self::new(name, email)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A feed image (RSS `<image>`, Atom `<icon>`/`<logo>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    pub url: Option<Url>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<Link>,
    pub relationship_type: Option<String>,
}

impl Image {
    pub fn new(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }
}

/// Atom-only entry fields, inspected by presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomExtension {
    pub summary: Option<String>,
    pub rights: Option<String>,
    /// Media type of the inline `<content>` (`text`, `html`, `xhtml`, or a MIME type).
    pub content_type: Option<String>,
}

/// A feed item (RSS `<item>`, Atom `<entry>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Item {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<FixedOffset>>,
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub links: Vec<Link>,
    pub contributors: Vec<Person>,
    pub categories: Vec<Category>,
    pub atom: Option<AtomExtension>,
}

impl Item {
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn add_contributor(&mut self, person: Person) {
        self.contributors.push(person);
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }
}

/// Returns `Some(s)` only when `s` is present and non-empty.
pub(crate) fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}
