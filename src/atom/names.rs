//! Atom 1.0 element, attribute and relationship names.

use crate::content::{Attribute, ContentNode};

pub const ATOM10_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const PLAIN_TEXT_CONTENT_TYPE: &str = "text";

pub mod elements {
    pub const ENTRY: &str = "entry";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const UPDATED: &str = "updated";
    pub const PUBLISHED: &str = "published";
    pub const LINK: &str = "link";
    pub const CATEGORY: &str = "category";
    pub const CONTENT: &str = "content";
    pub const SOURCE: &str = "source";
    pub const SUMMARY: &str = "summary";
    pub const RIGHTS: &str = "rights";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const URI: &str = "uri";
}

pub mod attributes {
    pub const HREF: &str = "href";
    pub const REL: &str = "rel";
    pub const TYPE: &str = "type";
    pub const LENGTH: &str = "length";
    pub const TITLE: &str = "title";
    pub const SRC: &str = "src";
    pub const TERM: &str = "term";
    pub const SCHEME: &str = "scheme";
    pub const LABEL: &str = "label";
}

pub mod link_types {
    pub const ALTERNATE: &str = "alternate";
    pub const CONTENT: &str = "content";
    pub const SOURCE: &str = "source";
}

pub mod contributor_types {
    pub const AUTHOR: &str = "author";
    pub const CONTRIBUTOR: &str = "contributor";
}

pub mod image_types {
    pub const ICON: &str = "icon";
    pub const LOGO: &str = "logo";
}

/// True for no namespace or the Atom namespace.
pub fn is_atom_namespace(namespace: Option<&str>) -> bool {
    matches!(namespace, None | Some("") | Some(ATOM10_NAMESPACE))
}

/// True when `content` is an Atom element (optionally with a given name).
pub fn is_atom(content: &ContentNode, name: Option<&str>) -> bool {
    name.map_or(true, |n| content.name == n) && is_atom_namespace(content.namespace.as_deref())
}

/// Inserts a default Atom namespace declaration unless one is already present.
pub fn ensure_atom_namespace(mut attributes: Vec<Attribute>) -> Vec<Attribute> {
    let declared = attributes
        .iter()
        .any(|a| a.name.starts_with("xmlns") && a.value == ATOM10_NAMESPACE);
    if !declared {
        attributes.insert(0, Attribute::new("xmlns", ATOM10_NAMESPACE));
    }
    attributes
}
