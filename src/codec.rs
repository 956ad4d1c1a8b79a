//! Format-neutral contracts implemented by the RSS and Atom codecs.

use crate::content::ContentNode;
use crate::error::Result;
use crate::model::{Category, Image, Item, Link, Person};
use crate::xml::XmlEmitter;

/// Domain entity → content tree → XML.
///
/// Implementations hold only configuration, so every call is independent.
pub trait FeedFormatter {
    fn create_item(&self, item: &Item) -> Result<ContentNode>;
    fn create_link(&self, link: &Link) -> Result<ContentNode>;
    fn create_person(&self, person: &Person) -> Result<ContentNode>;
    fn create_category(&self, category: &Category) -> Result<ContentNode>;
    fn create_image(&self, image: &Image) -> Result<ContentNode>;

    /// Serializes `content` into an open emitter, so a document writer
    /// can nest it under elements it already started.
    fn write_content(&self, emitter: &mut XmlEmitter, content: &ContentNode) -> Result<()>;

    /// Serializes a content tree as an XML fragment.
    fn format(&self, content: &ContentNode) -> Result<String>;

    fn format_item(&self, item: &Item) -> Result<String> {
        self.format(&self.create_item(item)?)
    }

    fn format_link(&self, link: &Link) -> Result<String> {
        self.format(&self.create_link(link)?)
    }

    fn format_person(&self, person: &Person) -> Result<String> {
        self.format(&self.create_person(person)?)
    }

    fn format_category(&self, category: &Category) -> Result<String> {
        self.format(&self.create_category(category)?)
    }

    fn format_image(&self, image: &Image) -> Result<String> {
        self.format(&self.create_image(image)?)
    }
}

/// XML → content tree → domain entity.
///
/// The `parse_*` methods check the root element identity before projecting;
/// the `create_*` methods project an already-parsed tree.
pub trait FeedParser {
    fn parse_content(&self, xml: &str) -> Result<ContentNode> {
        crate::xml::parse_content(xml)
    }

    fn create_item(&self, content: &ContentNode) -> Result<Item>;
    fn create_link(&self, content: &ContentNode) -> Result<Link>;
    fn create_person(&self, content: &ContentNode) -> Result<Person>;
    fn create_category(&self, content: &ContentNode) -> Result<Category>;
    fn create_image(&self, content: &ContentNode) -> Result<Image>;

    fn parse_item(&self, xml: &str) -> Result<Item>;
    fn parse_link(&self, xml: &str) -> Result<Link>;
    fn parse_person(&self, xml: &str) -> Result<Person>;
    fn parse_category(&self, xml: &str) -> Result<Category>;
    fn parse_image(&self, xml: &str) -> Result<Image>;
}
