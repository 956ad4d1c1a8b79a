use crate::codec::FeedFormatter;
use crate::config::WriterConfig;
use crate::content::{Attribute, ContentNode};
use crate::error::{FeedError, Result};
use crate::model::{non_empty, Category, Image, Item, Link, Person};
use crate::value::format_rfc3339;
use crate::xml::names::{is_xhtml_media_type, is_xml_media_type, XHTML_NAMESPACE};
use crate::xml::XmlEmitter;

use super::names::{
    attributes, contributor_types, elements, ensure_atom_namespace, image_types, is_atom,
    link_types, ATOM10_NAMESPACE, PLAIN_TEXT_CONTENT_TYPE,
};

/// Builds Atom 1.0 content trees from feed entities and serializes them.
///
/// The Atom namespace is always among the known bindings, so output
/// fragments are unprefixed and carry no declaration of their own.
#[derive(Debug, Clone)]
pub struct AtomFormatter {
    known_attributes: Vec<Attribute>,
    use_cdata: bool,
    indent: Option<usize>,
}

impl Default for AtomFormatter {
    fn default() -> Self {
        Self::with_config(&WriterConfig::default())
    }
}

impl AtomFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &WriterConfig) -> Self {
        Self {
            known_attributes: ensure_atom_namespace(config.known_attributes()),
            use_cdata: config.use_cdata,
            indent: config.indent,
        }
    }

    /// `<link href rel type length title>`; only non-default values are written.
    fn create_from_link(&self, link: &Link, href: &str) -> ContentNode {
        let mut result = ContentNode::new(elements::LINK);

        if let Some(title) = non_empty(&link.title) {
            result.add_attribute(Attribute::new(attributes::TITLE, title));
        }

        result.add_attribute(Attribute::new(attributes::HREF, href));

        if let Some(rel) = link.rel() {
            result.add_attribute(Attribute::new(attributes::REL, rel));
        }

        if let Some(media_type) = non_empty(&link.media_type) {
            result.add_attribute(Attribute::new(attributes::TYPE, media_type));
        }

        if link.length > 0 {
            result.add_attribute(Attribute::new(attributes::LENGTH, link.length.to_string()));
        }

        result
    }

    fn create_from_content_link(&self, link: &Link, src: &str) -> ContentNode {
        let mut result = ContentNode::new(elements::CONTENT);
        result.add_attribute(Attribute::new(attributes::SRC, src));

        if let Some(media_type) = non_empty(&link.media_type) {
            result.add_attribute(Attribute::new(attributes::TYPE, media_type));
        }

        result
    }

    fn create_from_source_link(&self, link: &Link, href: &str) -> ContentNode {
        let mut result = ContentNode::new(elements::SOURCE);

        if let Some(title) = non_empty(&link.title) {
            result.add_field(ContentNode::leaf(elements::TITLE, title));
        }

        let plain = Link {
            media_type: link.media_type.clone(),
            length: link.length,
            ..Link::default()
        };
        result.add_field(self.create_from_link(&plain, href));

        if let Some(updated) = &link.last_updated {
            result.add_field(ContentNode::leaf(elements::UPDATED, format_rfc3339(updated)));
        }

        result
    }
}

impl FeedFormatter for AtomFormatter {
    fn create_link(&self, link: &Link) -> Result<ContentNode> {
        let uri = link
            .uri
            .as_ref()
            .ok_or(FeedError::RequiredValue("Uri"))?
            .to_string();

        Ok(match link.rel() {
            Some(link_types::CONTENT) => self.create_from_content_link(link, &uri),
            Some(link_types::SOURCE) => self.create_from_source_link(link, &uri),
            _ => self.create_from_link(link, &uri),
        })
    }

    fn create_category(&self, category: &Category) -> Result<ContentNode> {
        if category.name.is_empty() {
            return Err(FeedError::RequiredValue("Name"));
        }

        let mut result = ContentNode::new(elements::CATEGORY);
        result.add_attribute(Attribute::new(attributes::TERM, category.name.clone()));

        if let Some(scheme) = non_empty(&category.scheme) {
            result.add_attribute(Attribute::new(attributes::SCHEME, scheme));
        }

        if let Some(label) = non_empty(&category.label) {
            result.add_attribute(Attribute::new(attributes::LABEL, label));
        }

        Ok(result)
    }

    fn create_person(&self, person: &Person) -> Result<ContentNode> {
        let name = non_empty(&person.name).ok_or(FeedError::RequiredValue("Name"))?;

        let contributor_type = person
            .relationship_type
            .as_deref()
            .unwrap_or(contributor_types::AUTHOR);
        if contributor_type != contributor_types::AUTHOR
            && contributor_type != contributor_types::CONTRIBUTOR
        {
            return Err(FeedError::argument(format!(
                "RelationshipType '{contributor_type}' is not an Atom person type"
            )));
        }

        let mut result = ContentNode::new(contributor_type);
        result.add_field(ContentNode::leaf(elements::NAME, name));

        if let Some(email) = non_empty(&person.email) {
            result.add_field(ContentNode::leaf(elements::EMAIL, email));
        }

        if let Some(uri) = non_empty(&person.uri) {
            result.add_field(ContentNode::leaf(elements::URI, uri));
        }

        Ok(result)
    }

    fn create_image(&self, image: &Image) -> Result<ContentNode> {
        let url = image.url.as_ref().ok_or(FeedError::RequiredValue("Url"))?;
        let element = non_empty(&image.relationship_type).unwrap_or(image_types::ICON);
        Ok(ContentNode::leaf(element, url.to_string()))
    }

    fn create_item(&self, item: &Item) -> Result<ContentNode> {
        let id = non_empty(&item.id).ok_or(FeedError::RequiredValue("Id"))?;
        let title = non_empty(&item.title).ok_or(FeedError::RequiredValue("Title"))?;
        let updated = item
            .last_updated
            .as_ref()
            .ok_or(FeedError::RequiredValue("LastUpdated"))?;

        let mut result = ContentNode::new(elements::ENTRY);
        result.add_field(ContentNode::leaf(elements::ID, id));
        result.add_field(ContentNode::leaf(elements::TITLE, title));
        result.add_field(ContentNode::leaf(elements::UPDATED, format_rfc3339(updated)));

        if let Some(published) = &item.published {
            result.add_field(ContentNode::leaf(elements::PUBLISHED, format_rfc3339(published)));
        }

        let mut has_content_link = false;
        let mut has_alternate_link = false;

        for link in &item.links {
            match link.rel() {
                Some(link_types::CONTENT) => {
                    if has_content_link {
                        return Err(FeedError::format("Multiple content links are not allowed"));
                    }
                    has_content_link = true;
                }
                None | Some(link_types::ALTERNATE) => has_alternate_link = true,
                Some(_) => {}
            }

            result.add_field(self.create_link(link)?);
        }

        for person in &item.contributors {
            result.add_field(self.create_person(person)?);
        }

        for category in &item.categories {
            result.add_field(self.create_category(category)?);
        }

        let extension = item.atom.as_ref();

        match non_empty(&item.description) {
            Some(description) => {
                if has_content_link {
                    return Err(FeedError::format(
                        "Description and content link are not allowed simultaneously",
                    ));
                }

                let mut content = ContentNode::leaf(elements::CONTENT, description);
                let content_type = extension
                    .and_then(|ext| non_empty(&ext.content_type))
                    .filter(|t| !t.eq_ignore_ascii_case(PLAIN_TEXT_CONTENT_TYPE));
                if let Some(content_type) = content_type {
                    content.add_attribute(Attribute::new(attributes::TYPE, content_type));
                }
                result.add_field(content);
            }
            None if !(has_content_link || has_alternate_link) => {
                return Err(FeedError::format(
                    "Description or alternate link is required",
                ));
            }
            None => {}
        }

        if let Some(ext) = extension {
            if let Some(summary) = non_empty(&ext.summary) {
                result.add_field(ContentNode::leaf(elements::SUMMARY, summary));
            }

            if let Some(rights) = non_empty(&ext.rights) {
                result.add_field(ContentNode::leaf(elements::RIGHTS, rights));
            }
        }

        Ok(result)
    }

    /// Serializes `content` into an open emitter.
    ///
    /// Values of Atom elements typed `xhtml` are spliced inside an XHTML
    /// `<div>`; values of `<content>` with an XML media type are spliced
    /// as markup in no namespace.
    fn write_content(&self, emitter: &mut XmlEmitter, content: &ContentNode) -> Result<()> {
        emitter.write_start_content(content, Some(ATOM10_NAMESPACE))?;

        let mut media_type = None;
        for attr in &content.attributes {
            if media_type.is_none() && attr.name == attributes::TYPE {
                media_type = Some(attr.value.as_str());
            }
            emitter.write_content_attribute(attr)?;
        }

        match &content.value {
            Some(value) if is_xhtml_media_type(media_type) && is_atom(content, None) => {
                emitter.start_element(None, "div", Some(XHTML_NAMESPACE))?;
                emitter.write_xml_fragment(value, XHTML_NAMESPACE)?;
                emitter.end_element()?;
            }
            Some(value)
                if is_xml_media_type(media_type) && is_atom(content, Some(elements::CONTENT)) =>
            {
                emitter.write_xml_fragment(value, "")?;
            }
            Some(value) => emitter.write_value(value, self.use_cdata)?,
            None => {
                for field in &content.fields {
                    self.write_content(emitter, field)?;
                }
            }
        }

        emitter.end_element()
    }

    fn format(&self, content: &ContentNode) -> Result<String> {
        let mut emitter = XmlEmitter::with_bindings(&self.known_attributes, self.indent);
        self.write_content(&mut emitter, content)?;
        emitter.into_string()
    }
}
