use crate::codec::FeedParser;
use crate::content::ContentNode;
use crate::error::{FeedError, Result};
use crate::model::{AtomExtension, Category, Image, Item, Link, Person};
use crate::value::{try_parse_datetime, try_parse_u64, try_parse_uri};
use crate::xml::names::{is_xhtml_media_type, is_xml_media_type};
use crate::xml::{element_inner_markup, parse_content_with};

use super::names::{
    attributes, contributor_types, elements, image_types, is_atom, is_atom_namespace, link_types,
};

/// Projects Atom 1.0 content trees onto feed entities.
///
/// Elements are accepted in the Atom namespace or in no namespace, so the
/// unprefixed fragments written by [`AtomFormatter`](super::AtomFormatter)
/// parse back directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomParser;

impl AtomParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses an `<entry>` element.
    pub fn parse_entry(&self, xml: &str) -> Result<Item> {
        self.parse_item(xml)
    }
}

fn atom_attribute<'a>(content: &'a ContentNode, name: &str) -> Option<&'a str> {
    content.find_attribute(name, |ns| ns.map_or(true, str::is_empty))
}

/// Elements whose children are markup rather than Atom fields: any text
/// construct typed `xhtml` and inline `<content>` with an XML media type.
fn keeps_markup(content: &ContentNode) -> bool {
    let media_type = atom_attribute(content, attributes::TYPE);
    is_atom(content, None)
        && (is_xhtml_media_type(media_type)
            || (content.name == elements::CONTENT
                && atom_attribute(content, attributes::SRC).is_none()
                && is_xml_media_type(media_type)))
}

/// Value of a text construct; `xhtml` markup is unwrapped from its `<div>`.
fn text_construct(field: &ContentNode) -> Result<Option<String>> {
    match field.value.as_deref() {
        Some(markup) if is_xhtml_media_type(atom_attribute(field, attributes::TYPE)) => {
            element_inner_markup(markup)
        }
        value => Ok(value.map(str::to_string)),
    }
}

fn expect_element(content: &ContentNode, names: &[&str], what: &str) -> Result<()> {
    if names.contains(&content.name.as_str()) && is_atom_namespace(content.namespace.as_deref()) {
        Ok(())
    } else {
        Err(FeedError::format(format!("Invalid Atom {what}")))
    }
}

fn required_uri(raw: Option<&str>, what: &str) -> Result<url::Url> {
    let raw = raw.ok_or_else(|| FeedError::format(format!("Atom {what} has no uri")))?;
    try_parse_uri(raw).ok_or_else(|| FeedError::format(format!("Invalid {what} uri '{raw}'")))
}

/// `<updated>` must hold a valid date; other dates are best effort.
fn required_date(field: &ContentNode) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    let raw = field.value.as_deref().unwrap_or_default();
    try_parse_datetime(raw).ok_or_else(|| FeedError::format(format!("Invalid date '{raw}'")))
}

impl AtomParser {
    fn create_content_link(&self, content: &ContentNode, src: &str) -> Result<Link> {
        Ok(Link {
            media_type: atom_attribute(content, attributes::TYPE).map(str::to_string),
            ..Link::with_type(required_uri(Some(src), "content")?, link_types::CONTENT)
        })
    }

    fn create_source_link(&self, content: &ContentNode) -> Result<Link> {
        let mut title = None;
        let mut inner = None;
        let mut last_updated = None;

        for field in &content.fields {
            if !is_atom_namespace(field.namespace.as_deref()) {
                continue;
            }

            match field.name.as_str() {
                elements::TITLE => title = field.value.clone(),
                elements::LINK if inner.is_none() => inner = Some(self.create_link(field)?),
                elements::UPDATED => last_updated = Some(required_date(field)?),
                _ => {}
            }
        }

        let inner = inner.ok_or_else(|| FeedError::format("Atom source has no link"))?;
        Ok(Link {
            relationship_type: Some(link_types::SOURCE.to_string()),
            title,
            last_updated,
            ..inner
        })
    }
}

impl FeedParser for AtomParser {
    fn parse_content(&self, xml: &str) -> Result<ContentNode> {
        parse_content_with(xml, &keeps_markup)
    }

    fn create_item(&self, content: &ContentNode) -> Result<Item> {
        let mut item = Item::default();
        let mut extension = AtomExtension::default();

        for field in &content.fields {
            if !is_atom_namespace(field.namespace.as_deref()) {
                continue;
            }

            match field.name.as_str() {
                elements::ID => item.id = field.value.clone(),
                elements::TITLE => item.title = field.value.clone(),
                elements::UPDATED => item.last_updated = Some(required_date(field)?),
                elements::PUBLISHED => {
                    item.published = field.value.as_deref().and_then(try_parse_datetime);
                }
                elements::LINK | elements::SOURCE => item.add_link(self.create_link(field)?),
                contributor_types::AUTHOR | contributor_types::CONTRIBUTOR => {
                    item.add_contributor(self.create_person(field)?)
                }
                elements::CATEGORY => item.add_category(self.create_category(field)?),
                elements::CONTENT => match atom_attribute(field, attributes::SRC) {
                    Some(src) => item.add_link(self.create_content_link(field, src)?),
                    None => {
                        item.description = text_construct(field)?;
                        extension.content_type =
                            atom_attribute(field, attributes::TYPE).map(str::to_string);
                    }
                },
                elements::SUMMARY => extension.summary = text_construct(field)?,
                elements::RIGHTS => extension.rights = text_construct(field)?,
                _ => {}
            }
        }

        if extension != AtomExtension::default() {
            item.atom = Some(extension);
        }

        Ok(item)
    }

    fn create_link(&self, content: &ContentNode) -> Result<Link> {
        if is_atom(content, Some(elements::SOURCE)) {
            return self.create_source_link(content);
        }
        if is_atom(content, Some(elements::CONTENT)) {
            let src = atom_attribute(content, attributes::SRC)
                .ok_or_else(|| FeedError::format("Atom content has no src"))?;
            return self.create_content_link(content, src);
        }

        let uri = required_uri(atom_attribute(content, attributes::HREF), "link")?;
        let rel = atom_attribute(content, attributes::REL).unwrap_or(link_types::ALTERNATE);

        Ok(Link {
            title: atom_attribute(content, attributes::TITLE).map(str::to_string),
            media_type: atom_attribute(content, attributes::TYPE).map(str::to_string),
            length: atom_attribute(content, attributes::LENGTH)
                .and_then(try_parse_u64)
                .unwrap_or(0),
            ..Link::with_type(uri, rel)
        })
    }

    fn create_person(&self, content: &ContentNode) -> Result<Person> {
        let mut person = Person {
            relationship_type: Some(content.name.clone()),
            ..Person::default()
        };

        for field in &content.fields {
            if !is_atom_namespace(field.namespace.as_deref()) {
                continue;
            }

            match field.name.as_str() {
                elements::NAME => person.name = field.value.clone(),
                elements::EMAIL => person.email = field.value.clone(),
                elements::URI => person.uri = field.value.clone(),
                _ => {}
            }
        }

        if person.name.as_deref().map_or(true, str::is_empty) {
            return Err(FeedError::format("Atom person has no name"));
        }

        Ok(person)
    }

    fn create_category(&self, content: &ContentNode) -> Result<Category> {
        let term = atom_attribute(content, attributes::TERM)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FeedError::format("Invalid Atom category term"))?;

        Ok(Category {
            name: term.to_string(),
            scheme: atom_attribute(content, attributes::SCHEME).map(str::to_string),
            label: atom_attribute(content, attributes::LABEL).map(str::to_string),
        })
    }

    fn create_image(&self, content: &ContentNode) -> Result<Image> {
        Ok(Image {
            relationship_type: Some(content.name.clone()),
            ..Image::new(required_uri(content.value.as_deref(), "image")?)
        })
    }

    fn parse_item(&self, xml: &str) -> Result<Item> {
        let content = self.parse_content(xml)?;
        expect_element(&content, &[elements::ENTRY], "entry")?;
        self.create_item(&content)
    }

    fn parse_link(&self, xml: &str) -> Result<Link> {
        let content = self.parse_content(xml)?;
        expect_element(
            &content,
            &[elements::LINK, elements::CONTENT, elements::SOURCE],
            "link",
        )?;
        self.create_link(&content)
    }

    fn parse_person(&self, xml: &str) -> Result<Person> {
        let content = self.parse_content(xml)?;
        expect_element(
            &content,
            &[contributor_types::AUTHOR, contributor_types::CONTRIBUTOR],
            "person",
        )?;
        self.create_person(&content)
    }

    fn parse_category(&self, xml: &str) -> Result<Category> {
        let content = self.parse_content(xml)?;
        expect_element(&content, &[elements::CATEGORY], "category")?;
        self.create_category(&content)
    }

    fn parse_image(&self, xml: &str) -> Result<Image> {
        let content = self.parse_content(xml)?;
        expect_element(&content, &[image_types::ICON, image_types::LOGO], "image")?;
        self.create_image(&content)
    }
}
