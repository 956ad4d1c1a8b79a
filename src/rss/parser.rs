use crate::codec::FeedParser;
use crate::content::ContentNode;
use crate::error::{FeedError, Result};
use crate::model::{Category, Image, Item, Link, Person};
use crate::value::{try_parse_bool, try_parse_datetime, try_parse_u64, try_parse_uri};

use super::names::{attributes, contributor_types, elements, is_rss_namespace, link_types};

/// Projects RSS 2.0 content trees onto feed entities.
///
/// Elements outside the RSS namespace are skipped, so extension elements
/// (e.g. `a10:updated`) pass through without being consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssParser;

impl RssParser {
    pub fn new() -> Self {
        Self
    }
}

/// Value of an RSS attribute: matching name, no namespace.
fn rss_attribute<'a>(content: &'a ContentNode, name: &str) -> Option<&'a str> {
    content.find_attribute(name, is_rss_namespace)
}

fn expect_element(content: &ContentNode, names: &[&str], what: &str) -> Result<()> {
    if names.contains(&content.name.as_str()) && is_rss_namespace(content.namespace.as_deref()) {
        Ok(())
    } else {
        Err(FeedError::format(format!("Invalid Rss {what}")))
    }
}

/// `isPermaLink` absent or `true` allows the guid to double as a link.
/// A present but unparsable value counts as `false`.
fn guid_is_permalink(guid: &ContentNode) -> bool {
    match rss_attribute(guid, attributes::IS_PERMA_LINK) {
        None => true,
        Some(v) => try_parse_bool(v).unwrap_or(false),
    }
}

impl FeedParser for RssParser {
    fn create_item(&self, content: &ContentNode) -> Result<Item> {
        let mut item = Item::default();

        for field in &content.fields {
            if !is_rss_namespace(field.namespace.as_deref()) {
                continue;
            }

            match field.name.as_str() {
                elements::TITLE => item.title = field.value.clone(),
                elements::DESCRIPTION => item.description = field.value.clone(),
                elements::AUTHOR => item.add_contributor(self.create_person(field)?),
                elements::CATEGORY => item.add_category(self.create_category(field)?),
                elements::LINK | elements::COMMENTS | elements::ENCLOSURE | elements::SOURCE => {
                    item.add_link(self.create_link(field)?)
                }
                elements::GUID => {
                    item.id = field.value.clone();

                    let permalink = field
                        .value
                        .as_deref()
                        .filter(|_| guid_is_permalink(field))
                        .and_then(try_parse_uri);
                    if let Some(uri) = permalink {
                        item.add_link(Link::with_type(uri, link_types::GUID));
                    }
                }
                elements::PUB_DATE => {
                    // Best effort: an unparsable date leaves the field unset
                    if let Some(dt) = field.value.as_deref().and_then(try_parse_datetime) {
                        item.published = Some(dt);
                    }
                }
                _ => {}
            }
        }

        Ok(item)
    }

    fn create_link(&self, content: &ContentNode) -> Result<Link> {
        let (uri, title) = match rss_attribute(content, attributes::URL) {
            Some(url) => {
                let uri = try_parse_uri(url)
                    .ok_or_else(|| FeedError::format(format!("Invalid url attribute '{url}'")))?;
                (uri, content.value.clone())
            }
            None => {
                let uri = content
                    .value
                    .as_deref()
                    .and_then(try_parse_uri)
                    .ok_or_else(|| FeedError::format("Invalid url"))?;
                (uri, None)
            }
        };

        let length = rss_attribute(content, attributes::LENGTH)
            .and_then(try_parse_u64)
            .unwrap_or(0);

        let relationship_type = if content.name == elements::LINK {
            link_types::ALTERNATE
        } else {
            content.name.as_str()
        };

        Ok(Link {
            title,
            length,
            media_type: rss_attribute(content, attributes::TYPE).map(str::to_string),
            ..Link::with_type(uri, relationship_type)
        })
    }

    fn create_person(&self, content: &ContentNode) -> Result<Person> {
        let text = content
            .value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(FeedError::RequiredValue("person"))?;

        // <author>abc@def.com (John Doe)</author>
        let (email, name) = match text.find('(') {
            Some(open) => match text.find(')') {
                Some(close) if close > open => (
                    text[..open].trim().to_string(),
                    Some(text[open + 1..close].to_string()),
                ),
                _ => return Err(FeedError::format("Invalid Rss person")),
            },
            None => (text.to_string(), None),
        };

        Ok(Person {
            name,
            email: Some(email),
            uri: None,
            relationship_type: Some(content.name.clone()),
        })
    }

    fn create_category(&self, content: &ContentNode) -> Result<Category> {
        let name = content
            .value
            .clone()
            .ok_or_else(|| FeedError::format("Invalid Rss category name"))?;

        Ok(Category {
            name,
            scheme: rss_attribute(content, attributes::DOMAIN).map(str::to_string),
            label: None,
        })
    }

    fn create_image(&self, content: &ContentNode) -> Result<Image> {
        let mut image = Image {
            relationship_type: Some(elements::IMAGE.to_string()),
            ..Image::default()
        };

        for field in &content.fields {
            if !is_rss_namespace(field.namespace.as_deref()) {
                continue;
            }

            match field.name.as_str() {
                elements::TITLE => image.title = field.value.clone(),
                elements::DESCRIPTION => image.description = field.value.clone(),
                elements::LINK => image.link = Some(self.create_link(field)?),
                elements::URL => {
                    let raw = field.value.as_deref().unwrap_or_default();
                    let url = try_parse_uri(raw)
                        .ok_or_else(|| FeedError::format(format!("Invalid image url '{raw}'")))?;
                    image.url = Some(url);
                }
                _ => {}
            }
        }

        if image.url.is_none() {
            return Err(FeedError::format("Image url not found"));
        }

        Ok(image)
    }

    fn parse_item(&self, xml: &str) -> Result<Item> {
        let content = self.parse_content(xml)?;
        expect_element(&content, &[elements::ITEM], "item")?;
        self.create_item(&content)
    }

    fn parse_link(&self, xml: &str) -> Result<Link> {
        let content = self.parse_content(xml)?;
        expect_element(&content, &[elements::LINK], "link")?;
        self.create_link(&content)
    }

    fn parse_person(&self, xml: &str) -> Result<Person> {
        let content = self.parse_content(xml)?;
        expect_element(
            &content,
            &[contributor_types::AUTHOR, contributor_types::MANAGING_EDITOR],
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
        expect_element(&content, &[elements::IMAGE], "image")?;
        self.create_image(&content)
    }
}
