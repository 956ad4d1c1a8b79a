use crate::codec::FeedFormatter;
use crate::config::WriterConfig;
use crate::content::{Attribute, ContentNode};
use crate::error::{FeedError, Result};
use crate::model::{non_empty, Category, Image, Item, Link, Person};
use crate::value::format_rfc1123;
use crate::xml::XmlEmitter;

use super::names::{attributes, contributor_types, elements, link_types, RSS20_NAMESPACE};

/// Builds RSS 2.0 content trees from feed entities and serializes them.
#[derive(Debug, Clone, Default)]
pub struct RssFormatter {
    known_attributes: Vec<Attribute>,
    use_cdata: bool,
    indent: Option<usize>,
}

impl RssFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &WriterConfig) -> Self {
        Self {
            known_attributes: config.known_attributes(),
            use_cdata: config.use_cdata,
            indent: config.indent,
        }
    }

    fn create_link_element(&self, name: &str, link: &Link, uri: &str) -> ContentNode {
        let mut result = ContentNode::new(name);

        match non_empty(&link.title) {
            Some(title) => {
                result.value = Some(title.to_string());
                result.add_attribute(Attribute::new(attributes::URL, uri));
            }
            None => result.value = Some(uri.to_string()),
        }

        if let Some(media_type) = non_empty(&link.media_type) {
            result.add_attribute(Attribute::new(attributes::TYPE, media_type));
        }

        if link.length != 0 {
            result.add_attribute(Attribute::new(attributes::LENGTH, link.length.to_string()));
        }

        result
    }

    fn create_enclosure(&self, link: &Link, uri: &str) -> Result<ContentNode> {
        let media_type = non_empty(&link.media_type).ok_or(FeedError::RequiredValue("MediaType"))?;

        let mut result = ContentNode::new(elements::ENCLOSURE);
        result.add_attribute(Attribute::new(attributes::URL, uri));
        result.add_attribute(Attribute::new(attributes::LENGTH, link.length.to_string()));
        result.add_attribute(Attribute::new(attributes::TYPE, media_type));
        Ok(result)
    }

    fn create_source(&self, link: &Link, uri: &str) -> ContentNode {
        let mut result = ContentNode::leaf(elements::SOURCE, non_empty(&link.title).unwrap_or(uri));
        result.add_attribute(Attribute::new(attributes::URL, uri));
        result
    }
}

impl FeedFormatter for RssFormatter {
    fn create_link(&self, link: &Link) -> Result<ContentNode> {
        let uri = link
            .uri
            .as_ref()
            .ok_or(FeedError::RequiredValue("Uri"))?
            .to_string();

        match link.rel() {
            None | Some(link_types::ALTERNATE) => {
                Ok(self.create_link_element(elements::LINK, link, &uri))
            }
            Some(link_types::ENCLOSURE) => self.create_enclosure(link, &uri),
            Some(link_types::SOURCE) => Ok(self.create_source(link, &uri)),
            Some(rel @ (link_types::COMMENTS | link_types::GUID)) => {
                Ok(ContentNode::leaf(rel, uri))
            }
            Some(other) => Ok(self.create_link_element(other, link, &uri)),
        }
    }

    fn create_person(&self, person: &Person) -> Result<ContentNode> {
        let email = non_empty(&person.email).ok_or(FeedError::RequiredValue("Email"))?;

        let text = match non_empty(&person.name) {
            Some(name) => format!("{email} ({name})"),
            None => email.to_string(),
        };

        let element = non_empty(&person.relationship_type).unwrap_or(contributor_types::AUTHOR);
        Ok(ContentNode::leaf(element, text))
    }

    fn create_category(&self, category: &Category) -> Result<ContentNode> {
        if category.name.is_empty() {
            return Err(FeedError::RequiredValue("Name"));
        }

        let mut result = ContentNode::leaf(elements::CATEGORY, category.name.clone());
        if let Some(scheme) = non_empty(&category.scheme) {
            result.add_attribute(Attribute::new(attributes::DOMAIN, scheme));
        }
        Ok(result)
    }

    fn create_image(&self, image: &Image) -> Result<ContentNode> {
        let url = image.url.as_ref().ok_or(FeedError::RequiredValue("Url"))?;

        let mut result = ContentNode::new(elements::IMAGE);
        result.add_field(ContentNode::leaf(elements::URL, url.to_string()));

        if let Some(title) = non_empty(&image.title) {
            result.add_field(ContentNode::leaf(elements::TITLE, title));
        }

        if let Some(uri) = image.link.as_ref().and_then(|l| l.uri.as_ref()) {
            result.add_field(ContentNode::leaf(elements::LINK, uri.to_string()));
        }

        if let Some(description) = non_empty(&image.description) {
            result.add_field(ContentNode::leaf(elements::DESCRIPTION, description));
        }

        Ok(result)
    }

    fn create_item(&self, item: &Item) -> Result<ContentNode> {
        if non_empty(&item.title).is_none() && non_empty(&item.description).is_none() {
            return Err(FeedError::format(
                "RSS item requires a title or a description",
            ));
        }

        let mut result = ContentNode::new(elements::ITEM);

        if let Some(title) = non_empty(&item.title) {
            result.add_field(ContentNode::leaf(elements::TITLE, title));
        }

        let mut guid_link = None;
        for link in &item.links {
            if link.rel() == Some(link_types::GUID) {
                guid_link = link.uri.as_ref();
                continue;
            }
            result.add_field(self.create_link(link)?);
        }

        match (non_empty(&item.id), guid_link) {
            (Some(id), link) => {
                let mut guid = ContentNode::leaf(elements::GUID, id);
                if link.map_or(true, |uri| uri.as_str() != id) {
                    guid.add_attribute(Attribute::new(attributes::IS_PERMA_LINK, "false"));
                }
                result.add_field(guid);
            }
            (None, Some(uri)) => {
                result.add_field(ContentNode::leaf(elements::GUID, uri.to_string()));
            }
            (None, None) => {}
        }

        if let Some(description) = non_empty(&item.description) {
            result.add_field(ContentNode::leaf(elements::DESCRIPTION, description));
        }

        for person in &item.contributors {
            result.add_field(self.create_person(person)?);
        }

        for category in &item.categories {
            result.add_field(self.create_category(category)?);
        }

        if let Some(published) = &item.published {
            result.add_field(ContentNode::leaf(elements::PUB_DATE, format_rfc1123(published)));
        }

        Ok(result)
    }

    /// Serializes `content` into an open emitter, children first-to-last.
    fn write_content(&self, emitter: &mut XmlEmitter, content: &ContentNode) -> Result<()> {
        emitter.write_start_content(content, RSS20_NAMESPACE)?;

        for attr in &content.attributes {
            emitter.write_content_attribute(attr)?;
        }

        match &content.value {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FeedParser;
    use crate::rss::RssParser;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_format_person() {
        let out = RssFormatter::new()
            .format_person(&Person::new("John Doe", "author@email.com"))
            .unwrap();
        assert_eq!(out, "<author>author@email.com (John Doe)</author>");

        let out = RssFormatter::new()
            .format_person(&Person::with_type(
                "John Smith",
                "mEditor@email.com",
                contributor_types::MANAGING_EDITOR,
            ))
            .unwrap();
        assert_eq!(out, "<managingEditor>mEditor@email.com (John Smith)</managingEditor>");
    }

    #[test]
    fn test_format_person_requires_email() {
        let person = Person {
            name: Some("No Mail".to_string()),
            ..Person::default()
        };
        let err = RssFormatter::new().format_person(&person).unwrap_err();
        assert!(matches!(err, FeedError::RequiredValue("Email")));
    }

    #[test]
    fn test_format_link_only_url() {
        let out = RssFormatter::new()
            .format_link(&Link::new(url("http://testuriforlink.com")))
            .unwrap();
        assert_eq!(out, "<link>http://testuriforlink.com/</link>");

        let parsed = RssParser.parse_link(&out).unwrap();
        assert!(parsed.title.is_none());
    }

    #[test]
    fn test_format_link_all_elements() {
        let link = Link {
            title: Some("Test title".to_string()),
            length: 123,
            media_type: Some("mp3/video".to_string()),
            ..Link::new(url("http://testuriforlink.com"))
        };
        let out = RssFormatter::new().format_link(&link).unwrap();
        assert_eq!(
            out,
            r#"<link url="http://testuriforlink.com/" type="mp3/video" length="123">Test title</link>"#
        );
    }

    #[test]
    fn test_format_category() {
        let category = Category {
            scheme: Some("http://x/".to_string()),
            ..Category::new("Tech")
        };
        let out = RssFormatter::new().format_category(&category).unwrap();
        assert_eq!(out, r#"<category domain="http://x/">Tech</category>"#);

        let parsed = RssParser.parse_category(&out).unwrap();
        assert_eq!(parsed.scheme.as_deref(), Some("http://x/"));
    }

    #[test]
    fn test_format_image() {
        let uri = url("http://testuriforlink.com");
        let image = Image {
            title: Some("Testing image title".to_string()),
            description: Some("testing image description".to_string()),
            link: Some(Link::new(uri.clone())),
            ..Image::new(uri)
        };
        let out = RssFormatter::new().format_image(&image).unwrap();
        assert_eq!(
            out,
            "<image><url>http://testuriforlink.com/</url><title>Testing image title</title>\
             <link>http://testuriforlink.com/</link><description>testing image description</description></image>"
        );
    }

    #[test]
    fn test_format_item() {
        let base = url("https://contoso.com/");
        let id = "https://contoso.com/28af09b3-86c7-4dd6-b56f-58aaa17cff62";
        let mut item = Item {
            id: Some(id.to_string()),
            title: Some("First item on ItemWriter".to_string()),
            description: Some("Brief description of an item".to_string()),
            published: Some(DateTime::parse_from_rfc3339("2017-07-06T20:25:00Z").unwrap()),
            ..Item::default()
        };
        item.add_link(Link::new(base.clone()));
        item.add_link(Link {
            title: Some("https://contoso.com/".to_string()),
            length: 4123,
            media_type: Some("audio/mpeg".to_string()),
            ..Link::with_type(base.clone(), link_types::ENCLOSURE)
        });
        item.add_link(Link::with_type(base.clone(), link_types::COMMENTS));
        item.add_link(Link {
            title: Some("Anonymous Blog".to_string()),
            ..Link::with_type(base.clone(), link_types::SOURCE)
        });
        item.add_link(Link::with_type(url(id), link_types::GUID));
        item.add_contributor(Person::new("John Doe", "person@email.com"));
        item.add_category(Category::new("Test Category"));

        let out = RssFormatter::new().format_item(&item).unwrap();
        assert_eq!(
            out,
            "<item><title>First item on ItemWriter</title>\
             <link>https://contoso.com/</link>\
             <enclosure url=\"https://contoso.com/\" length=\"4123\" type=\"audio/mpeg\"/>\
             <comments>https://contoso.com/</comments>\
             <source url=\"https://contoso.com/\">Anonymous Blog</source>\
             <guid>https://contoso.com/28af09b3-86c7-4dd6-b56f-58aaa17cff62</guid>\
             <description>Brief description of an item</description>\
             <author>person@email.com (John Doe)</author>\
             <category>Test Category</category>\
             <pubDate>Thu, 06 Jul 2017 20:25:00 GMT</pubDate></item>"
        );
    }

    #[test]
    fn test_guid_not_matching_a_link_is_not_permalink() {
        let item = Item {
            id: Some("tag:contoso,2017:1".to_string()),
            title: Some("t".to_string()),
            ..Item::default()
        };
        let out = RssFormatter::new().format_item(&item).unwrap();
        assert!(out.contains(r#"<guid isPermaLink="false">tag:contoso,2017:1</guid>"#));

        let parsed = RssParser.parse_item(&out).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("tag:contoso,2017:1"));
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_item_requires_title_or_description() {
        let err = RssFormatter::new().format_item(&Item::default()).unwrap_err();
        assert!(matches!(err, FeedError::Format(_)));
    }

    #[test]
    fn test_namespaced_field_uses_known_prefix() {
        let config = WriterConfig::default().with_namespace("ex", "uri");
        let formatter = RssFormatter::with_config(&config);

        let mut content = ContentNode::new("item");
        content.add_field(ContentNode::with_namespace(
            "ex:tag",
            Some("uri".to_string()),
            Some("value".to_string()),
        ));
        let out = formatter.format(&content).unwrap();
        assert_eq!(out, "<item><ex:tag>value</ex:tag></item>");
    }

    #[test]
    fn test_cdata_values() {
        let config = WriterConfig {
            use_cdata: true,
            ..WriterConfig::default()
        };
        let out = RssFormatter::with_config(&config)
            .format(&ContentNode::leaf("title", "<h1>HTML Title</h1>"))
            .unwrap();
        assert_eq!(out, "<title><![CDATA[<h1>HTML Title</h1>]]></title>");
    }
}
