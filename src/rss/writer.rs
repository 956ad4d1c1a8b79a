//! Thin RSS 2.0 document writer around a pluggable [`FeedFormatter`].

use chrono::{DateTime, FixedOffset, Weekday};
use url::Url;

use crate::codec::FeedFormatter;
use crate::config::WriterConfig;
use crate::content::{Attribute, ContentNode};
use crate::error::{FeedError, Result};
use crate::model::{Category, Image, Item, Link, Person};
use crate::value::format_rfc1123;
use crate::xml::XmlEmitter;

use super::formatter::RssFormatter;
use super::names::{attributes, elements, VERSION};

/// Writes an `<rss version="2.0"><channel>` document element by element.
///
/// Namespace declarations from the [`WriterConfig`] are written on the
/// `<rss>` root, so formatted children can use their prefixes directly.
pub struct RssFeedWriter<F: FeedFormatter = RssFormatter> {
    emitter: XmlEmitter,
    formatter: F,
    items: usize,
}

impl RssFeedWriter<RssFormatter> {
    pub fn new(config: &WriterConfig) -> Result<Self> {
        Self::with_formatter(config, RssFormatter::with_config(config))
    }
}

impl<F: FeedFormatter> RssFeedWriter<F> {
    /// Starts a document whose entities are built by `formatter`.
    pub fn with_formatter(config: &WriterConfig, formatter: F) -> Result<Self> {
        let mut emitter = XmlEmitter::new(config.indent);
        emitter.write_declaration()?;
        emitter.start_element(None, elements::RSS, None)?;
        for attr in config.known_attributes() {
            emitter.write_content_attribute(&attr)?;
        }
        emitter.write_content_attribute(&Attribute::new(attributes::VERSION, VERSION))?;
        emitter.start_element(None, elements::CHANNEL, None)?;

        Ok(Self {
            emitter,
            formatter,
            items: 0,
        })
    }

    /// Writes an arbitrary content tree inside `<channel>` through the
    /// writer's formatter.
    pub fn write_content(&mut self, content: &ContentNode) -> Result<()> {
        self.formatter.write_content(&mut self.emitter, content)
    }

    pub fn write_item(&mut self, item: &Item) -> Result<()> {
        let content = self.formatter.create_item(item)?;
        self.write_content(&content)?;
        self.items += 1;
        Ok(())
    }

    pub fn write_link(&mut self, link: &Link) -> Result<()> {
        let content = self.formatter.create_link(link)?;
        self.write_content(&content)
    }

    pub fn write_person(&mut self, person: &Person) -> Result<()> {
        let content = self.formatter.create_person(person)?;
        self.write_content(&content)
    }

    pub fn write_category(&mut self, category: &Category) -> Result<()> {
        let content = self.formatter.create_category(category)?;
        self.write_content(&content)
    }

    pub fn write_image(&mut self, image: &Image) -> Result<()> {
        let content = self.formatter.create_image(image)?;
        self.write_content(&content)
    }

    /// Writes `<name>value</name>`.
    pub fn write_value(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() {
            return Err(FeedError::RequiredValue("name"));
        }
        self.write_content(&ContentNode::leaf(name, value))
    }

    pub fn write_title(&mut self, title: &str) -> Result<()> {
        self.write_value(elements::TITLE, title)
    }

    pub fn write_description(&mut self, description: &str) -> Result<()> {
        self.write_value(elements::DESCRIPTION, description)
    }

    pub fn write_pub_date(&mut self, dt: &DateTime<FixedOffset>) -> Result<()> {
        self.write_value(elements::PUB_DATE, &format_rfc1123(dt))
    }

    pub fn write_last_build_date(&mut self, dt: &DateTime<FixedOffset>) -> Result<()> {
        self.write_value(elements::LAST_BUILD_DATE, &format_rfc1123(dt))
    }

    /// Writes `<cloud domain port path registerProcedure protocol/>`.
    ///
    /// Domain, port and path come from `uri`; the port falls back to the
    /// scheme's default.
    pub fn write_cloud(&mut self, uri: &Url, register_procedure: &str, protocol: &str) -> Result<()> {
        let domain = uri.host_str().ok_or(FeedError::RequiredValue("domain"))?;
        let port = uri
            .port_or_known_default()
            .ok_or(FeedError::RequiredValue("port"))?;
        if register_procedure.is_empty() {
            return Err(FeedError::RequiredValue("registerProcedure"));
        }
        if protocol.is_empty() {
            return Err(FeedError::RequiredValue("protocol"));
        }

        let mut cloud = ContentNode::new(elements::CLOUD);
        cloud.add_attribute(Attribute::new(attributes::DOMAIN, domain));
        cloud.add_attribute(Attribute::new(attributes::PORT, port.to_string()));
        cloud.add_attribute(Attribute::new(attributes::PATH, uri.path()));
        cloud.add_attribute(Attribute::new(attributes::REGISTER_PROCEDURE, register_procedure));
        cloud.add_attribute(Attribute::new(attributes::PROTOCOL, protocol));
        self.write_content(&cloud)
    }

    pub fn write_skip_days(&mut self, days: &[Weekday]) -> Result<()> {
        if days.is_empty() {
            return Err(FeedError::RequiredValue("days"));
        }

        let mut skip = ContentNode::new(elements::SKIP_DAYS);
        for day in days {
            skip.add_field(ContentNode::leaf(elements::DAY, weekday_name(*day)));
        }
        self.write_content(&skip)
    }

    /// Writes `<skipHours>`; every hour must be within `0..=23`.
    pub fn write_skip_hours(&mut self, hours: &[u8]) -> Result<()> {
        if hours.is_empty() {
            return Err(FeedError::RequiredValue("hours"));
        }

        let mut skip = ContentNode::new(elements::SKIP_HOURS);
        for hour in hours {
            if *hour > 23 {
                return Err(FeedError::argument(format!("Hour value {hour} is out of range 0-23")));
            }
            skip.add_field(ContentNode::leaf(elements::HOUR, hour.to_string()));
        }
        self.write_content(&skip)
    }

    /// Closes `<channel>` and `<rss>` and returns the document.
    pub fn finish(mut self) -> Result<String> {
        self.emitter.end_element()?;
        self.emitter.end_element()?;
        tracing::debug!(items = self.items, "Finished RSS document");
        self.emitter.into_string()
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
