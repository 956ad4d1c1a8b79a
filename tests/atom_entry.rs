//! Integration tests for Atom entries: formatting rules, round trips through
//! the Atom parser, and conformance of the output as judged by `feed-rs`.

use chrono::DateTime;
use pretty_assertions::assert_eq;
use url::Url;

use feedcodec::atom::names::{link_types, ATOM10_NAMESPACE};
use feedcodec::atom::{AtomFormatter, AtomParser};
use feedcodec::model::{AtomExtension, Category, Item, Link, Person};
use feedcodec::transcode::transcode_rss_item;
use feedcodec::{FeedError, FeedFormatter, WriterConfig};

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn entry() -> Item {
    let mut item = Item {
        id: Some("urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6".to_string()),
        title: Some("Atom-Powered Robots Run Amok".to_string()),
        description: Some("Some text.".to_string()),
        published: Some(DateTime::parse_from_rfc3339("2003-12-13T08:29:29-04:00").unwrap()),
        last_updated: Some(DateTime::parse_from_rfc3339("2003-12-13T18:30:02Z").unwrap()),
        atom: Some(AtomExtension {
            summary: Some("Robots".to_string()),
            rights: Some("Copyright (c) 2003".to_string()),
            content_type: None,
        }),
        ..Item::default()
    };
    item.add_link(Link::with_type(
        url("http://example.org/2003/12/13/atom03"),
        link_types::ALTERNATE,
    ));
    item.add_contributor(Person::with_type("John Doe", "johndoe@example.com", "author"));
    item.add_category(Category {
        scheme: Some("http://example.org/cats".to_string()),
        label: Some("Robots".to_string()),
        ..Category::new("robots")
    });
    item
}

/// Embeds an entry fragment in a minimal Atom feed document.
fn feed_document(entry: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><feed xmlns="{ATOM10_NAMESPACE}"><id>urn:feed</id><title>Example Feed</title><updated>2003-12-13T18:30:02Z</updated>{entry}</feed>"#
    )
}

#[test]
fn test_entry_roundtrip() {
    let item = entry();
    let xml = AtomFormatter::new().format_item(&item).unwrap();
    let parsed = AtomParser::new().parse_entry(&xml).unwrap();
    assert_eq!(parsed, item);
}

#[test]
fn test_entry_is_readable_by_feed_rs() {
    let xml = AtomFormatter::new().format_item(&entry()).unwrap();
    let feed = feed_rs::parser::parse(feed_document(&xml).as_bytes()).unwrap();

    assert_eq!(feed.entries.len(), 1);
    let parsed = &feed.entries[0];
    assert_eq!(parsed.id, "urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6");
    assert_eq!(
        parsed.title.as_ref().map(|t| t.content.as_str()),
        Some("Atom-Powered Robots Run Amok")
    );
    assert_eq!(parsed.links[0].href, "http://example.org/2003/12/13/atom03");
    assert_eq!(parsed.authors[0].name, "John Doe");
    assert_eq!(parsed.categories[0].term, "robots");
    assert_eq!(
        parsed.updated.map(|d| d.to_rfc3339()),
        Some("2003-12-13T18:30:02+00:00".to_string())
    );
    assert!(parsed.content.is_some());
}

#[test]
fn test_prefixed_entry_is_readable_by_feed_rs() {
    let config = WriterConfig::default().with_namespace("atom", ATOM10_NAMESPACE);
    let xml = AtomFormatter::with_config(&config)
        .format_item(&entry())
        .unwrap();
    assert!(xml.starts_with("<atom:entry><atom:id>"));

    let document = format!(
        r#"<feed xmlns="{ns}" xmlns:atom="{ns}"><id>urn:feed</id><title>t</title><updated>2003-12-13T18:30:02Z</updated>{xml}</feed>"#,
        ns = ATOM10_NAMESPACE
    );
    let feed = feed_rs::parser::parse(document.as_bytes()).unwrap();
    assert_eq!(feed.entries.len(), 1);
}

#[test]
fn test_description_and_content_link_are_exclusive() {
    let mut item = entry();
    item.add_link(Link::with_type(url("http://example.org/c"), link_types::CONTENT));

    let err = AtomFormatter::new().format_item(&item).unwrap_err();
    assert!(matches!(err, FeedError::Format(_)));
}

#[test]
fn test_entry_without_any_content_is_rejected() {
    let item = Item {
        description: None,
        links: Vec::new(),
        ..entry()
    };
    let err = AtomFormatter::new().format_item(&item).unwrap_err();
    assert!(matches!(err, FeedError::Format(_) | FeedError::RequiredValue(_)));
}

#[test]
fn test_two_content_links_are_rejected() {
    let mut item = Item {
        description: None,
        links: Vec::new(),
        ..entry()
    };
    item.add_link(Link::with_type(url("http://example.org/c1"), link_types::CONTENT));
    item.add_link(Link::with_type(url("http://example.org/c2"), link_types::CONTENT));

    let err = AtomFormatter::new().format_item(&item).unwrap_err();
    assert!(matches!(err, FeedError::Format(_)));
}

#[test]
fn test_xhtml_content_parses_back_as_markup() {
    let item = Item {
        description: Some("<p>Rich <em>text</em></p>".to_string()),
        atom: Some(AtomExtension {
            content_type: Some("xhtml".to_string()),
            ..AtomExtension::default()
        }),
        ..entry()
    };
    let xml = AtomFormatter::new().format_item(&item).unwrap();
    assert!(xml.contains(
        r#"<content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Rich <em>text</em></p></div></content>"#
    ));

    let parsed = AtomParser::new().parse_entry(&xml).unwrap();
    assert_eq!(parsed.description, item.description);
    assert_eq!(
        parsed.atom.and_then(|a| a.content_type).as_deref(),
        Some("xhtml")
    );

    let feed = feed_rs::parser::parse(feed_document(&xml).as_bytes()).unwrap();
    assert_eq!(feed.entries.len(), 1);
}

#[test]
fn test_rss_item_transcodes_to_valid_atom() {
    let rss = r#"<item>
        <title>Star City</title>
        <link>http://liftoff.msfc.nasa.gov/news/2003/news-starcity.asp</link>
        <description>How do Americans get ready to work with Russians aboard the International Space Station?</description>
        <pubDate>Tue, 03 Jun 2003 09:39:21 GMT</pubDate>
        <guid>http://liftoff.msfc.nasa.gov/2003/06/03.html#item573</guid>
    </item>"#;

    let xml = transcode_rss_item(rss, &WriterConfig::default()).unwrap();
    let item = AtomParser::new().parse_entry(&xml).unwrap();
    assert_eq!(
        item.id.as_deref(),
        Some("http://liftoff.msfc.nasa.gov/2003/06/03.html#item573")
    );
    assert_eq!(item.last_updated, item.published);

    let feed = feed_rs::parser::parse(feed_document(&xml).as_bytes()).unwrap();
    let parsed = &feed.entries[0];
    assert_eq!(parsed.id, "http://liftoff.msfc.nasa.gov/2003/06/03.html#item573");
    assert_eq!(
        parsed.links[0].href,
        "http://liftoff.msfc.nasa.gov/news/2003/news-starcity.asp"
    );
}
