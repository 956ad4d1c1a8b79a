//! RSS → Atom conversion of single items.

use chrono::{DateTime, FixedOffset, Utc};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

use crate::atom::names::{contributor_types, link_types as atom_link_types};
use crate::atom::AtomFormatter;
use crate::codec::{FeedFormatter, FeedParser};
use crate::config::WriterConfig;
use crate::error::Result;
use crate::model::{non_empty, AtomExtension, Item, Link, Person};
use crate::rss::names::link_types as rss_link_types;
use crate::rss::RssParser;
use crate::value::format_rfc3339;

const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Atom media type of an RSS `<description>`, which carries escaped HTML.
const RSS_DESCRIPTION_TYPE: &str = "html";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// Document exceeded the 10MB size limit
    #[error("Document too large: {0} bytes")]
    TooLarge(u64),
}

/// Reads a feed document, refusing files over 10MB.
pub async fn read_document(path: &Path) -> std::result::Result<String, DocumentError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_DOCUMENT_SIZE {
        return Err(DocumentError::TooLarge(meta.len()));
    }
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Stable identifier for an item: its own id when present, otherwise a
/// SHA-256 over link, title and publication date.
pub fn generate_guid(
    existing: Option<&str>,
    url: Option<&str>,
    title: &str,
    published: Option<&DateTime<FixedOffset>>,
) -> String {
    if let Some(guid) = existing {
        let trimmed = guid.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}",
        url.unwrap_or(""),
        title,
        published.map(format_rfc3339).unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("urn:sha256:{:x}", hash)
}

/// Rewrites an item parsed from RSS so that it satisfies Atom's entry rules.
///
/// * a missing id is synthesized with [`generate_guid`]
/// * a missing title becomes `Untitled`
/// * `updated` falls back to `pubDate`, then to `now`
/// * guid links are dropped, or kept as the alternate link when there is none
/// * editors without a name are named after their email
pub fn rss_item_to_atom(mut item: Item, now: DateTime<FixedOffset>) -> Item {
    let alternate = item
        .links
        .iter()
        .find(|l| matches!(l.rel(), None | Some(rss_link_types::ALTERNATE)))
        .and_then(|l| l.uri.as_ref())
        .map(|u| u.to_string());

    let title = non_empty(&item.title).unwrap_or("Untitled").to_string();
    item.id = Some(generate_guid(
        item.id.as_deref(),
        alternate.as_deref(),
        &title,
        item.published.as_ref(),
    ));
    item.title = Some(title);
    item.last_updated = item.last_updated.or(item.published).or(Some(now));

    let mut links = Vec::with_capacity(item.links.len());
    for link in std::mem::take(&mut item.links) {
        if link.rel() == Some(rss_link_types::GUID) {
            if alternate.is_none() {
                links.push(Link {
                    relationship_type: Some(atom_link_types::ALTERNATE.to_string()),
                    ..link
                });
            }
            continue;
        }
        links.push(link);
    }
    item.links = links;

    item.contributors = std::mem::take(&mut item.contributors)
        .into_iter()
        .map(atom_person)
        .collect();

    if non_empty(&item.description).is_some() && item.atom.is_none() {
        item.atom = Some(AtomExtension {
            content_type: Some(RSS_DESCRIPTION_TYPE.to_string()),
            ..AtomExtension::default()
        });
    }

    item
}

fn atom_person(person: Person) -> Person {
    let relationship_type = match person.relationship_type.as_deref() {
        Some(contributor_types::CONTRIBUTOR) => contributor_types::CONTRIBUTOR,
        _ => contributor_types::AUTHOR,
    };
    Person {
        name: non_empty(&person.name)
            .or(non_empty(&person.email))
            .map(str::to_string),
        relationship_type: Some(relationship_type.to_string()),
        ..person
    }
}

/// Parses an RSS `<item>` and writes it as an Atom `<entry>`.
pub fn transcode_rss_item(xml: &str, config: &WriterConfig) -> Result<String> {
    let item = RssParser::new().parse_item(xml)?;
    let entry = rss_item_to_atom(item, Utc::now().into());
    tracing::debug!(id = ?entry.id, links = entry.links.len(), "Transcoded RSS item");
    AtomFormatter::with_config(config).format_item(&entry)
}
