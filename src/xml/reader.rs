//! Recursive-descent construction of content trees from `quick_xml::NsReader`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Reader, Writer};

use super::names::{is_xml_schema_type, split_name};
use crate::content::{Attribute, ContentNode};
use crate::error::{xml_err, FeedError, Result};

/// SEC-003: Maximum nesting depth accepted when building a content tree.
/// Prevents stack overflow from maliciously deep documents.
pub const MAX_CONTENT_DEPTH: usize = 64;

/// Local name whose inner markup is kept verbatim as the node value.
const BODY_ELEMENT: &str = "body";

/// Parses the first element of `xml` into a [`ContentNode`].
///
/// # Errors
///
/// * [`FeedError::RequiredValue`] if `xml` is empty
/// * [`FeedError::Format`] if the input holds no element
/// * [`FeedError::Xml`] for malformed or truncated XML
pub fn parse_content(xml: &str) -> Result<ContentNode> {
    parse_content_with(xml, &|_: &ContentNode| false)
}

/// Like [`parse_content`], but every element for which `keep_markup`
/// returns true (checked once its attributes are read) is treated like
/// `<body>`: its inner markup becomes the node value.
pub fn parse_content_with(
    xml: &str,
    keep_markup: &dyn Fn(&ContentNode) -> bool,
) -> Result<ContentNode> {
    if xml.trim().is_empty() {
        return Err(FeedError::RequiredValue("value"));
    }

    // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations; unknown
    // entity references fail in unescape instead of being resolved.
    let mut reader = NsReader::from_str(xml);
    let mut bindings = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                return read_node(&mut reader, e, false, 0, &mut bindings, keep_markup)
            }
            Event::Empty(e) => {
                return read_node(&mut reader, e, true, 0, &mut bindings, keep_markup)
            }
            Event::Eof => return Err(FeedError::format("No element found")),
            _ => {}
        }
    }
}

/// Reads the element that `reader` just produced as `start` (an `Empty`
/// event when `is_empty`), consuming everything up to its end tag.
pub fn read_content<'i>(
    reader: &mut NsReader<&'i [u8]>,
    start: BytesStart<'i>,
    is_empty: bool,
) -> Result<ContentNode> {
    read_node(reader, start, is_empty, 0, &mut Vec::new(), &|_: &ContentNode| false)
}

/// `bindings` holds the `(prefix, namespace)` declarations of every open
/// ancestor; the node's own declarations are popped again on return.
fn read_node<'i>(
    reader: &mut NsReader<&'i [u8]>,
    start: BytesStart<'i>,
    is_empty: bool,
    depth: usize,
    bindings: &mut Vec<(String, String)>,
    keep_markup: &dyn Fn(&ContentNode) -> bool,
) -> Result<ContentNode> {
    let scope = bindings.len();
    let node = read_scoped(reader, start, is_empty, depth, bindings, keep_markup);
    bindings.truncate(scope);
    node
}

fn read_scoped<'i>(
    reader: &mut NsReader<&'i [u8]>,
    start: BytesStart<'i>,
    is_empty: bool,
    depth: usize,
    bindings: &mut Vec<(String, String)>,
    keep_markup: &dyn Fn(&ContentNode) -> bool,
) -> Result<ContentNode> {
    // SEC-003: Reject excessively nested content
    if depth > MAX_CONTENT_DEPTH {
        return Err(FeedError::MaxDepthExceeded(MAX_CONTENT_DEPTH));
    }

    let decoder = reader.decoder();
    let (resolved, local) = reader.resolve_element(start.name());
    let namespace = resolved_namespace(resolved, |b| decoder.decode(b).map(|s| s.into_owned()))?;
    let name = decoder.decode(local.as_ref()).map_err(xml_err)?.into_owned();

    let mut node = ContentNode::with_namespace(name, namespace, None);

    for attr in start.attributes() {
        let attr = attr?;
        // Namespace declarations are scope metadata, not feed data
        if attr.key.as_namespace_binding().is_some() {
            let qname = decoder.decode(attr.key.as_ref()).map_err(xml_err)?;
            let prefix = qname.strip_prefix("xmlns:").unwrap_or("").to_string();
            let uri = attr.decode_and_unescape_value(decoder).map_err(xml_err)?;
            bindings.push((prefix, uri.into_owned()));
            continue;
        }
        let (attr_resolved, _) = reader.resolve_attribute(attr.key);
        let attr_ns =
            resolved_namespace(attr_resolved, |b| decoder.decode(b).map(|s| s.into_owned()))?;
        let qname = decoder.decode(attr.key.as_ref()).map_err(xml_err)?;
        if is_xml_schema_type(split_name(&qname).1, attr_ns.as_deref()) {
            continue;
        }
        let value = attr.decode_and_unescape_value(decoder).map_err(xml_err)?;
        node.add_attribute(Attribute {
            name: qname.into_owned(),
            namespace: attr_ns,
            value: value.into_owned(),
        });
    }

    if node.name == BODY_ELEMENT || keep_markup(&node) {
        let inner = if is_empty {
            String::new()
        } else {
            let raw = reader.read_text(start.name()).map_err(xml_err)?;
            redeclare_bindings(&raw, bindings)?
        };
        node.value = Some(inner);
        return Ok(node);
    }

    if is_empty {
        return Ok(node);
    }

    let mut text = String::new();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let field = read_node(reader, e, false, depth + 1, bindings, keep_markup)?;
                node.fields.push(field);
            }
            Event::Empty(e) => {
                let field = read_node(reader, e, true, depth + 1, bindings, keep_markup)?;
                node.fields.push(field);
            }
            Event::Text(t) => text.push_str(&t.unescape().map_err(xml_err)?),
            Event::CData(c) => text.push_str(&decoder.decode(&c).map_err(xml_err)?),
            Event::End(_) => break,
            Event::Eof => {
                return Err(FeedError::Xml(format!(
                    "Unexpected end of input inside <{}>",
                    node.name
                )))
            }
            _ => {}
        }
    }

    // Text interleaved with child elements is whitespace between fields
    if node.fields.is_empty() && !text.is_empty() {
        node.value = Some(text);
    }

    Ok(node)
}

/// Returns the inner markup of the first element in `fragment`, exactly as
/// written, or `None` when the fragment holds no element.
pub fn element_inner_markup(fragment: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(fragment);
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let inner = reader.read_text(e.name()).map_err(xml_err)?;
                return Ok(Some(inner.into_owned()));
            }
            Event::Empty(_) => return Ok(Some(String::new())),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Copies `markup` with the in-scope `bindings` declared on each of its
/// top-level elements, so the fragment keeps its namespaces when it is
/// read on its own. Declarations an element already carries are kept.
fn redeclare_bindings(markup: &str, bindings: &[(String, String)]) -> Result<String> {
    // Innermost declaration of each prefix; an undeclared default adds nothing
    let mut in_scope: Vec<(&str, &str)> = Vec::new();
    for (prefix, uri) in bindings {
        match in_scope.iter_mut().find(|(p, _)| *p == prefix.as_str()) {
            Some(slot) => slot.1 = uri.as_str(),
            None => in_scope.push((prefix.as_str(), uri.as_str())),
        }
    }
    in_scope.retain(|(_, uri)| !uri.is_empty());

    if in_scope.is_empty() {
        return Ok(markup.to_string());
    }

    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        let written = match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let e = if depth == 0 { declare_in(e, &in_scope)? } else { e };
                depth += 1;
                writer.write_event(Event::Start(e))
            }
            Event::Empty(e) if depth == 0 => {
                writer.write_event(Event::Empty(declare_in(e, &in_scope)?))
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))
            }
            Event::Eof => break,
            other => writer.write_event(other),
        };
        written.map_err(xml_err)?;
    }

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn declare_in<'a>(mut start: BytesStart<'a>, in_scope: &[(&str, &str)]) -> Result<BytesStart<'a>> {
    let mut declared = Vec::new();
    for attr in start.attributes() {
        declared.push(attr?.key.as_ref().to_vec());
    }

    for (prefix, uri) in in_scope {
        let name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        if !declared.iter().any(|d| d.as_slice() == name.as_bytes()) {
            start.push_attribute((name.as_str(), *uri));
        }
    }
    Ok(start)
}

fn resolved_namespace<E: std::fmt::Display>(
    resolved: ResolveResult<'_>,
    decode: impl Fn(&[u8]) -> std::result::Result<String, E>,
) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) if !ns.as_ref().is_empty() => {
            decode(ns.as_ref()).map(Some).map_err(xml_err)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_body_is_read_verbatim() {
        let node = parse_content("<body><b>hi</b></body>").unwrap();
        assert_eq!(node.name, "body");
        assert_eq!(node.value.as_deref(), Some("<b>hi</b>"));
        assert!(node.fields.is_empty());
    }

    #[test]
    fn test_body_keeps_ancestor_namespaces() {
        let node = parse_content(
            r#"<x xmlns:ex="urn:ex"><body><ex:i>v</ex:i> and <ex:j/></body></x>"#,
        )
        .unwrap();
        let body = node.field("body").unwrap();
        assert_eq!(
            body.value.as_deref(),
            Some(r#"<ex:i xmlns:ex="urn:ex">v</ex:i> and <ex:j xmlns:ex="urn:ex"/>"#)
        );

        let inner = parse_content(body.value.as_deref().unwrap()).unwrap();
        assert_eq!(inner.name, "i");
        assert_eq!(inner.namespace.as_deref(), Some("urn:ex"));
    }

    #[test]
    fn test_body_does_not_duplicate_own_declarations() {
        let node = parse_content(
            r#"<x xmlns="urn:outer" xmlns:ex="urn:ex"><body><ex:i xmlns:ex="urn:inner"><ex:k/></ex:i></body></x>"#,
        )
        .unwrap();
        let body = node.field("body").unwrap();
        assert_eq!(
            body.value.as_deref(),
            Some(r#"<ex:i xmlns:ex="urn:inner" xmlns="urn:outer"><ex:k/></ex:i>"#)
        );
    }

    #[test]
    fn test_selected_elements_keep_markup() {
        let node = parse_content_with(
            r#"<entry><summary type="xhtml"><p>a <b>b</b></p></summary><title><b>t</b></title></entry>"#,
            &|n: &ContentNode| n.find_attribute("type", |_| true) == Some("xhtml"),
        )
        .unwrap();

        let summary = node.field("summary").unwrap();
        assert_eq!(summary.value.as_deref(), Some("<p>a <b>b</b></p>"));
        assert!(summary.fields.is_empty());

        let title = node.field("title").unwrap();
        assert_eq!(title.value, None);
        assert_eq!(title.fields.len(), 1);
    }

    #[test]
    fn test_element_inner_markup() {
        assert_eq!(
            element_inner_markup(r#" <div xmlns="urn:x"><p>Rich <em>text</em></p></div> "#).unwrap(),
            Some("<p>Rich <em>text</em></p>".to_string())
        );
        assert_eq!(element_inner_markup("<div/>").unwrap(), Some(String::new()));
        assert_eq!(element_inner_markup("plain text").unwrap(), None);
    }

    #[test]
    fn test_leaf_and_branch() {
        let node = parse_content(
            "<item>\n  <title>Hello &amp; welcome</title>\n  <guid isPermaLink=\"false\">abc</guid>\n</item>",
        )
        .unwrap();
        assert!(node.value.is_none());
        assert_eq!(node.fields.len(), 2);
        assert_eq!(node.field_value("title"), Some("Hello & welcome"));

        let guid = node.field("guid").unwrap();
        assert_eq!(guid.attributes, vec![Attribute::new("isPermaLink", "false")]);
    }

    #[test]
    fn test_namespaces_are_resolved_and_declarations_dropped() {
        let node = parse_content(
            r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:ex="urn:ex" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="t" ex:flag="1"><ex:custom>v</ex:custom></entry>"#,
        )
        .unwrap();
        assert_eq!(node.namespace.as_deref(), Some("http://www.w3.org/2005/Atom"));
        assert_eq!(
            node.attributes,
            vec![Attribute::with_namespace("ex:flag", "urn:ex", "1")]
        );
        assert_eq!(node.fields[0].name, "custom");
        assert_eq!(node.fields[0].namespace.as_deref(), Some("urn:ex"));
    }

    #[test]
    fn test_empty_element_has_neither_value_nor_fields() {
        let node = parse_content(r#"<enclosure url="http://x/" length="1"/>"#).unwrap();
        assert!(node.value.is_none());
        assert!(node.fields.is_empty());
        assert_eq!(node.attributes.len(), 2);
    }

    #[test]
    fn test_cdata_becomes_value() {
        let node = parse_content("<title><![CDATA[<h1>Title</h1>]]></title>").unwrap();
        assert_eq!(node.value.as_deref(), Some("<h1>Title</h1>"));
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        assert!(parse_content("<item><title>x</title>").is_err());
        assert!(parse_content("").is_err());
        assert!(parse_content("just text").is_err());
    }

    #[test]
    fn test_deeply_nested_content_rejected() {
        let mut xml = String::new();
        for _ in 0..(MAX_CONTENT_DEPTH + 2) {
            xml.push_str("<a>");
        }
        for _ in 0..(MAX_CONTENT_DEPTH + 2) {
            xml.push_str("</a>");
        }
        let err = parse_content(&xml).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }
}
