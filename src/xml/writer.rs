//! Namespace-aware emission of content trees over a `quick_xml::Writer`.
//!
//! `quick_xml::Writer` writes whole events and has no notion of namespace
//! scope, so [`XmlEmitter`] keeps the start tag pending until its content
//! begins, tracks prefix bindings per open element, and adds `xmlns`
//! declarations only where the output would otherwise be unbound.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use super::names::{is_xmlns, split_name, XML_NAMESPACE};
use crate::content::{Attribute, ContentNode};
use crate::error::{xml_err, FeedError, Result};

struct Scope {
    name: String,
    /// `(prefix, namespace)`; the empty prefix is the default namespace.
    bindings: Vec<(String, String)>,
}

/// Streaming XML writer with a namespace-scope stack.
///
/// Bindings passed to [`XmlEmitter::with_bindings`] are ambient: they are
/// treated as declared by an enclosing document and are never written.
pub struct XmlEmitter {
    writer: Writer<Vec<u8>>,
    scopes: Vec<Scope>,
    pending: Option<BytesStart<'static>>,
}

impl XmlEmitter {
    pub fn new(indent: Option<usize>) -> Self {
        let writer = match indent {
            Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
            _ => Writer::new(Vec::new()),
        };
        Self {
            writer,
            scopes: vec![Scope {
                name: String::new(),
                bindings: vec![("xml".to_string(), XML_NAMESPACE.to_string())],
            }],
            pending: None,
        }
    }

    /// Creates an emitter whose base scope already holds the `xmlns`
    /// declarations found in `known`. Non-declaration attributes are ignored.
    pub fn with_bindings(known: &[Attribute], indent: Option<usize>) -> Self {
        let mut emitter = Self::new(indent);
        for attr in known {
            if let Some(prefix) = declared_prefix(&attr.name) {
                emitter.scopes[0]
                    .bindings
                    .push((prefix.to_string(), attr.value.clone()));
            }
        }
        emitter
    }

    /// Namespace currently bound to `prefix` (`""` for the default namespace).
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.bindings.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Innermost prefix bound to `namespace` that is not shadowed by a later binding.
    pub fn lookup_prefix(&self, namespace: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.bindings.iter().rev())
            .find(|(p, ns)| ns == namespace && self.lookup_namespace(p) == Some(namespace))
            .map(|(p, _)| p.as_str())
    }

    pub fn write_declaration(&mut self) -> Result<()> {
        self.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
    }

    /// Opens an element.
    ///
    /// * `namespace == None`: unqualified name, inheriting whatever default is in scope.
    /// * `namespace == Some("")`: explicitly no namespace; the default is undeclared if needed.
    /// * otherwise the element is written with `prefix` (or the prefix already bound
    ///   to `namespace`, or as the default namespace) and declared when unbound.
    pub fn start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        self.flush_pending()?;

        let Some(ns) = namespace else {
            let qname = match prefix {
                Some(p) if !p.is_empty() => format!("{p}:{local_name}"),
                _ => local_name.to_string(),
            };
            self.open(qname);
            return Ok(());
        };

        let prefix = match prefix {
            Some(p) => p.to_string(),
            None => self.lookup_prefix(ns).unwrap_or("").to_string(),
        };
        let bound = self.lookup_namespace(&prefix).unwrap_or("").to_string();
        let qname = if prefix.is_empty() {
            local_name.to_string()
        } else {
            format!("{prefix}:{local_name}")
        };
        self.open(qname);
        if bound != ns {
            self.declare(&prefix, ns)?;
        }
        Ok(())
    }

    /// Opens the element for `node`, resolving its prefix against the
    /// bindings in scope. `default_ns` applies when the node has no namespace.
    pub fn write_start_content(&mut self, node: &ContentNode, default_ns: Option<&str>) -> Result<()> {
        let namespace = node.namespace.as_deref().or(default_ns);
        match namespace {
            Some(ns) => {
                let (name_prefix, local) = split_name(&node.name);
                let prefix = self
                    .lookup_prefix(ns)
                    .map(str::to_string)
                    .or_else(|| name_prefix.map(str::to_string));
                self.start_element(prefix.as_deref(), local, Some(ns))
            }
            None => self.start_element(None, &node.name, None),
        }
    }

    /// Writes a content-tree attribute on the pending start tag.
    ///
    /// `xmlns` attributes become bindings of the current element.
    pub fn write_content_attribute(&mut self, attr: &Attribute) -> Result<()> {
        if let Some(prefix) = declared_prefix(&attr.name) {
            if self.lookup_namespace(prefix) != Some(attr.value.as_str()) {
                self.declare(prefix, &attr.value)?;
            }
            return Ok(());
        }
        let (prefix, local) = split_name(&attr.name);
        self.write_attribute(prefix, &attr.name, local, attr.namespace.as_deref(), &attr.value)
    }

    /// Writes an attribute on the pending start tag.
    ///
    /// Attributes are never placed in the default namespace: an empty prefix
    /// yields an unqualified attribute. A missing prefix for a namespaced
    /// attribute mints a new binding.
    pub fn write_attribute(
        &mut self,
        prefix: Option<&str>,
        name: &str,
        local_name: &str,
        namespace: Option<&str>,
        value: &str,
    ) -> Result<()> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        let prefix = match (prefix, namespace) {
            (Some(p), _) => Some(p.to_string()),
            (None, Some(ns)) => self.lookup_prefix(ns).map(str::to_string),
            (None, None) => Some(String::new()),
        };

        match prefix {
            Some(p) if p.is_empty() => self.push_attribute(name, value),
            Some(p) => {
                if let Some(ns) = namespace {
                    if p != "xml" && self.lookup_namespace(&p) != Some(ns) {
                        self.declare(&p, ns)?;
                    }
                }
                self.push_attribute(&format!("{p}:{local_name}"), value)
            }
            None => {
                // Only reachable with a namespace and no binding for it
                let ns = namespace.unwrap_or_default();
                let minted = self.mint_prefix();
                self.declare(&minted, ns)?;
                self.push_attribute(&format!("{minted}:{local_name}"), value)
            }
        }
    }

    /// Writes escaped text, or a CDATA section when `cdata` is set.
    pub fn write_value(&mut self, value: &str, cdata: bool) -> Result<()> {
        if cdata {
            // "]]>" cannot appear inside a section; split it across two
            let content = value.replace("]]>", "]]]]><![CDATA[>");
            self.write_event(Event::CData(BytesCData::new(content)))
        } else {
            self.write_event(Event::Text(BytesText::new(value)))
        }
    }

    /// Closes the innermost open element, self-closing it when it has no content.
    pub fn end_element(&mut self) -> Result<()> {
        if self.scopes.len() < 2 {
            return Err(FeedError::Xml(
                "end element without matching start".to_string(),
            ));
        }
        let Some(scope) = self.scopes.pop() else {
            return Ok(());
        };

        match self.pending.take() {
            Some(start) => self
                .writer
                .write_event(Event::Empty(start))
                .map_err(xml_err),
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(scope.name)))
                .map_err(xml_err),
        }
    }

    /// Copies a pre-serialized XML fragment into the output.
    ///
    /// Elements without a namespace of their own are placed in `default_ns`
    /// (`""` meaning no namespace). Text, CDATA, comments and processing
    /// instructions are copied through as written.
    pub fn write_xml_fragment(&mut self, fragment: &str, default_ns: &str) -> Result<()> {
        let mut reader = NsReader::from_str(fragment);

        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(e) => self.splice_start(&reader, &e, default_ns)?,
                Event::Empty(e) => {
                    self.splice_start(&reader, &e, default_ns)?;
                    self.end_element()?;
                }
                Event::End(_) => self.end_element()?,
                Event::Eof => break,
                Event::Decl(_) | Event::DocType(_) => {}
                other => self.write_event(other)?,
            }
        }
        Ok(())
    }

    /// Finishes output and returns the written document.
    pub fn into_string(mut self) -> Result<String> {
        self.flush_pending()?;
        if self.scopes.len() > 1 {
            return Err(FeedError::Xml(format!(
                "unclosed element <{}>",
                self.scopes[self.scopes.len() - 1].name
            )));
        }
        String::from_utf8(self.writer.into_inner()).map_err(xml_err)
    }

    fn splice_start(
        &mut self,
        reader: &NsReader<&[u8]>,
        start: &BytesStart<'_>,
        default_ns: &str,
    ) -> Result<()> {
        let decoder = reader.decoder();
        let (resolved, local) = reader.resolve_element(start.name());
        let own_ns = match resolved {
            ResolveResult::Bound(ns) => {
                Some(decoder.decode(ns.as_ref()).map_err(xml_err)?.into_owned())
            }
            _ => None,
        };
        let ns = own_ns
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_ns)
            .to_string();
        let local = decoder.decode(local.as_ref()).map_err(xml_err)?;
        self.start_element(None, &local, Some(&ns))?;

        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let qname = decoder.decode(attr.key.as_ref()).map_err(xml_err)?;
            let (prefix, attr_local) = split_name(&qname);
            let attr_ns = match reader.resolve_attribute(attr.key).0 {
                ResolveResult::Bound(b) => decoder.decode(b.as_ref()).map_err(xml_err)?.into_owned(),
                _ => ns.clone(),
            };
            let value = attr.decode_and_unescape_value(decoder).map_err(xml_err)?;
            self.write_attribute(
                Some(prefix.unwrap_or("")),
                &qname,
                attr_local,
                Some(&attr_ns),
                &value,
            )?;
        }
        Ok(())
    }

    fn open(&mut self, qname: String) {
        self.pending = Some(BytesStart::new(qname.clone()));
        self.scopes.push(Scope {
            name: qname,
            bindings: Vec::new(),
        });
    }

    fn declare(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        let attr_name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        self.push_attribute(&attr_name, namespace)?;
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .bindings
                .push((prefix.to_string(), namespace.to_string()));
        }
        Ok(())
    }

    fn push_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(FeedError::Xml(format!(
                "attribute '{name}' written outside of a start tag"
            ))),
        }
    }

    fn mint_prefix(&self) -> String {
        (1..)
            .map(|n| format!("p{n}"))
            .find(|p| self.lookup_namespace(p).is_none())
            .unwrap_or_default()
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer
                .write_event(Event::Start(start))
                .map_err(xml_err)?;
        }
        Ok(())
    }

    fn write_event(&mut self, event: Event<'_>) -> Result<()> {
        self.flush_pending()?;
        self.writer.write_event(event).map_err(xml_err)
    }
}

/// Prefix declared by an `xmlns` / `xmlns:p` attribute name.
fn declared_prefix(name: &str) -> Option<&str> {
    if !is_xmlns(name, None) {
        return None;
    }
    Some(name.strip_prefix("xmlns:").unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(f: impl FnOnce(&mut XmlEmitter) -> Result<()>) -> String {
        let mut emitter = XmlEmitter::new(None);
        f(&mut emitter).unwrap();
        emitter.into_string().unwrap()
    }

    #[test]
    fn test_empty_element_self_closes() {
        let out = emit(|w| {
            w.start_element(None, "enclosure", None)?;
            w.write_attribute(None, "url", "url", None, "http://x/")?;
            w.end_element()
        });
        assert_eq!(out, r#"<enclosure url="http://x/"/>"#);
    }

    #[test]
    fn test_default_namespace_declared_once() {
        let out = emit(|w| {
            w.start_element(None, "entry", Some("urn:atom"))?;
            w.start_element(None, "id", Some("urn:atom"))?;
            w.write_value("1", false)?;
            w.end_element()?;
            w.end_element()
        });
        assert_eq!(out, r#"<entry xmlns="urn:atom"><id>1</id></entry>"#);
    }

    #[test]
    fn test_bound_prefix_wins_over_name_prefix() {
        let known = vec![Attribute::new("xmlns:ex", "uri")];
        let mut w = XmlEmitter::with_bindings(&known, None);
        let mut node = ContentNode::leaf("other:tag", "v");
        node.namespace = Some("uri".to_string());
        w.write_start_content(&node, None).unwrap();
        w.write_value("v", false).unwrap();
        w.end_element().unwrap();
        assert_eq!(w.into_string().unwrap(), "<ex:tag>v</ex:tag>");
    }

    #[test]
    fn test_name_prefix_declared_when_unbound() {
        let mut node = ContentNode::leaf("ex:tag", "v");
        node.namespace = Some("uri".to_string());
        let out = emit(|w| {
            w.write_start_content(&node, None)?;
            w.write_value("v", false)?;
            w.end_element()
        });
        assert_eq!(out, r#"<ex:tag xmlns:ex="uri">v</ex:tag>"#);
    }

    #[test]
    fn test_attribute_in_default_namespace_stays_unqualified() {
        let out = emit(|w| {
            w.start_element(None, "link", Some("urn:atom"))?;
            w.write_attribute(Some(""), "href", "href", Some("urn:atom"), "http://x/")?;
            w.end_element()
        });
        assert_eq!(out, r#"<link xmlns="urn:atom" href="http://x/"/>"#);
    }

    #[test]
    fn test_attribute_without_binding_mints_prefix() {
        let out = emit(|w| {
            w.start_element(None, "item", None)?;
            w.write_attribute(None, "flag", "flag", Some("urn:ext"), "1")?;
            w.end_element()
        });
        assert_eq!(out, r#"<item xmlns:p1="urn:ext" p1:flag="1"/>"#);
    }

    #[test]
    fn test_fragment_elements_take_supplied_namespace() {
        let out = emit(|w| {
            w.start_element(None, "content", Some("urn:atom"))?;
            w.start_element(None, "div", Some("urn:xhtml"))?;
            w.write_xml_fragment(r#"<p class="a">one &amp; <b>two</b></p><!-- c -->"#, "urn:xhtml")?;
            w.end_element()?;
            w.end_element()
        });
        assert_eq!(
            out,
            r#"<content xmlns="urn:atom"><div xmlns="urn:xhtml"><p class="a">one &amp; <b>two</b></p><!-- c --></div></content>"#
        );
    }

    #[test]
    fn test_fragment_without_namespace_undeclares_default() {
        let out = emit(|w| {
            w.start_element(None, "content", Some("urn:atom"))?;
            w.write_xml_fragment("<data><empty/></data>", "")?;
            w.end_element()
        });
        assert_eq!(
            out,
            r#"<content xmlns="urn:atom"><data xmlns=""><empty/></data></content>"#
        );
    }

    #[test]
    fn test_cdata_splits_terminator() {
        let out = emit(|w| {
            w.start_element(None, "title", None)?;
            w.write_value("a]]>b", true)?;
            w.end_element()
        });
        assert_eq!(out, "<title><![CDATA[a]]]]><![CDATA[>b]]></title>");
    }

    #[test]
    fn test_unbalanced_end_is_an_error() {
        let mut w = XmlEmitter::new(None);
        assert!(w.end_element().is_err());
    }
}
