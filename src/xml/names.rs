/// Namespace bound to the reserved `xmlns` prefix.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// XML Schema instance namespace (`xsi:type`, `xsi:nil`, ...).
pub const XML_SCHEMA_INSTANCE_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Splits `prefix:local` into its parts. Names without a colon have no prefix.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// True for namespace declarations (`xmlns`, `xmlns:foo`).
pub fn is_xmlns(name: &str, namespace: Option<&str>) -> bool {
    name == "xmlns" || name.starts_with("xmlns:") || namespace == Some(XMLNS_NAMESPACE)
}

/// True for `xsi:type` annotations.
pub fn is_xml_schema_type(local_name: &str, namespace: Option<&str>) -> bool {
    local_name == "type" && namespace == Some(XML_SCHEMA_INSTANCE_NAMESPACE)
}

/// True when `media_type` selects inline XHTML content.
pub fn is_xhtml_media_type(media_type: Option<&str>) -> bool {
    media_type.is_some_and(|t| t.trim().eq_ignore_ascii_case("xhtml"))
}

/// True for XML media types (`text/xml`, `application/xml`, `*+xml`, `*/xml`).
pub fn is_xml_media_type(media_type: Option<&str>) -> bool {
    let Some(t) = media_type else {
        return false;
    };
    let t = t.trim().to_ascii_lowercase();
    // Parameters such as "; charset=utf-8" do not change the classification
    let essence = t.split(';').next().unwrap_or("").trim();
    essence.ends_with("+xml") || essence.ends_with("/xml")
}
