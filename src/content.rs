//! Format-agnostic content tree.
//!
//! Every feed element passes through a [`ContentNode`] on its way to or from
//! XML. The tree knows nothing about RSS or Atom: it records a name, an
//! optional namespace, attributes in document order, and either a scalar
//! value (leaf) or child fields (branch).

use serde::Serialize;

/// A single XML attribute on a [`ContentNode`].
///
/// A `None` namespace means "no namespace". Attributes never inherit the
/// default namespace of their element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub value: String,
}

impl Attribute {
    /// Creates an attribute with no namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// Creates an attribute bound to `namespace`.
    pub fn with_namespace(
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            value: value.into(),
        }
    }
}

/// A node in the content tree.
///
/// A node is a leaf (`value` set, no fields), a branch (fields, no value) or
/// empty. A `None` namespace inherits the nearest enclosing default namespace
/// when the node is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ContentNode>,
}

impl ContentNode {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a leaf element holding `value`.
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Creates an element in an explicit namespace.
    pub fn with_namespace(
        name: impl Into<String>,
        namespace: Option<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace,
            value,
            ..Self::default()
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Appends a child field. Appending turns a leaf into a branch.
    pub fn add_field(&mut self, field: ContentNode) {
        self.value = None;
        self.fields.push(field);
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some() && self.fields.is_empty()
    }

    /// First attribute called `name` whose namespace satisfies `accepts_ns`.
    pub fn find_attribute<F>(&self, name: &str, accepts_ns: F) -> Option<&str>
    where
        F: Fn(Option<&str>) -> bool,
    {
        self.attributes
            .iter()
            .find(|a| a.name == name && accepts_ns(a.namespace.as_deref()))
            .map(|a| a.value.as_str())
    }

    /// First child field called `name`, regardless of namespace.
    pub fn field(&self, name: &str) -> Option<&ContentNode> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Value of the first child field called `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|f| f.value.as_deref())
    }
}
