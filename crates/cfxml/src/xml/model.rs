//! Lossless XML data model
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Every piece of markup that is not structure (indentation,
//! line breaks, attribute spacing, entity spelling) is stored raw so that a
//! document serializes back to the exact bytes it was parsed from.
//!
//! Whitespace follows the text/tail model: an element's `text` is the raw
//! content before its first child, and each node's `tail` is the raw content
//! between its end and the next sibling (or the parent's closing tag).

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::xml::escape;

/// Handle to a node inside a [`Document`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Qualified element or attribute name as written (`prefix:local`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName(String);

impl QName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local(&self) -> &str {
        self.0
            .split_once(':')
            .map_or(self.0.as_str(), |(_, local)| local)
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute with the spelling it was written with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) leading: String,
    pub(crate) eq: String,
    pub(crate) quote: char,
    pub(crate) raw: String,
}

impl Attribute {
    /// New attribute written as ` name="value"`
    pub fn new(value: &str) -> Self {
        Self {
            leading: " ".to_string(),
            eq: "=".to_string(),
            quote: '"',
            raw: escape::escape_attr(value, '"').into_owned(),
        }
    }

    pub fn value(&self) -> Cow<'_, str> {
        escape::unescape(&self.raw).unwrap_or(Cow::Borrowed(self.raw.as_str()))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.raw = escape::escape_attr(value, self.quote).into_owned();
    }
}

/// XML element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: QName,
    pub(crate) attributes: IndexMap<String, Attribute>,
    /// Whitespace between the last attribute and `>` or `/>`
    pub(crate) tag_space: String,
    /// Whitespace between the name and `>` of the closing tag
    pub(crate) close_space: String,
    /// Raw content before the first child; `None` with no children means `<x/>`
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<NodeId>,
    /// Text held before the first child was inserted into an empty element
    pub(crate) empty_text: Option<String>,
}

impl Element {
    pub(crate) fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            tag_space: String::new(),
            close_space: String::new(),
            text: None,
            children: Vec::new(),
            empty_text: None,
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name.local()
    }

    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes.get(name).map(Attribute::value)
    }

    /// Attributes in document order, namespace declarations included
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Decoded text content
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.text
            .as_deref()
            .map(|raw| escape::unescape(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// Decoded text with surrounding whitespace removed, empty when absent
    pub fn trimmed_text(&self) -> String {
        self.text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Text content other than whitespace
    pub fn has_meaningful_text(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|t| !t.trim_matches(is_xml_space).is_empty())
    }
}

/// Payload of an arena node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    /// Content between `<!--` and `-->`
    Comment(String),
    /// Content between `<?` and `?>`
    Instruction(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) tail: String,
    pub(crate) kind: NodeKind,
}

/// XML document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    /// Raw markup before the root element (declaration, comments, whitespace)
    pub(crate) prolog: String,
    /// Raw markup after the root element
    pub(crate) epilog: String,
    pub(crate) bom: bool,
    pub(crate) newline: &'static str,
}

pub(crate) const CRLF: &str = "\r\n";
pub(crate) const LF: &str = "\n";

pub(crate) fn is_xml_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

impl Document {
    pub(crate) fn with_root(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                tail: String::new(),
                kind: NodeKind::Element(root),
            }],
            root: NodeId(0),
            prolog: String::new(),
            epilog: String::new(),
            bom: false,
            newline: CRLF,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn prolog(&self) -> &str {
        &self.prolog
    }

    pub fn epilog(&self) -> &str {
        &self.epilog
    }

    /// Whether the source carried a UTF-8 byte-order mark
    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Line break used by the source, `\r\n` unless it only used `\n`
    pub fn newline(&self) -> &'static str {
        self.newline
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            tail: String::new(),
            kind,
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Like [`Document::element`] but reporting a missing node as an error
    pub fn expect_element(&self, id: NodeId) -> Result<&Element> {
        self.element(id)
            .ok_or_else(|| Error::not_found(format!("element node {}", id.0)))
    }

    pub(crate) fn expect_element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.element_mut(id)
            .ok_or_else(|| Error::not_found(format!("element node {}", id.0)))
    }

    pub fn get(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.element(id).map(|element| ElementRef {
            doc: self,
            id,
            element,
        })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn tail(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.tail.as_str())
    }

    pub(crate) fn set_tail(&mut self, id: NodeId, tail: String) {
        if let Some(node) = self.node_mut(id) {
            node.tail = tail;
        }
    }

    /// All child nodes, comments and instructions included
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map_or(&[], |el| el.children.as_slice())
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.element(child).is_some())
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// First child element with the given local name
    pub fn find_child(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|&child| self.local_name(child) == Some(local))
    }

    /// Follow a chain of local names from `id`
    pub fn find_path(&self, id: NodeId, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(id, |current, local| self.find_child(current, local))
    }

    /// First element with the given local name in document order below `id`
    pub fn find_descendant(&self, id: NodeId, local: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.local_name(current) == Some(local) {
                return Some(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        None
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.children(parent).get(idx.checked_sub(1)?).copied()
    }

    /// Number of element ancestors
    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).count()
    }

    pub fn text(&self, id: NodeId) -> Option<Cow<'_, str>> {
        self.element(id)?.text()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<Cow<'_, str>> {
        self.element(id)?.attribute(name)
    }

    /// Set an attribute, keeping its position and quoting when it exists
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let el = self.expect_element_mut(id)?;
        match el.attributes.get_mut(name) {
            Some(attr) => attr.set_value(value),
            None => {
                el.attributes.insert(name.to_string(), Attribute::new(value));
            }
        }
        Ok(())
    }

    /// Namespace URI of an element, resolved through in-scope declarations
    pub fn namespace_uri(&self, id: NodeId) -> Option<Cow<'_, str>> {
        let el = self.element(id)?;
        let decl = match el.name.prefix() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        self.lookup_declaration(id, &decl)
    }

    fn lookup_declaration(&self, id: NodeId, decl: &str) -> Option<Cow<'_, str>> {
        std::iter::successors(Some(id), |&cur| self.parent(cur))
            .find_map(|cur| self.attribute(cur, decl))
            .filter(|uri| !uri.is_empty())
    }

    /// Prefix bound to `uri` in the scope of `id`.
    ///
    /// `Some(None)` means `uri` is the default namespace.
    pub fn prefix_for(&self, id: NodeId, uri: &str) -> Option<Option<String>> {
        for cur in std::iter::successors(Some(id), |&cur| self.parent(cur)) {
            let Some(el) = self.element(cur) else {
                continue;
            };
            for (name, attr) in el.attributes() {
                if attr.value() != uri {
                    continue;
                }
                let binding = if name == "xmlns" {
                    None
                } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                    Some(prefix.to_string())
                } else {
                    continue;
                };
                // a closer redeclaration of the same prefix shadows this one
                let decl = binding
                    .as_deref()
                    .map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
                if self.lookup_declaration(id, &decl).as_deref() == Some(uri) {
                    return Some(binding);
                }
            }
        }
        None
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(None, NodeKind::Element(Element::new(QName::new(name))))
    }
}

/// Borrowed view of an element with access to its surroundings
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'d> {
    doc: &'d Document,
    id: NodeId,
    element: &'d Element,
}

impl<'d> ElementRef<'d> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn element(&self) -> &'d Element {
        self.element
    }

    pub fn local_name(&self) -> &'d str {
        self.element.local_name()
    }

    pub fn attribute(&self, name: &str) -> Option<Cow<'d, str>> {
        self.element.attribute(name)
    }

    pub fn trimmed_text(&self) -> String {
        self.element.trimmed_text()
    }

    pub fn child(&self, local: &str) -> Option<Self> {
        self.doc
            .find_child(self.id, local)
            .and_then(|id| self.doc.get(id))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = ElementRef<'d>> + 'd {
        let doc = self.doc;
        doc.child_elements(self.id).filter_map(move |id| doc.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    #[test]
    fn test_qname_parts() {
        let name = QName::new("v8:item");
        assert_eq!(name.prefix(), Some("v8"));
        assert_eq!(name.local(), "item");
        assert_eq!(QName::new("Form").prefix(), None);
        assert_eq!(QName::new("Form").local(), "Form");
    }

    #[test]
    fn test_navigation() -> Result<()> {
        let doc = from_str("<a><b><c>x</c></b><!--n--><d/></a>")?;
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 3);
        assert_eq!(doc.child_elements(root).count(), 2);

        let c = doc.find_path(root, &["b", "c"]).ok_or_else(|| Error::not_found("c"))?;
        assert_eq!(doc.text(c).as_deref(), Some("x"));
        assert_eq!(doc.depth(c), 2);
        assert_eq!(doc.find_descendant(root, "c"), Some(c));

        let d = doc.find_child(root, "d").ok_or_else(|| Error::not_found("d"))?;
        let prev = doc.previous_sibling(d).ok_or_else(|| Error::not_found("prev"))?;
        assert!(matches!(doc.kind(prev), Some(NodeKind::Comment(c)) if c == "n"));
        Ok(())
    }

    #[test]
    fn test_namespace_resolution() -> Result<()> {
        let doc = from_str(
            r#"<MetaDataObject xmlns="http://v8.1c.ru/8.3/MDClasses" xmlns:v8="http://v8.1c.ru/8.1/data/core"><Catalog><v8:item/></Catalog></MetaDataObject>"#,
        )?;
        let catalog = doc.find_child(doc.root(), "Catalog").ok_or_else(|| Error::not_found("Catalog"))?;
        let item = doc.find_child(catalog, "item").ok_or_else(|| Error::not_found("item"))?;

        assert_eq!(
            doc.namespace_uri(catalog).as_deref(),
            Some("http://v8.1c.ru/8.3/MDClasses")
        );
        assert_eq!(
            doc.namespace_uri(item).as_deref(),
            Some("http://v8.1c.ru/8.1/data/core")
        );
        assert_eq!(
            doc.prefix_for(item, "http://v8.1c.ru/8.1/data/core"),
            Some(Some("v8".to_string()))
        );
        assert_eq!(
            doc.prefix_for(item, "http://v8.1c.ru/8.3/MDClasses"),
            Some(None)
        );
        assert_eq!(doc.prefix_for(item, "urn:missing"), None);
        Ok(())
    }

    #[test]
    fn test_set_attribute_keeps_quote_style() -> Result<()> {
        let mut doc = from_str("<a name='x' id=\"1\"/>")?;
        let root = doc.root();
        doc.set_attribute(root, "name", "it's")?;
        doc.set_attribute(root, "new", "v")?;
        let el = doc.expect_element(root)?;
        let names: Vec<&str> = el.attributes().map(|(n, _)| n).collect();
        assert_eq!(names, ["name", "id", "new"]);
        assert_eq!(el.attributes.get("name").map(Attribute::raw), Some("it&apos;s"));
        assert_eq!(el.attribute("name").as_deref(), Some("it's"));
        Ok(())
    }
}
