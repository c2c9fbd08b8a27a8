//! Structural mutations with whitespace repair
//!
//! Every mutation rewrites only the whitespace slots adjacent to the node it
//! touches, so a serialized diff shows nothing but the intended change.

use tracing::debug;

use crate::edit::fragment::NewElement;
use crate::edit::predicate::{Matcher, Position, Predicate};
use crate::error::{Error, Result};
use crate::schema::V8_NS;
use crate::xml::escape::escape_text;
use crate::xml::model::{is_xml_space, Attribute, Document, Element, NodeId, NodeKind, QName};

impl Document {
    /// Insert `new` into `container` according to `position` and return its id.
    ///
    /// An empty container is expanded first. Otherwise the new element takes
    /// over the whitespace in front of its insertion point, which is rewritten
    /// to a fresh line at child indentation.
    pub fn insert_child(
        &mut self,
        container: NodeId,
        new: NewElement,
        position: Position<'_>,
    ) -> Result<NodeId> {
        let el = self.expect_element(container)?;
        if el.has_meaningful_text() {
            return Err(Error::validation(format!(
                "<{}> holds text and cannot take child elements",
                el.name()
            )));
        }

        let children = self.children(container);
        let index = match position {
            Position::AtEnd => children.len(),
            Position::BeforeFirst(pred) => children
                .iter()
                .position(|&c| self.get(c).is_some_and(|el| pred.test(el)))
                .unwrap_or(children.len()),
        };

        let nl = self.newline;
        let indent = self.infer_indent(container);
        let unit = self.indent_unit(container);
        let line = format!("{nl}{indent}");
        let id = self.materialize(new, container, &indent, &unit);

        if self.is_expanded(container) {
            let preceding = match index.checked_sub(1) {
                Some(prev) => {
                    let prev = self
                        .children(container)
                        .get(prev)
                        .copied()
                        .ok_or_else(|| Error::not_found(format!("child {prev} of node {}", container.0)))?;
                    std::mem::replace(&mut self.expect_node_mut(prev)?.tail, line)
                }
                None => {
                    let el = self.expect_element_mut(container)?;
                    el.text.replace(line).unwrap_or_default()
                }
            };
            self.set_tail(id, preceding);
        } else {
            let closing = self.closing_indent(container);
            let el = self.expect_element_mut(container)?;
            el.empty_text = el.text.replace(line);
            self.set_tail(id, format!("{nl}{closing}"));
        }

        self.expect_element_mut(container)?.children.insert(index, id);
        debug!(node = id.0, index, "inserted child");
        Ok(id)
    }

    /// Allocate `new` and its descendants under `parent`, laid out at `indent`
    fn materialize(&mut self, new: NewElement, parent: NodeId, indent: &str, unit: &str) -> NodeId {
        let mut element = Element::new(QName::new(new.name));
        for (name, value) in &new.attributes {
            element.attributes.insert(name.clone(), Attribute::new(value));
        }
        if new.children.is_empty() {
            element.text = new.text.as_deref().map(|t| escape_text(t).into_owned());
        }
        let id = self.alloc(Some(parent), NodeKind::Element(element));

        if !new.children.is_empty() {
            let nl = self.newline;
            let inner = format!("{indent}{unit}");
            let count = new.children.len();
            let mut ids = Vec::with_capacity(count);
            for (i, child) in new.children.into_iter().enumerate() {
                let child_id = self.materialize(child, id, &inner, unit);
                let tail = if i + 1 == count {
                    format!("{nl}{indent}")
                } else {
                    format!("{nl}{inner}")
                };
                self.set_tail(child_id, tail);
                ids.push(child_id);
            }
            if let Some(el) = self.element_mut(id) {
                el.text = Some(format!("{nl}{inner}"));
                el.children = ids;
            }
        }
        id
    }

    /// Remove the first child element of `container` matching `pred`.
    ///
    /// Returns the detached node, or `None` when nothing matched.
    pub fn remove_child<P: Predicate + ?Sized>(
        &mut self,
        container: NodeId,
        pred: &P,
    ) -> Result<Option<NodeId>> {
        self.expect_element(container)?;
        match self.find_matching(container, pred) {
            Some(id) => {
                self.remove_node(id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// First child element of `container` matching `pred`
    pub fn find_matching<P: Predicate + ?Sized>(&self, container: NodeId, pred: &P) -> Option<NodeId> {
        self.child_elements(container)
            .find(|&c| self.get(c).is_some_and(|el| pred.test(el)))
    }

    /// Detach `id` from its parent, handing its tail to the preceding whitespace
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let parent = self
            .parent(id)
            .ok_or_else(|| Error::validation("the root element cannot be removed"))?;
        let index = self
            .index_in_parent(id)
            .ok_or_else(|| Error::not_found(format!("node {} in its parent", id.0)))?;

        let tail = {
            let node = self.expect_node_mut(id)?;
            node.parent = None;
            std::mem::take(&mut node.tail)
        };
        let el = self.expect_element_mut(parent)?;
        el.children.remove(index);
        match index.checked_sub(1) {
            Some(prev) => {
                if let Some(&prev) = el.children.get(prev) {
                    self.set_tail(prev, tail);
                }
            }
            None => {
                if el.text.is_some() || !tail.is_empty() {
                    el.text = Some(tail);
                }
            }
        }

        let el = self.expect_element_mut(parent)?;
        if el.children.is_empty()
            && el
                .text
                .as_deref()
                .is_some_and(|t| t.chars().all(is_xml_space))
        {
            el.text = el.empty_text.take();
        }
        debug!(node = id.0, index, "removed child");
        Ok(())
    }

    /// Drop every child node and collapse `container` to `<x/>`.
    ///
    /// Returns whether anything changed.
    pub fn clear_children(&mut self, container: NodeId) -> Result<bool> {
        let el = self.expect_element_mut(container)?;
        let children = std::mem::take(&mut el.children);
        let changed = !children.is_empty() || el.text.is_some();
        el.text = None;
        el.empty_text = None;
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
                node.tail.clear();
            }
        }
        Ok(changed)
    }

    /// Replace the text of a leaf element; an empty value writes `<x/>`.
    ///
    /// Returns `false` without touching anything when the value is unchanged.
    pub fn set_scalar_text(&mut self, id: NodeId, value: &str) -> Result<bool> {
        let el = self.expect_element(id)?;
        if self.child_elements(id).next().is_some() {
            return Err(Error::validation(format!(
                "<{}> has child elements, not a text value",
                el.name()
            )));
        }
        if el.text().unwrap_or_default() == value {
            return Ok(false);
        }

        self.clear_children(id)?;
        if !value.is_empty() {
            self.expect_element_mut(id)?.text = Some(escape_text(value).into_owned());
        }
        Ok(true)
    }

    /// `(lang, content)` pairs of a multilingual element, in document order
    pub fn multilingual_items(&self, id: NodeId) -> Vec<(String, String)> {
        self.child_elements(id)
            .filter_map(|item| self.get(item))
            .filter(|item| item.local_name() == "item")
            .map(|item| {
                let lang = item.child("lang").map(|l| l.trimmed_text()).unwrap_or_default();
                let content = item
                    .child("content")
                    .and_then(|c| c.element().text().map(|t| t.into_owned()))
                    .unwrap_or_default();
                (lang, content)
            })
            .collect()
    }

    /// Content for `lang` of a multilingual element
    pub fn multilingual_text(&self, id: NodeId, lang: &str) -> Option<String> {
        self.multilingual_items(id)
            .into_iter()
            .find_map(|(l, content)| (l == lang).then_some(content))
    }

    /// Replace a multilingual element with a single `item` for `lang`.
    ///
    /// An empty value collapses the element to `<x/>`. Returns `false`
    /// without touching anything when the element already holds exactly
    /// this value.
    pub fn set_multilingual_text(&mut self, id: NodeId, lang: &str, value: &str) -> Result<bool> {
        self.expect_element(id)?;
        let items = self.multilingual_items(id);
        let unchanged = if value.is_empty() {
            items.is_empty() && !self.is_expanded(id)
        } else {
            matches!(items.as_slice(), [(l, c)] if l == lang && c == value)
        };
        if unchanged {
            return Ok(false);
        }

        self.clear_children(id)?;
        if value.is_empty() {
            return Ok(true);
        }

        let prefix = match self.prefix_for(id, V8_NS) {
            Some(Some(prefix)) => format!("{prefix}:"),
            Some(None) => String::new(),
            None => {
                self.set_attribute(id, "xmlns:v8", V8_NS)?;
                "v8:".to_string()
            }
        };
        let item = NewElement::new(format!("{prefix}item"))
            .child(NewElement::new(format!("{prefix}lang")).text(lang))
            .child(NewElement::new(format!("{prefix}content")).text(value));
        self.insert_child(id, item, Position::AtEnd)?;
        Ok(true)
    }

    /// Remove the first child named `local` whose trimmed text is `text`
    pub fn remove_named(&mut self, container: NodeId, local: &str, text: &str) -> Result<bool> {
        let matcher = Matcher::local(local).with_text(text);
        Ok(self.remove_child(container, &matcher)?.is_some())
    }

    fn expect_node_mut(&mut self, id: NodeId) -> Result<&mut crate::xml::model::Node> {
        self.node_mut(id)
            .ok_or_else(|| Error::not_found(format!("node {}", id.0)))
    }
}
