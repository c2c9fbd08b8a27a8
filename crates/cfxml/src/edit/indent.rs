//! Indentation inference
//!
//! Indentation is never stored; it is read back from the whitespace around
//! nodes every time it is needed, so it cannot go stale across mutations.

use crate::xml::model::{Document, NodeId};

const DEFAULT_UNIT: &str = "\t";

/// Whitespace after the last line break of `ws`, if `ws` has one and ends in pure indentation
fn indent_after_newline(ws: &str) -> Option<&str> {
    let (_, after) = ws.rsplit_once('\n')?;
    after.chars().all(|c| c == ' ' || c == '\t').then_some(after)
}

impl Document {
    /// Indentation in front of the node's start tag, read from the preceding whitespace
    pub fn own_indent(&self, id: NodeId) -> Option<String> {
        let Some(parent) = self.parent(id) else {
            return (id == self.root()).then(String::new);
        };
        let preceding = match self.previous_sibling(id) {
            Some(prev) => self.tail(prev),
            None => self.element(parent)?.raw_text()?,
        };
        indent_after_newline(preceding).map(str::to_string)
    }

    /// One level of indentation as used around `container`
    pub fn indent_unit(&self, container: NodeId) -> String {
        let levels = std::iter::successors(Some(container), |&cur| self.parent(cur));
        for current in levels {
            if let (Some(inner), Some(outer)) =
                (self.detected_child_indent(current), self.own_indent(current))
            {
                if let Some(unit) = inner.strip_prefix(outer.as_str()) {
                    if !unit.is_empty() {
                        return unit.to_string();
                    }
                }
            }
        }
        DEFAULT_UNIT.to_string()
    }

    /// Indentation of the closing tag of `container`
    pub fn closing_indent(&self, container: NodeId) -> String {
        self.own_indent(container)
            .unwrap_or_else(|| DEFAULT_UNIT.repeat(self.depth(container)))
    }

    /// Child indentation already laid out inside `container`: its leading
    /// text, else the tail of any child but the last
    fn detected_child_indent(&self, container: NodeId) -> Option<&str> {
        let (_, leading) = self.children(container).split_last()?;
        self.element(container)
            .and_then(|el| el.raw_text())
            .and_then(indent_after_newline)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                leading
                    .iter()
                    .filter_map(|&c| indent_after_newline(self.tail(c)))
                    .find(|s| !s.is_empty())
            })
    }

    /// Indentation for children of `container`.
    ///
    /// Taken from the children already laid out when there are any;
    /// otherwise the container's own indentation plus one unit.
    pub fn infer_indent(&self, container: NodeId) -> String {
        match self.detected_child_indent(container) {
            Some(indent) => indent.to_string(),
            None => self.closing_indent(container) + &self.indent_unit(container),
        }
    }

    /// Whether `container` currently lays out child nodes (as opposed to `<x/>` or text)
    pub fn is_expanded(&self, container: NodeId) -> bool {
        !self.children(container).is_empty()
    }
}
