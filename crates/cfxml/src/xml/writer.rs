//! XML serializer
//!
//! Writes a [`Document`] back exactly as it was parsed, then applies the
//! output conventions of configuration dumps (BOM, declaration, CRLF).

use crate::xml::model::{Document, NodeId, NodeKind, CRLF};

/// Default XML declaration written when the source had none
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Line ending policy applied on output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// Every line break becomes `\r\n`
    #[default]
    Crlf,
    /// Line breaks are written as they are stored
    Preserve,
}

/// Configuration for the XML writer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub line_ending: LineEnding,
    /// Prefix the output with a UTF-8 byte-order mark
    pub bom: bool,
    /// Add an XML declaration when the prolog has none
    pub declaration: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Crlf,
            bom: true,
            declaration: true,
        }
    }
}

impl Config {
    /// Write the stored markup only, no BOM, no added declaration, no newline changes
    pub const fn verbatim() -> Self {
        Self {
            line_ending: LineEnding::Preserve,
            bom: false,
            declaration: false,
        }
    }
}

/// Serialize a document according to `config`
pub fn write_document(doc: &Document, config: &Config) -> String {
    let mut out = String::new();
    if config.bom {
        out.push('\u{feff}');
    }
    if config.declaration && !doc.prolog.trim_start().starts_with("<?xml") {
        out.push_str(XML_DECLARATION);
        out.push_str(doc.newline);
    }
    out.push_str(&doc.prolog);
    write_node(doc, doc.root, &mut out);
    out.push_str(&doc.epilog);

    match config.line_ending {
        LineEnding::Crlf => normalize_newlines(&out),
        LineEnding::Preserve => out,
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Comment(content) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        NodeKind::Instruction(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(el.name.as_str());
            for (name, attr) in &el.attributes {
                out.push_str(&attr.leading);
                out.push_str(name);
                out.push_str(&attr.eq);
                out.push(attr.quote);
                out.push_str(&attr.raw);
                out.push(attr.quote);
            }
            out.push_str(&el.tag_space);

            if el.children.is_empty() && el.text.is_none() {
                out.push_str("/>");
                return;
            }

            out.push('>');
            if let Some(text) = &el.text {
                out.push_str(text);
            }
            for &child in &el.children {
                write_node(doc, child, out);
                out.push_str(doc.tail(child));
            }
            out.push_str("</");
            out.push_str(el.name.as_str());
            out.push_str(&el.close_space);
            out.push('>');
        }
    }
}

fn normalize_newlines(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 16);
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str(CRLF);
            }
            '\n' => out.push_str(CRLF),
            _ => out.push(ch),
        }
    }
    out
}
