//! Lossless XML parser
//!
//! Builds a [`Document`] that keeps every byte of formatting: whitespace is
//! attached to element text and node tails, attribute spelling is kept raw,
//! and entity references are validated but not decoded.

use indexmap::IndexMap;
use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::xml::escape;
use crate::xml::model::{Attribute, Document, Element, NodeId, NodeKind, QName, CRLF, LF};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 64 * 1024 * 1024, // 64 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    input_len: usize,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: &'a str, config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            input_len: input.len(),
        }
    }

    /// Parse a complete document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.input_len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.cursor.position(),
            ));
        }

        let bom = self.cursor.consume_str("\u{feff}");
        let prolog_start = self.cursor.pos();
        self.skip_misc()?;
        let prolog = self.cursor.slice_from(prolog_start).to_string();

        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::Unterminated {
                what: "document: no root element",
            }));
        }

        let root = self.parse_start_tag()?;
        let mut doc = Document::with_root(root.element);
        doc.bom = bom;
        doc.prolog = prolog;
        if !root.self_closing {
            let root = doc.root;
            self.parse_content(&mut doc, root, 1)?;
        }

        let epilog_start = self.cursor.pos();
        self.skip_misc()?;
        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::UnexpectedToken));
        }
        doc.epilog = self.cursor.slice_from(epilog_start).to_string();
        doc.newline = detect_newline(self.cursor.slice_from(0));

        debug!(nodes = doc.nodes.len(), "parsed document");
        Ok(doc)
    }

    /// Whitespace, comments, processing instructions and doctype outside the root
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.take_whitespace();
            if self.cursor.starts_with("<?") {
                self.expect_past("?>", "processing instruction")?;
            } else if self.cursor.starts_with("<!--") {
                self.expect_past("-->", "comment")?;
            } else if self.cursor.starts_with("<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let mut brackets = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here(ErrorKind::Unterminated { what: "doctype" }))
    }

    fn parse_start_tag(&mut self) -> Result<StartTag> {
        if !self.cursor.consume(b'<') {
            return Err(self.error_here(ErrorKind::UnexpectedToken));
        }
        let name = self.parse_name()?;
        let mut element = Element::new(QName::new(name));
        let mut attributes = IndexMap::new();

        loop {
            let space = self.cursor.take_whitespace();
            match self.cursor.current() {
                Some(b'/') => {
                    self.cursor.advance();
                    if !self.cursor.consume(b'>') {
                        return Err(self.error_here(ErrorKind::UnexpectedToken));
                    }
                    element.tag_space = space.to_string();
                    element.attributes = attributes;
                    return Ok(StartTag {
                        element,
                        self_closing: true,
                    });
                }
                Some(b'>') => {
                    self.cursor.advance();
                    element.tag_space = space.to_string();
                    element.attributes = attributes;
                    return Ok(StartTag {
                        element,
                        self_closing: false,
                    });
                }
                Some(_) if space.is_empty() => {
                    return Err(self.error_here(ErrorKind::UnexpectedToken));
                }
                Some(_) => {}
                None => {
                    return Err(self.error_here(ErrorKind::Unterminated { what: "start tag" }));
                }
            }

            let pos = self.cursor.position();
            let attr_name = self.parse_name()?;
            let eq_start = self.cursor.pos();
            self.cursor.take_whitespace();
            if !self.cursor.consume(b'=') {
                return Err(self.error_here(ErrorKind::UnexpectedToken));
            }
            self.cursor.take_whitespace();
            let eq = self.cursor.slice_from(eq_start).to_string();
            let (quote, raw) = self.parse_attribute_value()?;

            if attributes.contains_key(attr_name) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute {
                        name: attr_name.to_string(),
                    },
                    pos,
                ));
            }
            attributes.insert(
                attr_name.to_string(),
                Attribute {
                    leading: space.to_string(),
                    eq,
                    quote,
                    raw,
                },
            );
        }
    }

    fn parse_attribute_value(&mut self) -> Result<(char, String)> {
        let quote = match self.cursor.current() {
            Some(b'"') => '"',
            Some(b'\'') => '\'',
            _ => return Err(self.error_here(ErrorKind::UnexpectedToken)),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        let start_pos = self.cursor.position();
        while let Some(b) = self.cursor.current() {
            if char::from(b) == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                if raw.contains('<') {
                    return Err(Error::at(ErrorKind::UnexpectedToken, start_pos));
                }
                if escape::unescape(raw).is_err() {
                    return Err(Error::at(ErrorKind::InvalidEntity, start_pos));
                }
                return Ok((quote, raw.to_string()));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::Unterminated {
            what: "attribute value",
        }))
    }

    /// Parse children of `parent` up to and including its closing tag
    fn parse_content(&mut self, doc: &mut Document, parent: NodeId, depth: u16) -> Result<()> {
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            return Err(self.error_here(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }

        let mut last: Option<NodeId> = None;
        loop {
            let text_pos = self.cursor.position();
            let text = self.take_char_data()?;
            if escape::unescape(text).is_err() {
                return Err(Error::at(ErrorKind::InvalidEntity, text_pos));
            }
            match last {
                Some(prev) => doc.set_tail(prev, text.to_string()),
                None if !text.is_empty() => {
                    doc.expect_element_mut(parent)?.text = Some(text.to_string());
                }
                None => {}
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::Unterminated { what: "element" }));
            }

            if self.cursor.starts_with("</") {
                self.cursor.advance_by(2);
                let pos = self.cursor.position();
                let close = self.parse_name()?;
                let el = doc.expect_element_mut(parent)?;
                if close != el.name.as_str() {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: el.name.as_str().to_string(),
                            found: close.to_string(),
                        },
                        pos,
                    ));
                }
                el.close_space = self.cursor.take_whitespace().to_string();
                if el.text.is_none() && el.children.is_empty() {
                    // `<x></x>` stays distinct from `<x/>`
                    el.text = Some(String::new());
                }
                if !self.cursor.consume(b'>') {
                    return Err(self.error_here(ErrorKind::UnexpectedToken));
                }
                return Ok(());
            }

            let child = if self.cursor.starts_with("<!--") {
                let content = self.take_delimited("<!--", "-->", "comment")?;
                doc.alloc(Some(parent), NodeKind::Comment(content.to_string()))
            } else if self.cursor.starts_with("<?") {
                let content = self.take_delimited("<?", "?>", "processing instruction")?;
                doc.alloc(Some(parent), NodeKind::Instruction(content.to_string()))
            } else {
                let tag = self.parse_start_tag()?;
                let id = doc.alloc(Some(parent), NodeKind::Element(tag.element));
                doc.expect_element_mut(parent)?.children.push(id);
                if !tag.self_closing {
                    self.parse_content(doc, id, depth.saturating_add(1))?;
                }
                last = Some(id);
                continue;
            };
            doc.expect_element_mut(parent)?.children.push(child);
            last = Some(child);
        }
    }

    /// Raw character data up to the next markup, CDATA sections included
    fn take_char_data(&mut self) -> Result<&'a str> {
        let start = self.cursor.pos();
        loop {
            match self.cursor.current() {
                None => break,
                Some(b'<') => {
                    if self.cursor.starts_with("<![CDATA[") {
                        self.expect_past("]]>", "CDATA section")?;
                    } else {
                        break;
                    }
                }
                Some(_) => self.cursor.advance(),
            }
        }
        Ok(self.cursor.slice_from(start))
    }

    fn take_delimited(&mut self, open: &str, close: &str, what: &'static str) -> Result<&'a str> {
        self.cursor.advance_by(open.len());
        let start = self.cursor.pos();
        self.expect_past(close, what)?;
        let raw = self.cursor.slice_from(start);
        Ok(raw.strip_suffix(close).unwrap_or(raw))
    }

    fn expect_past(&mut self, pattern: &str, what: &'static str) -> Result<()> {
        let pos = self.cursor.position();
        if self.cursor.skip_past(pattern) {
            Ok(())
        } else {
            Err(Error::at(ErrorKind::Unterminated { what }, pos))
        }
    }

    fn parse_name(&mut self) -> Result<&'a str> {
        let start = self.cursor.pos();
        match self.cursor.current() {
            Some(b) if is_name_start(b) => self.cursor.advance(),
            _ => return Err(self.error_here(ErrorKind::UnexpectedToken)),
        }
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        Ok(self.cursor.slice_from(start))
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }
}

struct StartTag {
    element: Element,
    self_closing: bool,
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn detect_newline(source: &str) -> &'static str {
    match source.find('\n') {
        Some(idx) if idx > 0 && source.as_bytes().get(idx - 1) == Some(&b'\r') => CRLF,
        Some(_) => LF,
        None => CRLF,
    }
}
