//! cfxml - format-preserving editor for 1C:Enterprise configuration dumps
//!
//! Dump files are loaded into a lossless tree, edited structurally and
//! written back so that a diff against the original shows only the edit.
//!
//! # Quick Start
//!
//! ```
//! use cfxml::{from_str, NewElement, Position};
//! # fn main() -> Result<(), cfxml::Error> {
//! let mut doc = from_str("<ChildObjects>\r\n\t\t\t<Form>FormA</Form>\r\n\t\t</ChildObjects>")?;
//! let root = doc.root();
//! doc.insert_child(root, NewElement::new("Form").text("FormB"), Position::AtEnd)?;
//! assert_eq!(
//!     cfxml::to_string_with(&doc, &cfxml::WriteConfig::verbatim()),
//!     "<ChildObjects>\r\n\t\t\t<Form>FormA</Form>\r\n\t\t\t<Form>FormB</Form>\r\n\t\t</ChildObjects>"
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

mod cursor;

pub mod xml;
pub use xml::{
    Document, Element, ElementRef, LineEnding, NodeId, NodeKind, ParseConfig, Parser, QName,
    WriteConfig,
};

pub mod edit;
pub use edit::{Matcher, NewElement, Position, Predicate, Section};

pub mod schema;
pub use schema::{ChildObjectKind, CommandInterfaceSection, FormPurpose, ObjectType};

pub mod ops;
pub use ops::{EditSummary, MetadataObject};

pub mod report;

pub mod store;
pub use store::{load, load_with, save, save_with};

/// Parse a document from a string
pub fn from_str(s: &str) -> Result<Document> {
    Parser::new(s).parse()
}

/// Parse with custom limits
pub fn from_str_with_config(s: &str, config: ParseConfig) -> Result<Document> {
    Parser::with_config(s, config).parse()
}

/// Serialize in dump conventions (BOM, XML declaration, CRLF)
pub fn to_string(doc: &Document) -> String {
    xml::writer::write_document(doc, &WriteConfig::default())
}

pub fn to_string_with(doc: &Document, config: &WriteConfig) -> String {
    xml::writer::write_document(doc, config)
}
