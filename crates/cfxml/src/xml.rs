//! Lossless XML model, parser and writer

pub mod escape;
pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Attribute, Document, Element, ElementRef, NodeId, NodeKind, QName};
pub use parser::{Config as ParseConfig, Parser};
pub use writer::{Config as WriteConfig, LineEnding};
