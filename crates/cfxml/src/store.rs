//! Reading and writing dump files

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::{Document, ParseConfig, Parser, WriteConfig};
use crate::xml::writer::write_document;

/// Load a dump file with the default parser limits
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    load_with(path, ParseConfig::default())
}

/// Load a dump file.
///
/// A missing file is `NotFound`; bytes that are not UTF-8 are a parse error.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_with(path: impl AsRef<Path>, config: ParseConfig) -> Result<Document> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(&e, path))?;
    let source = String::from_utf8(bytes).map_err(|e| {
        Error::with_message(
            ErrorKind::InvalidUtf8,
            Span::empty(),
            format!("{}: invalid UTF-8 at byte {}", path.display(), e.utf8_error().valid_up_to()),
        )
    })?;
    let doc = Parser::with_config(&source, config).parse()?;
    debug!(bytes = source.len(), nodes = doc.nodes.len(), "loaded");
    Ok(doc)
}

/// Save in dump conventions: BOM, XML declaration, CRLF
pub fn save(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    save_with(doc, path, &WriteConfig::default())
}

/// Serialize and overwrite `path` in a single write
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save_with(doc: &Document, path: impl AsRef<Path>, config: &WriteConfig) -> Result<()> {
    let path = path.as_ref();
    let out = write_document(doc, config);
    fs::write(path, out.as_bytes()).map_err(|e| Error::io(&e, path))?;
    debug!(bytes = out.len(), "saved");
    Ok(())
}
