//! Edit sessions over configuration dump files
//!
//! Each operation works on a loaded [`Document`] through the structural
//! editor only and reports what it changed as an [`EditSummary`].

use std::fmt;
use std::ops::AddAssign;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::schema::ObjectType;
use crate::xml::{Document, NodeId};

pub mod child_objects;
pub mod command_interface;
pub mod properties;
pub mod subsystem;

pub use child_objects::{add_form, register_child, unregister_child};
pub use command_interface::{CommandInterface, InterfaceOp};
pub use properties::{add_list_items, remove_list_items, set_list_items, set_property};
pub use subsystem::{add_child_subsystem, add_content, remove_child_subsystem, remove_content};

/// Counts of entries added, removed and modified by an edit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EditSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl EditSummary {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified == 0
    }
}

impl AddAssign for EditSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.removed += rhs.removed;
        self.modified += rhs.modified;
    }
}

impl fmt::Display for EditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added: {}, removed: {}, modified: {}",
            self.added, self.removed, self.modified
        )
    }
}

/// The object described by a `MetaDataObject` file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataObject {
    pub object_type: ObjectType,
    pub node: NodeId,
    /// `Properties/Name`
    pub name: String,
}

impl MetadataObject {
    pub fn locate(doc: &Document) -> Result<Self> {
        let root = expect_root(doc, "MetaDataObject")?;
        let (object_type, node) = doc
            .child_elements(root)
            .find_map(|id| {
                let ty = ObjectType::from_local_name(doc.local_name(id)?)?;
                Some((ty, id))
            })
            .ok_or_else(|| Error::not_found("metadata object of a supported type"))?;
        let name = doc
            .find_path(node, &["Properties", "Name"])
            .and_then(|id| doc.get(id))
            .map(|el| el.trimmed_text())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::not_found(format!("{object_type}/Properties/Name")))?;
        Ok(Self {
            object_type,
            node,
            name,
        })
    }

    pub fn properties(&self, doc: &Document) -> Result<NodeId> {
        doc.find_child(self.node, "Properties")
            .ok_or_else(|| Error::not_found(format!("{}.{}/Properties", self.object_type, self.name)))
    }

    pub fn child_objects(&self, doc: &Document) -> Result<NodeId> {
        doc.find_child(self.node, "ChildObjects").ok_or_else(|| {
            Error::not_found(format!("{}.{}/ChildObjects", self.object_type, self.name))
        })
    }
}

/// Root element, checked by local name
pub fn expect_root(doc: &Document, local: &str) -> Result<NodeId> {
    let root = doc.root();
    let found = doc.local_name(root).unwrap_or_default();
    if found == local {
        return Ok(root);
    }
    Err(Error::new(
        ErrorKind::UnexpectedRoot {
            expected: local.to_string(),
            found: found.to_string(),
        },
        Span::empty(),
    ))
}

/// Prefix (with colon) to write names of `uri` inside `scope`.
///
/// Declares `preferred` on `scope` when nothing in scope binds the namespace.
pub(crate) fn prefix_in_scope(
    doc: &mut Document,
    scope: NodeId,
    uri: &str,
    preferred: &str,
) -> Result<String> {
    match doc.prefix_for(scope, uri) {
        Some(Some(prefix)) => Ok(format!("{prefix}:")),
        Some(None) => Ok(String::new()),
        None => {
            doc.set_attribute(scope, &format!("xmlns:{preferred}"), uri)?;
            Ok(format!("{preferred}:"))
        }
    }
}

/// Name for a child of `container` in the container's own namespace
pub(crate) fn sibling_name(doc: &Document, container: NodeId, local: &str) -> Result<String> {
    Ok(match doc.expect_element(container)?.name().prefix() {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    #[test]
    fn test_locate_object() -> Result<()> {
        let doc = from_str(
            "<MetaDataObject><Catalog><Properties><Name>Goods</Name></Properties><ChildObjects/></Catalog></MetaDataObject>",
        )?;
        let obj = MetadataObject::locate(&doc)?;
        assert_eq!(obj.object_type, ObjectType::Catalog);
        assert_eq!(obj.name, "Goods");
        assert!(obj.child_objects(&doc).is_ok());
        Ok(())
    }

    #[test]
    fn test_unexpected_root() -> Result<()> {
        let doc = from_str("<Form/>")?;
        let err = MetadataObject::locate(&doc).err().ok_or_else(|| Error::validation("located"))?;
        assert!(err.is_parse());
        assert_eq!(err.to_string(), "expected <MetaDataObject> root element, got <Form>");
        Ok(())
    }

    #[test]
    fn test_summary_accumulates() {
        let mut total = EditSummary::default();
        assert!(total.is_empty());
        total += EditSummary {
            added: 2,
            removed: 0,
            modified: 1,
        };
        total += EditSummary {
            added: 1,
            removed: 3,
            modified: 0,
        };
        assert_eq!(total.to_string(), "added: 3, removed: 3, modified: 1");
    }
}
