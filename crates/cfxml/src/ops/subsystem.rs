//! Subsystem content and nested subsystems

use tracing::{info, warn};

use crate::edit::{Matcher, NewElement, Position};
use crate::error::{Error, Result};
use crate::ops::{properties, sibling_name, EditSummary, MetadataObject};
use crate::schema::ObjectType;
use crate::xml::{Document, NodeId};

fn subsystem(doc: &Document) -> Result<MetadataObject> {
    let object = MetadataObject::locate(doc)?;
    if object.object_type != ObjectType::Subsystem {
        return Err(Error::validation(format!(
            "{}.{} is not a subsystem",
            object.object_type, object.name
        )));
    }
    Ok(object)
}

fn child_objects(doc: &Document) -> Result<NodeId> {
    subsystem(doc)?.child_objects(doc)
}

/// Add metadata object references (`Catalog.Goods`) to the subsystem content
pub fn add_content(doc: &mut Document, items: &[String]) -> Result<EditSummary> {
    subsystem(doc)?;
    properties::add_list_items(doc, "Content", items)
}

pub fn remove_content(doc: &mut Document, items: &[String]) -> Result<EditSummary> {
    subsystem(doc)?;
    properties::remove_list_items(doc, "Content", items)
}

/// Register a nested subsystem; an existing one only warns
pub fn add_child_subsystem(doc: &mut Document, name: &str) -> Result<EditSummary> {
    if name.is_empty() {
        return Err(Error::validation("subsystem name is empty"));
    }
    let container = child_objects(doc)?;
    let mut summary = EditSummary::default();
    let matcher = Matcher::local("Subsystem").with_text(name);
    if doc.find_matching(container, &matcher).is_some() {
        warn!("ChildObjects already contains: {name}");
        return Ok(summary);
    }
    let entry = NewElement::new(sibling_name(doc, container, "Subsystem")?).text(name);
    doc.insert_child(container, entry, Position::AtEnd)?;
    summary.added += 1;
    info!("Added child subsystem: {name}");
    Ok(summary)
}

pub fn remove_child_subsystem(doc: &mut Document, name: &str) -> Result<EditSummary> {
    let container = child_objects(doc)?;
    let mut summary = EditSummary::default();
    if doc.remove_named(container, "Subsystem", name)? {
        summary.removed += 1;
        info!("Removed child subsystem: {name}");
    } else {
        warn!("Child subsystem not found: {name}");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;
    use crate::schema::{XR_NS, XSI_NS};
    use crate::xml::{writer::write_document, WriteConfig};

    fn document() -> Result<Document> {
        from_str(&format!(
            "<MetaDataObject xmlns:xr=\"{XR_NS}\" xmlns:xsi=\"{XSI_NS}\">\r\n\t<Subsystem>\r\n\t\t<Properties>\r\n\t\t\t<Name>Sales</Name>\r\n\t\t\t<Content>\r\n\t\t\t\t<xr:Item xsi:type=\"xr:MDObjectRef\">Catalog.Goods</xr:Item>\r\n\t\t\t</Content>\r\n\t\t</Properties>\r\n\t\t<ChildObjects/>\r\n\t</Subsystem>\r\n</MetaDataObject>"
        ))
    }

    fn render(doc: &Document) -> String {
        write_document(doc, &WriteConfig::verbatim())
    }

    #[test]
    fn test_content_add_remove_roundtrip() -> Result<()> {
        let mut doc = document()?;
        let before = render(&doc);
        let items = vec!["Document.Order".to_string(), "Catalog.Goods".to_string()];
        assert_eq!(add_content(&mut doc, &items)?.added, 1);
        assert!(render(&doc).contains(
            "Catalog.Goods</xr:Item>\r\n\t\t\t\t<xr:Item xsi:type=\"xr:MDObjectRef\">Document.Order</xr:Item>\r\n\t\t\t</Content>"
        ));
        remove_content(&mut doc, &items[..1])?;
        assert_eq!(render(&doc), before);
        Ok(())
    }

    #[test]
    fn test_child_subsystems() -> Result<()> {
        let mut doc = document()?;
        let before = render(&doc);
        assert_eq!(add_child_subsystem(&mut doc, "Returns")?.added, 1);
        assert!(add_child_subsystem(&mut doc, "Returns")?.is_empty());
        assert!(render(&doc).contains(
            "\t\t<ChildObjects>\r\n\t\t\t<Subsystem>Returns</Subsystem>\r\n\t\t</ChildObjects>\r\n"
        ));
        assert_eq!(remove_child_subsystem(&mut doc, "Returns")?.removed, 1);
        assert_eq!(render(&doc), before);
        assert!(remove_child_subsystem(&mut doc, "Returns")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_requires_subsystem() -> Result<()> {
        let mut doc = from_str(
            "<MetaDataObject><Catalog><Properties><Name>X</Name><Content/></Properties></Catalog></MetaDataObject>",
        )?;
        let err = add_content(&mut doc, &["Catalog.X".to_string()]).err();
        assert!(err.is_some_and(|e| e.is_validation()));
        Ok(())
    }
}
