//! Object property edits: scalar, multilingual and reference lists

use tracing::{info, warn};

use crate::edit::{NewElement, Position};
use crate::error::{Error, Result};
use crate::ops::{prefix_in_scope, EditSummary, MetadataObject};
use crate::schema::{is_multilingual, list_item, ListItem, DEFAULT_LANG, XR_NS, XSI_NS};
use crate::xml::{Document, ElementRef, NodeId};

fn property(doc: &Document, name: &str) -> Result<NodeId> {
    let object = MetadataObject::locate(doc)?;
    let properties = object.properties(doc)?;
    doc.find_child(properties, name).ok_or_else(|| {
        Error::not_found(format!(
            "property {name} of {}.{}",
            object.object_type, object.name
        ))
    })
}

fn list_property(doc: &Document, name: &str) -> Result<(NodeId, ListItem)> {
    let shape = list_item(name)
        .ok_or_else(|| Error::validation(format!("{name} is not a list property")))?;
    Ok((property(doc, name)?, shape))
}

fn list_entry(doc: &mut Document, prop: NodeId, shape: ListItem, value: &str) -> Result<NewElement> {
    let xr = prefix_in_scope(doc, prop, XR_NS, "xr")?;
    let mut entry = NewElement::new(format!("{xr}{}", shape.local));
    if shape.object_ref {
        let xsi = prefix_in_scope(doc, prop, XSI_NS, "xsi")?;
        entry = entry.attr(format!("{xsi}type"), format!("{xr}MDObjectRef"));
    }
    Ok(entry.text(value))
}

fn list_values(doc: &Document, prop: NodeId) -> Vec<String> {
    doc.child_elements(prop)
        .filter_map(|id| doc.get(id))
        .map(|el| el.trimmed_text())
        .collect()
}

/// Set a property of the object in `doc`.
///
/// Multilingual properties get a single item in the default language and
/// list properties take `;;`-separated values.
pub fn set_property(doc: &mut Document, name: &str, value: &str) -> Result<EditSummary> {
    if list_item(name).is_some() {
        let items: Vec<String> = value
            .split(";;")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        return set_list_items(doc, name, &items);
    }

    let prop = property(doc, name)?;
    let changed = if is_multilingual(name) {
        doc.set_multilingual_text(prop, DEFAULT_LANG, value)?
    } else {
        doc.set_scalar_text(prop, value)?
    };
    if changed {
        info!("Set {name} = \"{value}\"");
    } else {
        warn!("{name} already is \"{value}\"");
    }
    Ok(EditSummary {
        modified: usize::from(changed),
        ..EditSummary::default()
    })
}

/// Append entries to a list property, skipping values already present
pub fn add_list_items(doc: &mut Document, name: &str, items: &[String]) -> Result<EditSummary> {
    let (prop, shape) = list_property(doc, name)?;
    let mut summary = EditSummary::default();
    for item in items {
        if list_values(doc, prop).contains(item) {
            warn!("{name} already contains: {item}");
            continue;
        }
        let entry = list_entry(doc, prop, shape, item)?;
        doc.insert_child(prop, entry, Position::AtEnd)?;
        summary.added += 1;
        info!("Added to {name}: {item}");
    }
    Ok(summary)
}

/// Remove entries from a list property; missing values only warn
pub fn remove_list_items(doc: &mut Document, name: &str, items: &[String]) -> Result<EditSummary> {
    let (prop, _) = list_property(doc, name)?;
    let mut summary = EditSummary::default();
    for item in items {
        let matches = |el: ElementRef<'_>| el.trimmed_text() == *item;
        if doc.remove_child(prop, &matches)?.is_some() {
            summary.removed += 1;
            info!("Removed from {name}: {item}");
        } else {
            warn!("{name} item not found: {item}");
        }
    }
    Ok(summary)
}

/// Replace all entries of a list property; an empty list writes `<Name/>`
pub fn set_list_items(doc: &mut Document, name: &str, items: &[String]) -> Result<EditSummary> {
    let (prop, shape) = list_property(doc, name)?;
    if list_values(doc, prop) == items {
        warn!("{name} already holds the requested items");
        return Ok(EditSummary::default());
    }

    let mut summary = EditSummary {
        removed: doc.child_elements(prop).count(),
        ..EditSummary::default()
    };
    doc.clear_children(prop)?;
    for item in items {
        let entry = list_entry(doc, prop, shape, item)?;
        doc.insert_child(prop, entry, Position::AtEnd)?;
        summary.added += 1;
    }
    info!("Set {name}: {} items", items.len());
    Ok(summary)
}
