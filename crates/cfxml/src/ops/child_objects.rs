//! Registration of forms, templates, commands and other child objects

use tracing::{info, warn};

use crate::edit::section::ranked_after;
use crate::edit::{NewElement, Position, Section};
use crate::error::{Error, Result};
use crate::ops::{sibling_name, EditSummary, MetadataObject};
use crate::schema::{ChildObjectKind, FormPurpose};
use crate::xml::{Document, ElementRef};

/// Name of a `ChildObjects` entry: its text, or `Properties/Name` for full definitions
fn entry_name(el: ElementRef<'_>) -> String {
    let text = el.trimmed_text();
    if !text.is_empty() {
        return text;
    }
    el.child("Properties")
        .and_then(|props| props.child("Name"))
        .map(|name| name.trimmed_text())
        .unwrap_or_default()
}

fn is_entry(kind: ChildObjectKind, name: &str) -> impl Fn(ElementRef<'_>) -> bool + '_ {
    move |el: ElementRef<'_>| el.local_name() == kind.local_name() && entry_name(el) == name
}

/// Add `<Kind>name</Kind>` to the object's `ChildObjects` in canonical position
pub fn register_child(doc: &mut Document, kind: ChildObjectKind, name: &str) -> Result<EditSummary> {
    if name.is_empty() {
        return Err(Error::validation(format!("{kind} name is empty")));
    }
    let object = MetadataObject::locate(doc)?;
    if !object.object_type.allowed_children().contains(&kind) {
        return Err(Error::validation(format!(
            "{} cannot have {kind} children",
            object.object_type
        )));
    }
    let container = object.child_objects(doc)?;
    if doc.find_matching(container, &is_entry(kind, name)).is_some() {
        return Err(Error::conflict(format!(
            "{kind} {name} in {}.{}",
            object.object_type, object.name
        )));
    }

    let entry = NewElement::new(sibling_name(doc, container, kind.local_name())?).text(name);
    let later = ranked_after(kind);
    doc.insert_child(container, entry, Position::BeforeFirst(&later))?;
    info!("Registered: <{kind}>{name}</{kind}> in ChildObjects");
    Ok(EditSummary {
        added: 1,
        ..EditSummary::default()
    })
}

/// Remove a `ChildObjects` entry and clear properties that referred to it.
///
/// A missing entry is reported with a warning, not an error.
pub fn unregister_child(
    doc: &mut Document,
    kind: ChildObjectKind,
    name: &str,
) -> Result<EditSummary> {
    let object = MetadataObject::locate(doc)?;
    let container = object.child_objects(doc)?;
    let mut summary = EditSummary::default();
    if doc.remove_child(container, &is_entry(kind, name))?.is_none() {
        warn!("{kind} {name} not found in ChildObjects");
        return Ok(summary);
    }
    summary.removed += 1;
    info!("Removed: <{kind}>{name}</{kind}> from ChildObjects");

    let reference = match kind {
        ChildObjectKind::Form => format!(".Form.{name}"),
        ChildObjectKind::Template => format!(".Template.{name}"),
        _ => return Ok(summary),
    };
    let Ok(properties) = object.properties(doc) else {
        return Ok(summary);
    };
    let pointing: Vec<_> = doc
        .child_elements(properties)
        .filter(|&id| {
            doc.get(id).is_some_and(|el| {
                let local = el.local_name();
                let refers = match kind {
                    ChildObjectKind::Form => local.starts_with("Default") && local.ends_with("Form"),
                    _ => local == "MainDataCompositionSchema",
                };
                refers && el.trimmed_text().ends_with(reference.as_str())
            })
        })
        .collect();
    for id in pointing {
        if doc.set_scalar_text(id, "")? {
            summary.modified += 1;
            info!("Cleared {}", doc.local_name(id).unwrap_or_default());
        }
    }
    Ok(summary)
}

/// Register a form for `purpose` and make it the default when asked or when none is set
pub fn add_form(
    doc: &mut Document,
    name: &str,
    purpose: FormPurpose,
    set_default: bool,
) -> Result<EditSummary> {
    let object = MetadataObject::locate(doc)?;
    purpose.check(object.object_type)?;
    let mut summary = register_child(doc, ChildObjectKind::Form, name)?;

    let property = purpose.default_property(object.object_type);
    let default = object
        .properties(doc)
        .ok()
        .and_then(|props| doc.find_child(props, property));
    let Some(default) = default else {
        return Ok(summary);
    };
    let unset = doc
        .get(default)
        .is_some_and(|el| el.trimmed_text().is_empty());
    if set_default || unset {
        let value = format!("{}.{}.Form.{name}", object.object_type, object.name);
        if doc.set_scalar_text(default, &value)? {
            summary.modified += 1;
            info!("{property}: {value}");
        }
    }
    Ok(summary)
}
