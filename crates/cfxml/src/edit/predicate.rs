//! Element predicates and insertion positions

use crate::xml::model::ElementRef;

/// Test applied to child elements when locating an insertion point or a node to remove
pub trait Predicate {
    fn test(&self, el: ElementRef<'_>) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(ElementRef<'_>) -> bool,
{
    fn test(&self, el: ElementRef<'_>) -> bool {
        self(el)
    }
}

/// Exact match on local name plus optional trimmed text and attribute values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matcher {
    local: String,
    text: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Matcher {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            local: name.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

impl Predicate for Matcher {
    fn test(&self, el: ElementRef<'_>) -> bool {
        el.local_name() == self.local
            && self
                .text
                .as_deref()
                .is_none_or(|text| el.trimmed_text() == text)
            && self
                .attributes
                .iter()
                .all(|(name, value)| el.attribute(name).as_deref() == Some(value.as_str()))
    }
}

/// Where a new child goes among its siblings
#[derive(Clone, Copy)]
pub enum Position<'p> {
    /// After every existing child (unordered lists)
    AtEnd,
    /// Before the first child element matching the predicate, or at the end
    BeforeFirst(&'p dyn Predicate),
}

impl std::fmt::Debug for Position<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtEnd => f.write_str("AtEnd"),
            Self::BeforeFirst(_) => f.write_str("BeforeFirst(..)"),
        }
    }
}
