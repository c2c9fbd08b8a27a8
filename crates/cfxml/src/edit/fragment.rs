//! Detached element trees waiting to be inserted

/// Element to be inserted, laid out by the editor on insertion
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewElement {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<NewElement>,
}

impl NewElement {
    /// `name` is the qualified name as it should be written, e.g. `xr:Item`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Unescaped text content; an empty string still writes `<x></x>`
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
