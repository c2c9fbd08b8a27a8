//! Named sections with a canonical order

use tracing::debug;

use crate::edit::fragment::NewElement;
use crate::edit::predicate::Position;
use crate::error::Result;
use crate::xml::model::{Document, ElementRef, NodeId};

/// Closed set of sibling kinds with a fixed relative order.
///
/// `ORDER` lists every variant in the order the schema requires them to
/// appear inside their container.
pub trait Section: Copy + Eq + std::fmt::Debug + 'static {
    const ORDER: &'static [Self];

    fn local_name(self) -> &'static str;

    fn rank(self) -> usize {
        Self::ORDER
            .iter()
            .position(|&s| s == self)
            .unwrap_or(usize::MAX)
    }

    fn from_local_name(name: &str) -> Option<Self> {
        Self::ORDER.iter().copied().find(|s| s.local_name() == name)
    }
}

/// Predicate matching siblings that must stay after `section`
pub(crate) fn ranked_after<S: Section>(section: S) -> impl Fn(ElementRef<'_>) -> bool {
    let rank = section.rank();
    move |el: ElementRef<'_>| S::from_local_name(el.local_name()).is_some_and(|s| s.rank() > rank)
}

impl Document {
    /// Look up a section of `container` by local name
    pub fn find_section<S: Section>(&self, container: NodeId, section: S) -> Option<NodeId> {
        self.find_child(container, section.local_name())
    }

    /// Look up a section, creating it empty in canonical position when absent.
    ///
    /// The new section is placed before the first sibling ranked after it;
    /// siblings outside the closed set are ignored when ranking.
    pub fn find_or_create_section<S: Section>(
        &mut self,
        container: NodeId,
        section: S,
    ) -> Result<NodeId> {
        if let Some(existing) = self.find_section(container, section) {
            return Ok(existing);
        }

        let name = match self.expect_element(container)?.name().prefix() {
            Some(prefix) => format!("{prefix}:{}", section.local_name()),
            None => section.local_name().to_string(),
        };
        let after = ranked_after(section);
        let id = self.insert_child(container, NewElement::new(name), Position::BeforeFirst(&after))?;
        debug!(section = ?section, "created section");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;
    use crate::xml::writer::{write_document, Config};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Part {
        V,
        P,
        O,
        S,
        G,
    }

    impl Section for Part {
        const ORDER: &'static [Self] = &[Self::V, Self::P, Self::O, Self::S, Self::G];

        fn local_name(self) -> &'static str {
            match self {
                Self::V => "V",
                Self::P => "P",
                Self::O => "O",
                Self::S => "S",
                Self::G => "G",
            }
        }
    }

    #[test]
    fn test_rank_and_lookup() {
        assert_eq!(Part::O.rank(), 2);
        assert_eq!(Part::from_local_name("G"), Some(Part::G));
        assert_eq!(Part::from_local_name("X"), None);
    }

    #[test]
    fn test_scrambled_creation_yields_canonical_order() -> Result<()> {
        let mut doc = from_str("<Root>\r\n</Root>")?;
        let root = doc.root();
        for part in [Part::O, Part::G, Part::V] {
            doc.find_or_create_section(root, part)?;
        }
        assert_eq!(
            write_document(&doc, &Config::verbatim()),
            "<Root>\r\n\t<V/>\r\n\t<O/>\r\n\t<G/>\r\n</Root>"
        );
        Ok(())
    }

    #[test]
    fn test_creation_is_idempotent() -> Result<()> {
        let mut doc = from_str("<Root>\r\n\t<P/>\r\n</Root>")?;
        let root = doc.root();
        let first = doc.find_or_create_section(root, Part::S)?;
        let before = write_document(&doc, &Config::verbatim());
        let second = doc.find_or_create_section(root, Part::S)?;
        assert_eq!(first, second);
        assert_eq!(write_document(&doc, &Config::verbatim()), before);
        assert_eq!(doc.find_section(root, Part::S), Some(first));
        Ok(())
    }

    #[test]
    fn test_unknown_siblings_are_skipped() -> Result<()> {
        let mut doc = from_str("<Root>\r\n\t<Other/>\r\n\t<G/>\r\n</Root>")?;
        let root = doc.root();
        doc.find_or_create_section(root, Part::P)?;
        assert_eq!(
            write_document(&doc, &Config::verbatim()),
            "<Root>\r\n\t<Other/>\r\n\t<P/>\r\n\t<G/>\r\n</Root>"
        );
        Ok(())
    }

    #[test]
    fn test_section_inherits_container_prefix() -> Result<()> {
        let mut doc = from_str("<ci:Root xmlns:ci=\"urn:ci\"/>")?;
        let root = doc.root();
        let id = doc.find_or_create_section(root, Part::V)?;
        assert_eq!(doc.expect_element(id)?.name().as_str(), "ci:V");
        Ok(())
    }
}
