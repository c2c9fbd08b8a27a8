//! Structural editor
//!
//! Mutations are methods on [`Document`](crate::Document) that keep every
//! byte outside the touched node unchanged. Indentation for new content is
//! inferred from the surrounding whitespace on each call.

pub mod fragment;
mod indent;
mod mutate;
pub mod predicate;
pub mod section;

pub use fragment::NewElement;
pub use predicate::{Matcher, Position, Predicate};
pub use section::Section;
