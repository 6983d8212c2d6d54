#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! # Proofmark
//!
//! Semantic diffing of HTML documents.
//!
//! Proofmark compares two documents by their text rather than by their
//! markup, and produces the newer document annotated with what changed:
//! added text wrapped in `<ins>`, removed text copied back in where it was
//! and wrapped in `<del>`, and text that stayed while its enclosing tags
//! changed wrapped in `<span class="diff-html-changed">`, together with a
//! readable description of the change.
//!
//! ## Pipeline
//!
//! 1. A parser feeds [`ContentHandler`] events to a [`DomTreeBuilder`], which
//!    cuts text into words and builds a [`DomTree`]. Parsing itself is not
//!    part of this crate; see `proofmark-html`.
//! 2. [`HtmlDiffer`] flattens both trees into their leaves
//!    ([`TextNodeComparator`]), diffs the leaf sequences with `snakepit`, and
//!    marks [`Modification`]s on the newer tree.
//! 3. The resulting [`AnnotatedDocument`] renders itself as events to any
//!    [`ContentHandler`], or as markup through a [`MarkupWriter`].
//!
//! ## Usage
//!
//! ```
//! use proofmark::{Attributes, ContentHandler, DomTreeBuilder, HtmlDiffer, Vocabulary};
//!
//! fn paragraph(text: &str) -> proofmark::Result<proofmark::DomTree> {
//!     let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
//!     builder.start_document()?;
//!     builder.start_element("p", &Attributes::new())?;
//!     builder.characters(text)?;
//!     builder.end_element("p")?;
//!     builder.end_document()?;
//!     builder.finish()
//! }
//!
//! let old = paragraph("This is a blue book").unwrap();
//! let new = paragraph("This is a big blue book").unwrap();
//! let markup = HtmlDiffer::default().diff(old, new).unwrap().to_markup().unwrap();
//! assert!(markup.contains(">big </ins>"));
//! ```
//!
//! The [`tag`] module holds a second, coarser engine that diffs raw markup
//! token by token.

mod ancestor;
mod differ;
mod dom;
mod error;
mod handler;
mod macros;
mod modification;
mod narrative;
mod output;
mod settings;
mod text_comparator;
mod vocabulary;

pub mod tag;

pub use ancestor::{AncestorComparator, AncestorComparatorResult, TagSnapshot};
pub use differ::{AnnotatedDocument, HtmlDiffer};
pub use dom::{BODY, CommonParent, DomNode, DomTree, DomTreeBuilder, NodeKind, PRE};
pub use error::{DiffError, Result};
pub use handler::{Attributes, ContentHandler, MarkupWriter};
pub use modification::{Modification, ModificationLink, ModificationType};
pub use narrative::{ChangeText, ChangeTextGenerator, HtmlLayoutChange, LayoutChangeType};
pub use settings::{ChangeTextSettings, DiffSettings};
pub use text_comparator::TextNodeComparator;
pub use vocabulary::{Phrases, TagChangeSemantic, TagPhrase, Vocabulary};

pub use indextree::NodeId;
pub use snakepit::{DifferenceKind, LcsSettings, RangeDifference};
