//! Atom-level diffing of raw markup.
//!
//! Where [`HtmlDiffer`](crate::HtmlDiffer) compares the text of two parsed
//! documents, this engine compares their markup itself: tags, words and
//! delimiters, as they appear in the source. Tags that keep their name but
//! change attributes are refined down to the changed attribute words.

mod atom;
mod comparator;
mod differ;
mod output;

pub use atom::{Atom, AtomKind};
pub use comparator::{ArgumentComparator, AtomSplitter, TagComparator};
pub use differ::{TagDiffer, TextDiffOutput};
pub use output::TagMarkupOutput;
