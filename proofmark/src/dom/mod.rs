//! The document tree: node kinds, the arena-backed tree and its surgery,
//! and the builder that turns parser events into a tree.

mod builder;
mod node;
mod tree;

pub use builder::DomTreeBuilder;
pub use node::{DomNode, NodeKind};
pub use tree::{BODY, CommonParent, DomTree, PRE};
