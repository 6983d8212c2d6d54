//! Comparison of ancestor chains.

use indextree::NodeId;
use snakepit::{RangeComparator, RangeDifference, find_differences};

use crate::narrative::ChangeTextGenerator;
use crate::{Attributes, DiffError, DiffSettings, DomTree, HtmlLayoutChange, Result};

/// A detached copy of one enclosing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSnapshot {
    /// Element name.
    pub name: String,
    /// Element attributes.
    pub attributes: Attributes,
}

/// The chain of tags enclosing a node, root first, as a comparable sequence.
///
/// Chains are snapshots: they hold copies of the tags, so comparing them never
/// touches the trees they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorComparator {
    chain: Vec<TagSnapshot>,
}

/// What changed between two ancestor chains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AncestorComparatorResult {
    /// Whether the chains differ at all.
    pub changed: bool,
    /// HTML narrative of the differences.
    pub changes: Option<String>,
    /// Plain-text narrative of the differences.
    pub summary: Option<String>,
    /// Tags added and removed.
    pub layout_changes: Vec<HtmlLayoutChange>,
}

impl AncestorComparator {
    /// A comparator over an explicit chain.
    pub fn new(chain: Vec<TagSnapshot>) -> Self {
        Self { chain }
    }

    /// The chain of tags enclosing `node` in `tree`.
    pub fn of(tree: &DomTree, node: NodeId) -> Self {
        let chain = tree
            .ancestors(node)
            .into_iter()
            .filter_map(|id| {
                let node = tree.node(id);
                Some(TagSnapshot {
                    name: node.tag_name()?.to_string(),
                    attributes: node.attributes()?.clone(),
                })
            })
            .collect();
        Self { chain }
    }

    /// The tags of the chain, root first.
    pub fn chain(&self) -> &[TagSnapshot] {
        &self.chain
    }

    /// The tag at `index`.
    pub fn ancestor(&self, index: usize) -> Result<&TagSnapshot> {
        self.chain.get(index).ok_or(DiffError::IndexOutOfRange {
            index,
            size: self.chain.len(),
        })
    }

    /// Differences from the `old` chain (left) to this one (right).
    pub fn differences(&self, old: &Self, settings: &DiffSettings) -> Result<Vec<RangeDifference>> {
        Ok(find_differences(&settings.lcs, old, self)?)
    }

    /// Compare this chain against the `old` one and describe the difference.
    pub fn get_result(&self, old: &Self, settings: &DiffSettings) -> Result<AncestorComparatorResult> {
        let differences = self.differences(old, settings)?;
        if differences.is_empty() {
            return Ok(AncestorComparatorResult::default());
        }
        let generator = ChangeTextGenerator::new(settings.vocabulary, &settings.change_text);
        let (text, layout_changes) = generator.generate(&differences, &old.chain, &self.chain);
        Ok(AncestorComparatorResult {
            changed: true,
            changes: Some(text.html().to_string()),
            summary: Some(text.plain().to_string()),
            layout_changes,
        })
    }
}

impl RangeComparator for AncestorComparator {
    fn range_count(&self) -> usize {
        self.chain.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        match (self.chain.get(own), other.chain.get(other_index)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomNode, TagChangeSemantic, Vocabulary};
    use proofmark_testhelpers::test;

    fn wrapped(name: &str) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let tag = tree.new_node(DomNode::tag(name, Attributes::new()));
        tree.add_child(tree.body(), tag, None).unwrap();
        let leaf = tree.new_node(DomNode::text("a"));
        tree.add_child(tag, leaf, None).unwrap();
        (tree, leaf)
    }

    #[test]
    fn container_swap_is_one_moved_difference() {
        let (old_tree, old_leaf) = wrapped("div");
        let (new_tree, new_leaf) = wrapped("span");
        let old = AncestorComparator::of(&old_tree, old_leaf);
        let new = AncestorComparator::of(&new_tree, new_leaf);
        let settings = DiffSettings::default();

        let differences = new.differences(&old, &settings).unwrap();
        assert_eq!(differences.len(), 1);
        let difference = differences[0];
        assert_eq!(difference.left(), 1..2);
        assert_eq!(difference.right(), 1..2);
        for tag in [old.ancestor(1).unwrap(), new.ancestor(1).unwrap()] {
            assert_eq!(Vocabulary::ENGLISH.semantic(&tag.name), TagChangeSemantic::Moved);
        }

        let result = new.get_result(&old, &settings).unwrap();
        assert!(result.changed);
        assert_eq!(result.layout_changes.len(), 2);
    }

    #[test]
    fn equal_chains_are_unchanged() {
        let (a, a_leaf) = wrapped("p");
        let (b, b_leaf) = wrapped("p");
        let result = AncestorComparator::of(&b, b_leaf)
            .get_result(&AncestorComparator::of(&a, a_leaf), &DiffSettings::default())
            .unwrap();
        assert_eq!(result, AncestorComparatorResult::default());
    }

    #[test]
    fn lookups_past_the_end_fail() {
        let (tree, leaf) = wrapped("p");
        let chain = AncestorComparator::of(&tree, leaf);
        assert_eq!(chain.chain().len(), 2);
        assert_eq!(
            chain.ancestor(5),
            Err(DiffError::IndexOutOfRange { index: 5, size: 2 })
        );
    }
}
