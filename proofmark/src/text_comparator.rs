//! The leaf sequence of a document and the bookkeeping of its modifications.

use indextree::NodeId;
use snakepit::{LcsSettings, RangeComparator, find_differences};

use crate::ancestor::AncestorComparator;
use crate::macros::trace;
use crate::narrative::ChangeTextGenerator;
use crate::{
    CommonParent, DiffError, DiffSettings, DomTree, Modification, ModificationLink,
    ModificationType, NodeKind, Result,
};

/// A document as the ordered sequence of its leaves.
///
/// Leaves compare by their normalized text. Marking operations attach
/// [`Modification`]s to leaves; runs of leaves marked together share an id,
/// and every run is recorded in a history that links neighboring runs.
#[derive(Debug, Clone)]
pub struct TextNodeComparator {
    tree: DomTree,
    leaves: Vec<NodeId>,
    history: Vec<ModificationLink>,
    new_id: u64,
    changed_id: u64,
    changed_id_used: bool,
    deleted_id: u64,
    white_after_last_changed_part: bool,
}

impl TextNodeComparator {
    /// Flatten `tree` into its leaf sequence.
    pub fn new(tree: DomTree) -> Self {
        let leaves = tree.leaves().to_vec();
        Self {
            tree,
            leaves,
            history: Vec::new(),
            new_id: 0,
            changed_id: 0,
            changed_id_used: false,
            deleted_id: 0,
            white_after_last_changed_part: false,
        }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Consume the comparator, returning its tree.
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// The leaf at `index`.
    pub fn leaf(&self, index: usize) -> Result<NodeId> {
        self.leaves
            .get(index)
            .copied()
            .ok_or(DiffError::IndexOutOfRange {
                index,
                size: self.leaves.len(),
            })
    }

    /// Runs in the order they were marked.
    pub fn history(&self) -> &[ModificationLink] {
        &self.history
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if end > self.leaves.len() {
            return Err(DiffError::IndexOutOfRange {
                index: end.max(start),
                size: self.leaves.len(),
            });
        }
        Ok(())
    }

    fn record(&mut self, output: ModificationType, id: u64) -> usize {
        let sequence = self.history.len();
        self.history.push(ModificationLink { output, id });
        sequence
    }

    /// Text of the leaves in `start..end`, with a single space wherever
    /// whitespace separated two of them.
    pub fn text_of(&self, start: usize, end: usize) -> Result<String> {
        self.check_range(start, end)?;
        let mut text = String::new();
        for (i, &leaf) in self.leaves[start..end].iter().enumerate() {
            let node = self.tree.node(leaf);
            if i > 0 && node.white_before && !text.ends_with(' ') {
                text.push(' ');
            }
            text.push_str(node.text_content());
            if node.white_after && start + i + 1 < end {
                text.push(' ');
            }
        }
        Ok(text)
    }

    /// Mark the leaves in `start..end` as added, rendered as `output`.
    pub fn mark_as_new(&mut self, start: usize, end: usize, output: ModificationType) -> Result<()> {
        if end <= start {
            return Ok(());
        }
        self.check_range(start, end)?;
        if self.white_after_last_changed_part {
            let first = self.leaves[start];
            self.tree.node_mut(first).white_before = false;
        }

        let id = self.new_id;
        let sequence = self.record(output, id);
        for (i, leaf) in self.leaves[start..end].to_vec().into_iter().enumerate() {
            let mut modification = Modification::new(ModificationType::Added, output, id, sequence);
            modification.first_of_id = i == 0;
            self.tree.node_mut(leaf).modification = Some(modification);
        }
        self.new_id += 1;
        trace!(start, end, id, "marked as new");
        Ok(())
    }

    /// Mark the leaves in `start..end` as changed in place, their old text
    /// being `old_text`.
    pub fn mark_as_changed_text(
        &mut self,
        start: usize,
        end: usize,
        old_text: &str,
        settings: &DiffSettings,
    ) -> Result<()> {
        if end <= start {
            return Ok(());
        }
        self.check_range(start, end)?;
        if self.changed_id_used {
            self.changed_id += 1;
        }
        let text = ChangeTextGenerator::new(settings.vocabulary, &settings.change_text)
            .changed_from(old_text);

        let id = self.changed_id;
        let sequence = self.record(ModificationType::Changed, id);
        for (i, leaf) in self.leaves[start..end].to_vec().into_iter().enumerate() {
            let mut modification =
                Modification::new(ModificationType::Changed, ModificationType::Changed, id, sequence);
            modification.first_of_id = i == 0;
            modification.changes = Some(text.html().to_string());
            modification.summary = Some(text.plain().to_string());
            self.tree.node_mut(leaf).modification = Some(modification);
        }
        self.changed_id_used = true;
        trace!(start, end, id, "marked as changed text");
        Ok(())
    }

    /// Mark the leaves in `start..end` of `other` as removed, and copy them
    /// into this tree so they render just before this tree's leaf `before`.
    ///
    /// The removed content is copied as the fewest whole subtrees covering it.
    /// Each one attaches next to the previous or the next neighboring leaf,
    /// whichever shares the deeper common ancestor with it; containers are
    /// split as needed to put it in the right place.
    pub fn mark_as_deleted(
        &mut self,
        start: usize,
        end: usize,
        other: &mut TextNodeComparator,
        before: usize,
        output: ModificationType,
    ) -> Result<()> {
        if end <= start {
            return Ok(());
        }
        other.check_range(start, end)?;
        if before > self.leaves.len() {
            return Err(DiffError::IndexOutOfRange {
                index: before,
                size: self.leaves.len(),
            });
        }

        self.white_after_last_changed_part =
            before > 0 && self.tree.node(self.leaves[before - 1]).white_after;

        let id = self.deleted_id;
        let sequence = self.record(output, id);
        for (i, leaf) in other.leaves[start..end].to_vec().into_iter().enumerate() {
            let mut modification = Modification::new(ModificationType::Removed, output, id, sequence);
            modification.first_of_id = i == 0;
            other.tree.node_mut(leaf).modification = Some(modification);
        }

        let mut deleted = other.tree.minimal_deleted_set(id);
        trace!(start, end, id, subtrees = deleted.len(), "marked as deleted");

        let mut prev_leaf = before.checked_sub(1).map(|i| self.leaves[i]);
        let mut next_leaf = self.leaves.get(before).copied();

        loop {
            let (Some(&first), Some(&last)) = (deleted.first(), deleted.last()) else {
                break;
            };
            let mut prev = match prev_leaf {
                Some(leaf) => self.tree.last_common_parent(leaf, &other.tree, first),
                None => CommonParent {
                    parent: self.tree.body(),
                    depth: 0,
                    index: -1,
                    splitting_needed: false,
                },
            };
            let mut next = match next_leaf {
                Some(leaf) => self.tree.last_common_parent(leaf, &other.tree, last),
                None => CommonParent {
                    parent: self.tree.body(),
                    depth: 0,
                    index: isize::try_from(self.tree.child_count(self.tree.body()))
                        .unwrap_or(isize::MAX),
                    splitting_needed: false,
                },
            };

            if prev.depth == next.depth {
                let same_source_parent = other.tree.parent(first) == other.tree.parent(last);
                if same_source_parent && prev.parent == next.parent {
                    prev.depth += 1;
                } else {
                    let distance_prev = match other.tree.parent(first) {
                        Some(p) => text_distance(&other.tree, p, &self.tree, prev.parent)?,
                        None => 1.0,
                    };
                    let distance_next = match other.tree.parent(last) {
                        Some(p) => text_distance(&other.tree, p, &self.tree, next.parent)?,
                        None => 1.0,
                    };
                    if distance_prev <= distance_next {
                        prev.depth += 1;
                    } else {
                        next.depth += 1;
                    }
                }
            }

            if prev.depth > next.depth {
                if let Some(leaf) = prev_leaf.filter(|_| prev.splitting_needed) {
                    if let Some(parent) = self.tree.parent(leaf) {
                        self.tree.split_until(parent, prev.parent, leaf, true)?;
                    }
                }
                deleted.remove(0);
                let copy = self.tree.copy_subtree_from(&other.tree, first)?;
                self.tree.insert_at(prev.parent, prev.index + 1, copy)?;
                trace!(?copy, index = prev.index + 1, "placed removed content after previous");
                prev_leaf = Some(copy);
            } else {
                if let Some(leaf) = next_leaf.filter(|_| next.splitting_needed) {
                    if let Some(parent) = self.tree.parent(leaf) {
                        if self.tree.split_until(parent, next.parent, leaf, false)? {
                            next.index += 1;
                        }
                    }
                }
                deleted.pop();
                let copy = self.tree.copy_subtree_from(&other.tree, last)?;
                self.tree.insert_at(next.parent, next.index, copy)?;
                trace!(?copy, index = next.index, "placed removed content before next");
                next_leaf = Some(copy);
            }
        }

        self.deleted_id += 1;
        Ok(())
    }

    /// Look for changes to the enclosing tags of a stretch of leaves that
    /// match text for text: `left_start..left_end` of `other` against
    /// `right_start..right_end` of this comparator. Leaves pair up in order;
    /// the longer stretch has its excess ignored.
    ///
    /// Consecutive leaves with the same structural change form one changed
    /// run.
    pub fn handle_possible_changed_part(
        &mut self,
        left_start: usize,
        left_end: usize,
        right_start: usize,
        right_end: usize,
        other: &TextNodeComparator,
        settings: &DiffSettings,
    ) -> Result<()> {
        self.check_range(right_start, right_end)?;
        other.check_range(left_start, left_end)?;

        if self.changed_id_used {
            self.changed_id += 1;
            self.changed_id_used = false;
        }
        let mut last_changes: Option<String> = None;
        let mut sequence = self.history.len();

        for (i, j) in (right_start..right_end).zip(left_start..left_end) {
            let (leaf, other_leaf) = (self.leaves[i], other.leaves[j]);
            if matches!(self.tree.node(leaf).kind, NodeKind::Separator) {
                continue;
            }
            let new = AncestorComparator::of(&self.tree, leaf);
            let old = AncestorComparator::of(&other.tree, other_leaf);
            let result = new.get_result(&old, settings)?;

            if result.changed {
                let starts_run = if !self.changed_id_used {
                    true
                } else if result.changes != last_changes {
                    self.changed_id += 1;
                    true
                } else {
                    false
                };
                if starts_run {
                    sequence = self.record(ModificationType::Changed, self.changed_id);
                }
                let mut modification = Modification::new(
                    ModificationType::Changed,
                    ModificationType::Changed,
                    self.changed_id,
                    sequence,
                );
                modification.first_of_id = starts_run;
                modification.changes = result.changes.clone();
                modification.summary = result.summary;
                modification.layout_changes = result.layout_changes;
                self.tree.node_mut(leaf).modification = Some(modification);
                last_changes = result.changes;
                self.changed_id_used = true;
            } else if self.changed_id_used {
                self.changed_id += 1;
                self.changed_id_used = false;
            }
        }
        Ok(())
    }

    /// Link every modification in the tree to the runs marked just before
    /// and just after its own.
    pub fn link_modifications(&mut self) {
        let body = self.tree.body();
        let nodes: Vec<NodeId> = self.tree.descendants(body).collect();
        for id in nodes {
            let history = &self.history;
            if let Some(modification) = self.tree.node_mut(id).modification.as_mut() {
                let sequence = modification.sequence;
                modification.previous = sequence
                    .checked_sub(1)
                    .and_then(|i| history.get(i))
                    .copied();
                modification.next = history.get(sequence + 1).copied();
            }
        }
    }

    /// Replace whitespace flags by space leaves throughout the tree.
    pub fn expand_whitespace(&mut self) -> Result<()> {
        let body = self.tree.body();
        self.tree.expand_whitespace(body)
    }
}

impl RangeComparator for TextNodeComparator {
    fn range_count(&self) -> usize {
        self.leaves.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        match (self.leaves.get(own), other.leaves.get(other_index)) {
            (Some(&a), Some(&b)) => self.tree.node(a).same_text(other.tree.node(b)),
            _ => false,
        }
    }
}

/// The text leaves below one container.
struct TextOnlyComparator<'a> {
    tree: &'a DomTree,
    leaves: Vec<NodeId>,
}

impl<'a> TextOnlyComparator<'a> {
    fn new(tree: &'a DomTree, container: NodeId) -> Self {
        Self {
            tree,
            leaves: tree.text_leaves(container),
        }
    }
}

impl RangeComparator for TextOnlyComparator<'_> {
    fn range_count(&self) -> usize {
        self.leaves.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        match (self.leaves.get(own), other.leaves.get(other_index)) {
            (Some(&a), Some(&b)) => self.tree.node(a).same_text(other.tree.node(b)),
            _ => false,
        }
    }
}

/// Characters of a string.
pub(crate) struct CharComparator {
    chars: Vec<char>,
}

impl CharComparator {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl RangeComparator for CharComparator {
    fn range_count(&self) -> usize {
        self.chars.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        self.chars.get(own) == other.chars.get(other_index)
    }
}

/// Share of two sequences left unmatched, averaged over both sides: zero for
/// equal sequences, one for sequences with nothing in common. An empty side
/// counts as entirely unmatched.
fn distance<C: RangeComparator>(settings: &LcsSettings, left: &C, right: &C) -> Result<f64> {
    let (left_count, right_count) = (left.range_count(), right.range_count());
    let differences = find_differences(settings, left, right)?;
    let left_unmatched: usize = differences.iter().map(|d| d.left_len()).sum();
    let right_unmatched: usize = differences.iter().map(|d| d.right_len()).sum();
    let share = |unmatched: usize, count: usize| {
        if count == 0 {
            1.0
        } else {
            unmatched as f64 / count as f64
        }
    };
    Ok((share(left_unmatched, left_count) + share(right_unmatched, right_count)) / 2.0)
}

/// Text distance between the leaves below `a` and the leaves below `b`.
pub(crate) fn text_distance(
    tree_a: &DomTree,
    a: NodeId,
    tree_b: &DomTree,
    b: NodeId,
) -> Result<f64> {
    let settings = LcsSettings {
        too_long: 150.0 * 150.0,
        ..LcsSettings::default()
    };
    distance(
        &settings,
        &TextOnlyComparator::new(tree_a, a),
        &TextOnlyComparator::new(tree_b, b),
    )
}

/// Share of characters the two texts have in common.
pub(crate) fn match_ratio(settings: &LcsSettings, old: &str, new: &str) -> Result<f64> {
    Ok(1.0 - distance(settings, &CharComparator::new(old), &CharComparator::new(new))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, ContentHandler, DomTreeBuilder, Vocabulary};
    use proofmark_testhelpers::test;

    fn paragraph(text: &str) -> TextNodeComparator {
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        builder.start_document().unwrap();
        builder.start_element("p", &Attributes::new()).unwrap();
        builder.characters(text).unwrap();
        builder.end_element("p").unwrap();
        builder.end_document().unwrap();
        TextNodeComparator::new(builder.finish().unwrap())
    }

    fn modification(comparator: &TextNodeComparator, index: usize) -> Option<&Modification> {
        let leaf = comparator.leaf(index).unwrap();
        comparator.tree().node(leaf).modification.as_ref()
    }

    #[test]
    fn leaves_compare_by_text() {
        let old = paragraph("This is a blue book");
        let new = paragraph("This is a big blue book");
        let differences = find_differences(&LcsSettings::default(), &old, &new).unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].left(), 3..3);
        assert_eq!(differences[0].right(), 3..4);
    }

    #[test]
    fn a_run_has_one_head() {
        let mut new = paragraph("one two three four");
        new.mark_as_new(1, 3, ModificationType::Added).unwrap();
        new.link_modifications();

        let marked: Vec<&Modification> = (1..3).filter_map(|i| modification(&new, i)).collect();
        assert_eq!(marked.len(), 2);
        assert_eq!(marked.iter().filter(|m| m.first_of_id).count(), 1);
        assert!(marked[0].first_of_id);
        assert!(marked.iter().all(|m| m.id == 0 && m.kind == ModificationType::Added));
        assert!(modification(&new, 0).is_none());
        assert_eq!(new.history().len(), 1);
        assert_eq!(marked[0].previous, None);
        assert_eq!(marked[0].next, None);
    }

    #[test]
    fn neighboring_runs_link_to_each_other() {
        let mut new = paragraph("one two three four");
        new.mark_as_new(0, 1, ModificationType::Added).unwrap();
        new.mark_as_new(2, 3, ModificationType::Added).unwrap();
        new.link_modifications();
        let first = modification(&new, 0).unwrap();
        let second = modification(&new, 2).unwrap();
        assert_eq!(first.next, Some(second.link()));
        assert_eq!(second.previous, Some(first.link()));
        assert_eq!(second.id, 1);
    }

    #[test]
    fn removed_leaves_are_copied_in_place() {
        let mut old = paragraph("This is a blue book");
        let mut new = paragraph("This is a book");
        new.mark_as_deleted(3, 4, &mut old, 3, ModificationType::Removed)
            .unwrap();

        let removed = modification(&old, 3).unwrap();
        assert_eq!(removed.kind, ModificationType::Removed);
        assert!(removed.first_of_id);

        let p = new.tree().child_at(new.tree().body(), 0).unwrap();
        let words: Vec<&str> = new
            .tree()
            .children(p)
            .map(|id| new.tree().node(id).text_content())
            .collect();
        assert_eq!(words, ["This", "is", "a", "blue", "book", ""]);
        let copy = new.tree().child_at(p, 3).unwrap();
        assert_eq!(
            new.tree().node(copy).output_type(),
            ModificationType::Removed
        );
        // the copy is not part of the compared sequence
        assert_eq!(new.range_count(), 5);
    }

    #[test]
    fn structural_changes_group_into_runs() {
        let old = paragraph("same words");
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        builder.start_document().unwrap();
        builder.start_element("p", &Attributes::new()).unwrap();
        builder.start_element("b", &Attributes::new()).unwrap();
        builder.characters("same words").unwrap();
        builder.end_element("b").unwrap();
        builder.end_element("p").unwrap();
        builder.end_document().unwrap();
        let mut new = TextNodeComparator::new(builder.finish().unwrap());

        new.handle_possible_changed_part(0, 3, 0, 3, &old, &DiffSettings::default())
            .unwrap();
        let first = modification(&new, 0).unwrap();
        let second = modification(&new, 1).unwrap();
        assert_eq!(first.kind, ModificationType::Changed);
        assert!(first.first_of_id);
        assert!(!second.first_of_id);
        assert_eq!(first.id, second.id);
        assert_eq!(first.summary.as_deref(), Some("Bold style added."));
        assert!(modification(&new, 2).is_none());
    }

    #[test]
    fn ratios_and_distances() {
        let settings = LcsSettings::default();
        assert_eq!(match_ratio(&settings, "colour", "colour"), Ok(1.0));
        assert_eq!(match_ratio(&settings, "abc", "xyz"), Ok(0.0));
        assert!(match_ratio(&settings, "color", "colour").unwrap() > 0.75);
        assert_eq!(match_ratio(&settings, "", "abc"), Ok(0.0));
    }

    #[test]
    fn ratio_failures_propagate() {
        let settings = LcsSettings {
            use_greedy_method: false,
            ..LcsSettings::default()
        };
        assert_eq!(
            match_ratio(&settings, "colour", "color"),
            Err(DiffError::UnsupportedSetting {
                setting: "use_greedy_method"
            })
        );
    }

    #[test]
    fn out_of_range_marks_fail() {
        let mut new = paragraph("one");
        assert_eq!(
            new.mark_as_new(0, 9, ModificationType::Added),
            Err(DiffError::IndexOutOfRange { index: 9, size: 2 })
        );
    }
}
