//! Orchestration of a whole document diff.

use indextree::NodeId;
use snakepit::{
    DifferenceKind, RangeComparator, RangeDifference, coalesce, coalesce_on, find_differences,
    find_differences3,
};

use crate::macros::debug;
use crate::output::HtmlRenderer;
use crate::text_comparator::match_ratio;
use crate::{
    ContentHandler, DiffSettings, DomTree, HtmlLayoutChange, MarkupWriter, Modification,
    ModificationLink, ModificationType, Result, TextNodeComparator,
};

/// Replacements whose old and new text share more than this share of
/// characters are rendered as one change.
const REFINE_THRESHOLD: f64 = 0.75;

/// Diffs document trees.
///
/// The result is the newer document, annotated: content that was added or
/// changed is marked in place, and removed content from the older document is
/// copied in where it used to be.
#[derive(Debug, Clone, Default)]
pub struct HtmlDiffer {
    settings: DiffSettings,
}

/// The newer document of a diff, with every change marked.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    tree: DomTree,
    differences: Vec<RangeDifference>,
    history: Vec<ModificationLink>,
    prefix: String,
}

impl HtmlDiffer {
    /// A differ with `settings`.
    pub fn new(settings: DiffSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    pub fn settings(&self) -> &DiffSettings {
        &self.settings
    }

    /// Diff `left`, the older document, against `right`, the newer one.
    pub fn diff(&self, left: DomTree, right: DomTree) -> Result<AnnotatedDocument> {
        let settings = &self.settings;
        let mut left = TextNodeComparator::new(left);
        let mut right = TextNodeComparator::new(right);

        let raw = find_differences(&settings.lcs, &left, &right)?;
        let differences = coalesce(&raw);
        debug!(
            raw = raw.len(),
            coalesced = differences.len(),
            "diffing documents"
        );

        let (mut left_cursor, mut right_cursor) = (0, 0);
        for difference in &differences {
            if difference.left_start() > left_cursor {
                right.handle_possible_changed_part(
                    left_cursor,
                    difference.left_start(),
                    right_cursor,
                    difference.right_start(),
                    &left,
                    settings,
                )?;
            }

            if !self.refine(&left, &mut right, difference)? {
                right.mark_as_deleted(
                    difference.left_start(),
                    difference.left_end(),
                    &mut left,
                    difference.right_start(),
                    ModificationType::Removed,
                )?;
                right.mark_as_new(
                    difference.right_start(),
                    difference.right_end(),
                    ModificationType::Added,
                )?;
            }

            left_cursor = difference.left_end();
            right_cursor = difference.right_end();
        }
        if left_cursor < left.range_count() {
            right.handle_possible_changed_part(
                left_cursor,
                left.range_count(),
                right_cursor,
                right.range_count(),
                &left,
                settings,
            )?;
        }

        self.finish(right, differences)
    }

    /// Diff `left` and `right` against their common `ancestor`, annotating
    /// `right`.
    ///
    /// Changes made only on the left are not shown. Changes made on the right,
    /// or identically on both sides, are marked as in a two-way diff against
    /// the ancestor. Conflicting changes are marked as conflicts.
    pub fn diff3(
        &self,
        ancestor: DomTree,
        left: DomTree,
        right: DomTree,
    ) -> Result<AnnotatedDocument> {
        let settings = &self.settings;
        let mut ancestor = TextNodeComparator::new(ancestor);
        let left = TextNodeComparator::new(left);
        let mut right = TextNodeComparator::new(right);

        let raw = find_differences3(&settings.lcs, &ancestor, &left, &right)?;
        let differences = coalesce_on(&raw, RangeDifference::ancestor, RangeDifference::right);
        debug!(
            raw = raw.len(),
            coalesced = differences.len(),
            "diffing documents against their ancestor"
        );

        let (mut ancestor_cursor, mut right_cursor) = (0, 0);
        for difference in &differences {
            if difference.kind() == DifferenceKind::Left {
                continue;
            }
            if difference.ancestor_start() > ancestor_cursor {
                right.handle_possible_changed_part(
                    ancestor_cursor,
                    difference.ancestor_start(),
                    right_cursor,
                    difference.right_start(),
                    &ancestor,
                    settings,
                )?;
            }

            let (removed, added) = match difference.kind() {
                DifferenceKind::Conflict => (ModificationType::Conflict, ModificationType::Conflict),
                _ => (ModificationType::Removed, ModificationType::Added),
            };
            right.mark_as_deleted(
                difference.ancestor_start(),
                difference.ancestor_end(),
                &mut ancestor,
                difference.right_start(),
                removed,
            )?;
            right.mark_as_new(difference.right_start(), difference.right_end(), added)?;

            ancestor_cursor = difference.ancestor_end();
            right_cursor = difference.right_end();
        }
        if ancestor_cursor < ancestor.range_count() {
            right.handle_possible_changed_part(
                ancestor_cursor,
                ancestor.range_count(),
                right_cursor,
                right.range_count(),
                &ancestor,
                settings,
            )?;
        }

        self.finish(right, differences)
    }

    /// Mark a replacement as one in-place change when old and new text are
    /// mostly the same. Returns whether it did.
    fn refine(
        &self,
        left: &TextNodeComparator,
        right: &mut TextNodeComparator,
        difference: &RangeDifference,
    ) -> Result<bool> {
        if !self.settings.refine_replacements
            || difference.left_len() == 0
            || difference.right_len() == 0
        {
            return Ok(false);
        }
        let old = left.text_of(difference.left_start(), difference.left_end())?;
        let new = right.text_of(difference.right_start(), difference.right_end())?;
        if match_ratio(&self.settings.lcs, &old, &new)? <= REFINE_THRESHOLD {
            return Ok(false);
        }
        right.mark_as_changed_text(
            difference.right_start(),
            difference.right_end(),
            &old,
            &self.settings,
        )?;
        Ok(true)
    }

    fn finish(
        &self,
        mut right: TextNodeComparator,
        differences: Vec<RangeDifference>,
    ) -> Result<AnnotatedDocument> {
        right.link_modifications();
        right.expand_whitespace()?;
        let history = right.history().to_vec();
        Ok(AnnotatedDocument {
            tree: right.into_tree(),
            differences,
            history,
            prefix: self.settings.prefix.clone(),
        })
    }
}

impl AnnotatedDocument {
    /// The annotated tree.
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The differences the annotation was built from, after coalescing.
    pub fn differences(&self) -> &[RangeDifference] {
        &self.differences
    }

    /// Every modification run, in the order it was marked.
    pub fn history(&self) -> &[ModificationLink] {
        &self.history
    }

    /// Emit the annotated document to `handler`.
    pub fn render<H: ContentHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        handler.start_document()?;
        HtmlRenderer::new(&self.tree, &self.prefix, handler).render()?;
        handler.end_document()
    }

    /// The annotated document as HTML markup.
    pub fn to_markup(&self) -> Result<String> {
        let mut writer = MarkupWriter::new();
        self.render(&mut writer)?;
        Ok(writer.into_string())
    }

    /// The leaves of one modification run, in document order.
    pub fn run(&self, link: ModificationLink) -> Vec<NodeId> {
        let body = self.tree.body();
        self.tree
            .descendants(body)
            .filter(|&id| {
                let node = self.tree.node(id);
                !node.is_tag()
                    && node
                        .modification
                        .as_ref()
                        .is_some_and(|modification| modification.link() == link)
            })
            .collect()
    }

    /// Tags added and removed around changed content, run by run.
    pub fn layout_changes(&self) -> Vec<HtmlLayoutChange> {
        self.run_heads()
            .flat_map(|modification| modification.layout_changes.iter().cloned())
            .collect()
    }

    /// Plain-text narratives of the changed runs, in document order.
    pub fn summaries(&self) -> Vec<String> {
        self.run_heads()
            .filter_map(|modification| modification.summary.clone())
            .collect()
    }

    fn run_heads(&self) -> impl Iterator<Item = &Modification> + '_ {
        let body = self.tree.body();
        self.tree.descendants(body).filter_map(|id| {
            self.tree
                .node(id)
                .modification
                .as_ref()
                .filter(|modification| modification.first_of_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, DomTreeBuilder, Vocabulary};
    use proofmark_testhelpers::test;

    fn paragraphs(texts: &[&str]) -> DomTree {
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        builder.start_document().unwrap();
        for text in texts {
            builder.start_element("p", &Attributes::new()).unwrap();
            builder.characters(text).unwrap();
            builder.end_element("p").unwrap();
        }
        builder.end_document().unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn unchanged_documents_render_as_themselves() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff(paragraphs(&["Same text."]), paragraphs(&["Same text."]))
            .unwrap();
        assert!(document.differences().is_empty());
        assert!(document.history().is_empty());
        insta::assert_snapshot!(document.to_markup().unwrap(), @"<p>Same text.</p>");
    }

    #[test]
    fn similar_words_are_changed_in_place() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff(paragraphs(&["A colour chart"]), paragraphs(&["A color chart"]))
            .unwrap();
        assert_eq!(document.summaries(), ["Changed from colour."]);
        let markup = document.to_markup().unwrap();
        assert!(markup.contains("<span class=\"diff-html-changed\""));
        // the space after the word belongs to its run
        assert!(markup.contains(">color </span>chart"));
        assert!(!markup.contains("<del"));
    }

    #[test]
    fn unrelated_words_are_removed_and_added() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff(paragraphs(&["A red chart"]), paragraphs(&["A blue chart"]))
            .unwrap();
        let markup = document.to_markup().unwrap();
        assert!(markup.contains(">red </del><ins"));
        assert!(markup.contains(">blue </ins>chart"));
        assert_eq!(document.history().len(), 2);
    }

    #[test]
    fn runs_have_a_single_head() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff(
                paragraphs(&["Keep this."]),
                paragraphs(&["Keep this.", "And two new words."]),
            )
            .unwrap();
        let link = document.history()[0];
        let run = document.run(link);
        let heads = run
            .iter()
            .filter(|&&id| {
                document.tree().node(id).modification.as_ref().unwrap().first_of_id
            })
            .count();
        assert_eq!(heads, 1);
        let first = document.tree().node(run[0]).modification.as_ref().unwrap();
        assert!(first.first_of_id);
        assert!(run.len() > 4);
    }

    #[test]
    fn three_way_conflicts_are_marked() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff3(
                paragraphs(&["one two three"]),
                paragraphs(&["one deux three"]),
                paragraphs(&["one zwei three"]),
            )
            .unwrap();
        let markup = document.to_markup().unwrap();
        assert!(markup.contains("diff-html-conflict"));
        assert!(markup.contains(">zwei"));
    }

    #[test]
    fn three_way_hides_left_only_changes() {
        let differ = HtmlDiffer::default();
        let document = differ
            .diff3(
                paragraphs(&["one two three"]),
                paragraphs(&["one deux three"]),
                paragraphs(&["one two three"]),
            )
            .unwrap();
        assert_eq!(document.to_markup().unwrap(), "<p>one two three</p>");
    }
}
