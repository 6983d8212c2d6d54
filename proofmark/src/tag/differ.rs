use snakepit::{LcsSettings, RangeComparator, RangeDifference, find_differences};

use crate::macros::debug;
use crate::tag::{AtomKind, AtomSplitter, ArgumentComparator, TagComparator};
use crate::Result;

/// Receiver of an atom-level diff, as a sequence of parts.
pub trait TextDiffOutput {
    /// Text present on both sides.
    fn add_clear_part(&mut self, text: &str) -> Result<()>;

    /// Text present in the old markup only.
    fn add_removed_part(&mut self, text: &str) -> Result<()>;

    /// Text present in the new markup only.
    fn add_added_part(&mut self, text: &str) -> Result<()>;
}

/// Diffs raw markup atom by atom, tags included.
///
/// Tags matching by name but differing in their attributes are refined: the
/// attribute text of both is diffed word by word.
#[derive(Debug, Clone, Default)]
pub struct TagDiffer {
    settings: LcsSettings,
}

impl TagDiffer {
    /// A differ with `settings`.
    pub fn new(settings: LcsSettings) -> Self {
        Self { settings }
    }

    /// Diff `old` against `new`, reporting parts to `output`.
    pub fn diff<O: TextDiffOutput + ?Sized>(&self, old: &str, new: &str, output: &mut O) -> Result<()> {
        let left = TagComparator::new(old)?;
        let right = TagComparator::new(new)?;
        let raw = find_differences(&self.settings, &left, &right)?;
        let differences = bridge(&raw, &left)?;
        debug!(
            raw = raw.len(),
            bridged = differences.len(),
            "diffing markup atoms"
        );

        let (mut left_atom, mut right_atom) = (0, 0);
        for difference in &differences {
            self.parse_no_change(
                left_atom,
                difference.left_start(),
                right_atom,
                &left,
                &right,
                output,
            )?;
            if difference.left_len() > 0 {
                output.add_removed_part(
                    &left.substring(difference.left_start(), difference.left_end())?,
                )?;
            }
            if difference.right_len() > 0 {
                output.add_added_part(
                    &right.substring(difference.right_start(), difference.right_end())?,
                )?;
            }
            left_atom = difference.left_end();
            right_atom = difference.right_end();
        }
        if right_atom < right.range_count() {
            self.parse_no_change(
                left_atom,
                left.range_count(),
                right_atom,
                &left,
                &right,
                output,
            )?;
        }
        Ok(())
    }

    /// Report the matched atoms `left_begin..left_end`, paired in order with
    /// right atoms from `right_begin`. Atoms without attribute text are
    /// clear; tags with attribute text are refined.
    fn parse_no_change<O: TextDiffOutput + ?Sized>(
        &self,
        left_begin: usize,
        left_end: usize,
        right_begin: usize,
        left: &TagComparator,
        right: &TagComparator,
        output: &mut O,
    ) -> Result<()> {
        let (mut l, mut r) = (left_begin, right_begin);
        let mut clear = String::new();
        while l < left_end {
            while l < left_end
                && !right.atom(r)?.has_internal_identifiers()
                && !left.atom(l)?.has_internal_identifiers()
            {
                clear.push_str(right.atom(r)?.full_text());
                l += 1;
                r += 1;
            }
            if !clear.is_empty() {
                output.add_clear_part(&clear)?;
                clear.clear();
            }
            if l < left_end {
                self.refine(left.atom(l)?.full_text(), right.atom(r)?.full_text(), output)?;
                l += 1;
                r += 1;
            }
        }
        Ok(())
    }

    fn refine<O: TextDiffOutput + ?Sized>(&self, old: &str, new: &str, output: &mut O) -> Result<()> {
        let left = ArgumentComparator::new(old)?;
        let right = ArgumentComparator::new(new)?;
        let differences = merge_close(&find_differences(&self.settings, &left, &right)?, 2);

        let mut right_atom = 0;
        for difference in &differences {
            if right_atom < difference.right_start() {
                output.add_clear_part(&right.substring(right_atom, difference.right_start())?)?;
            }
            if difference.left_len() > 0 {
                output.add_removed_part(
                    &left.substring(difference.left_start(), difference.left_end())?,
                )?;
            }
            if difference.right_len() > 0 {
                output.add_added_part(
                    &right.substring(difference.right_start(), difference.right_end())?,
                )?;
            }
            right_atom = difference.right_end();
        }
        if right_atom < right.range_count() {
            output.add_clear_part(&right.substring(right_atom, right.range_count())?)?;
        }
        Ok(())
    }
}

/// Merge same-kind differences lying within `span` atoms of each other on
/// both sides.
fn merge_close(differences: &[RangeDifference], span: usize) -> Vec<RangeDifference> {
    let mut merged: Vec<RangeDifference> = Vec::with_capacity(differences.len());
    for &difference in differences {
        if let Some(last) = merged.last_mut() {
            if last.kind() == difference.kind()
                && difference.left_start() <= last.left_end() + span
                && difference.right_start() <= last.right_end() + span
            {
                *last = RangeDifference::new(
                    last.kind(),
                    last.left_start(),
                    difference.left_end() - last.left_start(),
                    last.right_start(),
                    difference.right_end() - last.right_start(),
                );
                continue;
            }
        }
        merged.push(difference);
    }
    merged
}

/// Merge differences separated only by delimiters, or by a few atoms when
/// the differences are long: up to two atoms past five, three past ten.
fn bridge(differences: &[RangeDifference], left: &TagComparator) -> Result<Vec<RangeDifference>> {
    let mut merged = Vec::with_capacity(differences.len());
    let mut i = 0;
    while i < differences.len() {
        let first = differences[i];
        let (left_start, right_start) = (first.left_start(), first.right_start());
        let (mut left_end, mut right_end) = (first.left_end(), first.right_end());

        while let Some(next) = differences.get(i + 1) {
            let tokens = (left_end - left_start).max(right_end - right_start);
            let mut bridge_len = match tokens {
                0..=5 => 0,
                6..=10 => 2,
                _ => 3,
            };
            let mut cursor = left_end;
            while cursor < next.left_start() {
                if left.atom(cursor)?.kind() == AtomKind::Delimiter {
                    cursor += 1;
                } else if bridge_len > 0 {
                    bridge_len -= 1;
                    cursor += 1;
                } else {
                    break;
                }
            }
            if cursor != next.left_start() {
                break;
            }
            left_end = next.left_end();
            right_end = next.right_end();
            i += 1;
        }

        merged.push(RangeDifference::new(
            first.kind(),
            left_start,
            left_end - left_start,
            right_start,
            right_end - right_start,
        ));
        i += 1;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark_testhelpers::test;

    #[derive(Default)]
    struct Parts(Vec<(char, String)>);

    impl TextDiffOutput for Parts {
        fn add_clear_part(&mut self, text: &str) -> Result<()> {
            self.0.push(('=', text.to_string()));
            Ok(())
        }

        fn add_removed_part(&mut self, text: &str) -> Result<()> {
            self.0.push(('-', text.to_string()));
            Ok(())
        }

        fn add_added_part(&mut self, text: &str) -> Result<()> {
            self.0.push(('+', text.to_string()));
            Ok(())
        }
    }

    fn diff(old: &str, new: &str) -> Vec<(char, String)> {
        let mut parts = Parts::default();
        TagDiffer::default().diff(old, new, &mut parts).unwrap();
        parts.0
    }

    fn parts(expected: &[(char, &str)]) -> Vec<(char, String)> {
        expected.iter().map(|(c, s)| (*c, s.to_string())).collect()
    }

    #[test]
    fn inserted_word() {
        assert_eq!(
            diff("<p>This is a blue book</p>", "<p>This is a big blue book</p>"),
            parts(&[
                ('=', "<p>This is a "),
                ('+', "big "),
                ('=', "blue book</p>"),
            ])
        );
    }

    #[test]
    fn words_across_a_delimiter_are_bridged() {
        assert_eq!(
            diff("<p>one two three</p>", "<p>uno dos three</p>"),
            parts(&[
                ('=', "<p>"),
                ('-', "one two"),
                ('+', "uno dos"),
                ('=', " three</p>"),
            ])
        );
    }

    #[test]
    fn attribute_changes_are_refined() {
        assert_eq!(
            diff("<font size=2>x</font>", "<font size=3>x</font>"),
            parts(&[
                ('=', "<font "),
                ('-', "size=2"),
                ('+', "size=3"),
                ('=', ">"),
                ('=', "x</font>"),
            ])
        );
    }

    #[test]
    fn merging_close_differences() {
        let differences = [
            RangeDifference::new(snakepit::DifferenceKind::Change, 0, 1, 0, 1),
            RangeDifference::new(snakepit::DifferenceKind::Change, 3, 1, 3, 1),
            RangeDifference::new(snakepit::DifferenceKind::Change, 9, 1, 9, 1),
        ];
        let merged = merge_close(&differences, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].left(), 0..4);
        assert_eq!(merged[1].left(), 9..10);
    }
}
