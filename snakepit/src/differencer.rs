//! Two-way range differencing on top of the LCS search.

use crate::lcs::longest_common_subsequence;
use crate::macros::debug;
use crate::{DifferenceKind, Error, LcsSettings, RangeComparator, RangeDifference};

/// Find the differences between `left` and `right`.
///
/// Each returned [`RangeDifference`] is a maximal gap between matched anchors,
/// of kind [`DifferenceKind::Change`]. The list is sorted and empty when the
/// two sequences are identical.
pub fn find_differences<C>(
    settings: &LcsSettings,
    left: &C,
    right: &C,
) -> Result<Vec<RangeDifference>, Error>
where
    C: RangeComparator + ?Sized,
{
    if !settings.use_greedy_method {
        return Err(Error::UnsupportedSetting {
            setting: "use_greedy_method",
        });
    }

    let left_count = left.range_count();
    let right_count = right.range_count();
    let lcs = longest_common_subsequence(left_count, right_count, settings, |i, j| {
        left.ranges_equal(i, right, j)
    });
    let (mut left_matches, mut right_matches) = lcs.into_parts();
    shift_matches(&mut left_matches, left);
    shift_matches(&mut right_matches, right);

    let differences = gaps_between(&left_matches, &right_matches, left_count, right_count);
    debug!(
        left_count,
        right_count,
        matched = left_matches.len(),
        differences = differences.len(),
        "found differences"
    );
    Ok(differences)
}

/// Like [`find_differences`], but the unchanged stretches between differences
/// are reported too, as [`DifferenceKind::NoChange`]. The result partitions
/// both sequences.
pub fn find_ranges<C>(
    settings: &LcsSettings,
    left: &C,
    right: &C,
) -> Result<Vec<RangeDifference>, Error>
where
    C: RangeComparator + ?Sized,
{
    let differences = find_differences(settings, left, right)?;
    let mut ranges = Vec::with_capacity(differences.len() * 2 + 1);

    let mut left_cursor = 0;
    let mut right_cursor = 0;
    for difference in differences {
        let unchanged = RangeDifference::new(
            DifferenceKind::NoChange,
            left_cursor,
            difference.left_start() - left_cursor,
            right_cursor,
            difference.right_start() - right_cursor,
        );
        if unchanged.max_len() > 0 {
            ranges.push(unchanged);
        }
        left_cursor = difference.left_end();
        right_cursor = difference.right_end();
        ranges.push(difference);
    }

    let tail = RangeDifference::new(
        DifferenceKind::NoChange,
        left_cursor,
        left.range_count() - left_cursor,
        right_cursor,
        right.range_count() - right_cursor,
    );
    if tail.max_len() > 0 {
        ranges.push(tail);
    }
    Ok(ranges)
}

/// Slide every match as far toward the front as a run of equal ranges allows,
/// so that differences end up after the common material rather than inside it.
fn shift_matches<C>(matches: &mut [usize], comparator: &C)
where
    C: RangeComparator + ?Sized,
{
    for i in 1..matches.len() {
        let next = matches[i - 1] + 1;
        if next != matches[i] && comparator.ranges_equal(next, comparator, matches[i]) {
            matches[i] = next;
        }
    }
}

fn gaps_between(
    left_matches: &[usize],
    right_matches: &[usize],
    left_count: usize,
    right_count: usize,
) -> Vec<RangeDifference> {
    let mut differences = Vec::new();
    if left_matches.is_empty() {
        if left_count > 0 || right_count > 0 {
            differences.push(RangeDifference::new(
                DifferenceKind::Change,
                0,
                left_count,
                0,
                right_count,
            ));
        }
        return differences;
    }

    let mut left_next = 0;
    let mut right_next = 0;
    for (&left, &right) in left_matches.iter().zip(right_matches) {
        if left != left_next || right != right_next {
            differences.push(RangeDifference::new(
                DifferenceKind::Change,
                left_next,
                left - left_next,
                right_next,
                right - right_next,
            ));
        }
        left_next = left + 1;
        right_next = right + 1;
    }

    if left_next < left_count || right_next < right_count {
        differences.push(RangeDifference::new(
            DifferenceKind::Change,
            left_next,
            left_count - left_next,
            right_next,
            right_count - right_next,
        ));
    }
    differences
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark_testhelpers::test;

    fn words(s: &str) -> Vec<&str> {
        s.split(' ').filter(|w| !w.is_empty()).collect()
    }

    fn assert_partition(ranges: &[RangeDifference], left_count: usize, right_count: usize) {
        let mut left = 0;
        let mut right = 0;
        for range in ranges {
            assert_eq!(range.left_start(), left, "left gap or overlap at {range}");
            assert_eq!(range.right_start(), right, "right gap or overlap at {range}");
            left = range.left_end();
            right = range.right_end();
        }
        assert_eq!(left, left_count);
        assert_eq!(right, right_count);
    }

    #[test]
    fn identical_sequences_have_no_differences() {
        let a = words("this is a blue book");
        let differences = find_differences(&LcsSettings::default(), &a[..], &a[..]).unwrap();
        assert!(differences.is_empty());
    }

    #[test]
    fn both_empty_have_no_differences() {
        let a: Vec<&str> = Vec::new();
        let differences = find_differences(&LcsSettings::default(), &a[..], &a[..]).unwrap();
        assert!(differences.is_empty());
    }

    #[test]
    fn insertion_is_a_single_change() {
        let a = words("this is a blue book");
        let b = words("this is a big blue book");
        let differences = find_differences(&LcsSettings::default(), &a[..], &b[..]).unwrap();
        assert_eq!(
            differences,
            vec![RangeDifference::new(DifferenceKind::Change, 3, 0, 3, 1)]
        );
    }

    #[test]
    fn deletion_is_a_single_change() {
        let a = words("this is a blue book");
        let b = words("this is a book");
        let differences = find_differences(&LcsSettings::default(), &a[..], &b[..]).unwrap();
        assert_eq!(
            differences,
            vec![RangeDifference::new(DifferenceKind::Change, 3, 1, 3, 0)]
        );
    }

    #[test]
    fn nothing_in_common_is_one_change() {
        let a = words("red green");
        let b = words("blue");
        let differences = find_differences(&LcsSettings::default(), &a[..], &b[..]).unwrap();
        assert_eq!(
            differences,
            vec![RangeDifference::new(DifferenceKind::Change, 0, 2, 0, 1)]
        );
    }

    #[test]
    fn leading_and_trailing_changes() {
        let a = words("x a b c y");
        let b = words("a b c z w");
        let differences = find_differences(&LcsSettings::default(), &a[..], &b[..]).unwrap();
        assert_eq!(
            differences,
            vec![
                RangeDifference::new(DifferenceKind::Change, 0, 1, 0, 0),
                RangeDifference::new(DifferenceKind::Change, 4, 1, 3, 2),
            ]
        );
    }

    #[test]
    fn repeated_material_shifts_the_change_to_the_end() {
        let a = words("a a b");
        let b = words("a a a b");
        let differences = find_differences(&LcsSettings::default(), &a[..], &b[..]).unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].left_len(), 0);
        assert_eq!(differences[0].right_len(), 1);
    }

    #[test]
    fn ranges_partition_both_sides() {
        let cases = [
            ("the quick brown fox", "the slow brown dog jumps"),
            ("a b c d e f", "b c x e f g"),
            ("", "a b"),
            ("a b", ""),
            ("one two three", "one two three"),
        ];
        for (a, b) in cases {
            let (a, b) = (words(a), words(b));
            let ranges = find_ranges(&LcsSettings::default(), &a[..], &b[..]).unwrap();
            assert_partition(&ranges, a.len(), b.len());
            for range in &ranges {
                if range.kind() == DifferenceKind::NoChange {
                    assert_eq!(range.left_len(), range.right_len());
                    for i in 0..range.left_len() {
                        assert_eq!(a[range.left_start() + i], b[range.right_start() + i]);
                    }
                }
            }
        }
    }

    #[test]
    fn legacy_engine_is_rejected() {
        let settings = LcsSettings {
            use_greedy_method: false,
            ..LcsSettings::default()
        };
        let a = words("a b");
        assert_eq!(
            find_differences(&settings, &a[..], &a[..]),
            Err(Error::UnsupportedSetting {
                setting: "use_greedy_method"
            })
        );
    }
}
