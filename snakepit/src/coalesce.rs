//! Merging of nearby differences.
//!
//! A raw edit script tends to fragment a rewritten sentence into many small
//! changes separated by a single common word. Coalescing merges a difference
//! into its predecessor when the two are "big" compared to the distance
//! between them, as measured by [`bridge_score`].

use core::ops::Range;

use crate::macros::debug;
use crate::RangeDifference;

/// Saturating, sublinear size estimate of a pair of neighboring differences.
///
/// `left` and `right` hold the lengths of the two differences on each side.
/// Returns zero when both differences are empty on the same side: two pure
/// insertions (both left lengths zero) or two pure deletions (both right
/// lengths zero) never score. An insertion next to a deletion does.
pub fn bridge_score(left: [usize; 2], right: [usize; 2]) -> f64 {
    if (left[0] == 0 && left[1] == 0) || (right[0] == 0 && right[1] == 0) {
        return 0.0;
    }

    let values = [left[0], left[1], right[0], right[1]];
    let mut total = 0.0;
    for value in values {
        let mut value = value as f64;
        while value > 3.0 {
            total += 3.0;
            value = (value - 3.0) * 0.5;
        }
        total += value;
    }
    total / (1.5 * values.len() as f64)
}

/// Merge adjacent same-kind differences whose bridge score exceeds the gap
/// between them, measuring gaps on the left side.
pub fn coalesce(differences: &[RangeDifference]) -> Vec<RangeDifference> {
    coalesce_on(differences, RangeDifference::left, RangeDifference::right)
}

/// Like [`coalesce`], with the two compared sides picked by `primary` and
/// `secondary`. Gaps are measured on `primary`.
///
/// Three-way scripts coalesce on their ancestor and right ranges. Every range
/// of a merged difference spans from its first to its last constituent.
pub fn coalesce_on<P, S>(
    differences: &[RangeDifference],
    primary: P,
    secondary: S,
) -> Vec<RangeDifference>
where
    P: Fn(&RangeDifference) -> Range<usize>,
    S: Fn(&RangeDifference) -> Range<usize>,
{
    let mut coalesced: Vec<RangeDifference> = Vec::with_capacity(differences.len());
    let mut iter = differences.iter().peekable();

    while let Some(&first) = iter.next() {
        let mut last = first;
        while let Some(&&next) = iter.peek() {
            if next.kind() != first.kind() {
                break;
            }
            let (primary_span, secondary_span) = (
                primary(&first).start..primary(&last).end,
                secondary(&first).start..secondary(&last).end,
            );
            let (next_primary, next_secondary) = (primary(&next), secondary(&next));
            let score = bridge_score(
                [primary_span.len(), next_primary.len()],
                [secondary_span.len(), next_secondary.len()],
            );
            let gap = next_primary.start.saturating_sub(primary_span.end);
            if score <= gap as f64 {
                break;
            }
            last = next;
            iter.next();
        }
        coalesced.push(span(&first, &last));
    }

    debug!(
        before = differences.len(),
        after = coalesced.len(),
        "coalesced differences"
    );
    coalesced
}

fn span(first: &RangeDifference, last: &RangeDifference) -> RangeDifference {
    RangeDifference::with_ancestor(
        first.kind(),
        first.left_start(),
        last.left_end().saturating_sub(first.left_start()),
        first.right_start(),
        last.right_end().saturating_sub(first.right_start()),
        first.ancestor_start(),
        last.ancestor_end().saturating_sub(first.ancestor_start()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DifferenceKind::{Change, Conflict};
    use proofmark_testhelpers::test;

    #[test]
    fn score_of_small_values_is_their_normalized_sum() {
        assert_eq!(bridge_score([1, 1], [1, 1]), 4.0 / 6.0);
        assert_eq!(bridge_score([3, 0], [3, 0]), 1.0);
    }

    #[test]
    fn score_saturates_for_large_values() {
        // 10 -> 3 + (7 * 0.5 = 3.5) -> 3 + 3 + 0.25
        assert_eq!(bridge_score([10, 0], [0, 1]), (6.25 + 1.0) / 6.0);
        assert!(bridge_score([1000, 1000], [1000, 1000]) < 20.0);
    }

    #[test]
    fn score_is_zero_when_one_side_is_empty() {
        assert_eq!(bridge_score([0, 0], [5, 5]), 0.0);
        assert_eq!(bridge_score([5, 5], [0, 0]), 0.0);
        // an insertion next to a deletion touches both sides
        assert_eq!(bridge_score([0, 2], [2, 0]), 4.0 / 6.0);
    }

    #[test]
    fn close_replacements_merge() {
        let differences = [
            RangeDifference::new(Change, 2, 5, 2, 6),
            RangeDifference::new(Change, 8, 4, 9, 4),
        ];
        let coalesced = coalesce(&differences);
        assert_eq!(coalesced, vec![RangeDifference::new(Change, 2, 10, 2, 11)]);
    }

    #[test]
    fn distant_or_small_differences_stay_apart() {
        let differences = [
            RangeDifference::new(Change, 2, 1, 2, 1),
            RangeDifference::new(Change, 10, 1, 10, 1),
        ];
        assert_eq!(coalesce(&differences), differences.to_vec());
    }

    #[test]
    fn pure_insertions_never_merge() {
        let differences = [
            RangeDifference::new(Change, 2, 0, 2, 4),
            RangeDifference::new(Change, 3, 0, 7, 4),
        ];
        assert_eq!(coalesce(&differences), differences.to_vec());
    }

    #[test]
    fn different_kinds_never_merge() {
        let differences = [
            RangeDifference::with_ancestor(Change, 2, 5, 2, 5, 2, 5),
            RangeDifference::with_ancestor(Conflict, 8, 5, 8, 5, 8, 5),
        ];
        assert_eq!(
            coalesce_on(&differences, RangeDifference::ancestor, RangeDifference::right),
            differences.to_vec()
        );
    }

    #[test]
    fn three_way_merge_spans_all_ranges() {
        let differences = [
            RangeDifference::with_ancestor(Conflict, 1, 4, 1, 5, 1, 4),
            RangeDifference::with_ancestor(Conflict, 6, 4, 7, 4, 6, 4),
        ];
        let coalesced = coalesce_on(&differences, RangeDifference::ancestor, RangeDifference::right);
        assert_eq!(
            coalesced,
            vec![RangeDifference::with_ancestor(Conflict, 1, 9, 1, 10, 1, 9)]
        );
    }
}
