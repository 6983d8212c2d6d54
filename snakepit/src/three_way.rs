//! Three-way differencing against a common ancestor.
//!
//! Both sides are diffed against the ancestor. The two edit scripts are then
//! walked in ancestor order and overlapping changes are merged into a single
//! range, which is classified by which side(s) touched it.

use crate::differencer::find_differences;
use crate::macros::{debug, trace};
use crate::{DifferenceKind, Error, LcsSettings, RangeComparator, RangeDifference};

/// Find the differences between `left` and `right` relative to `ancestor`.
///
/// Every returned difference carries all three ranges. Its kind is
/// [`DifferenceKind::Left`] or [`DifferenceKind::Right`] when only that side
/// departed from the ancestor, [`DifferenceKind::Ancestor`] when both sides
/// made the same change and [`DifferenceKind::Conflict`] otherwise.
pub fn find_differences3<C>(
    settings: &LcsSettings,
    ancestor: &C,
    left: &C,
    right: &C,
) -> Result<Vec<RangeDifference>, Error>
where
    C: RangeComparator + ?Sized,
{
    let right_script = find_differences(settings, ancestor, right)?;
    let left_script = find_differences(settings, ancestor, left)?;

    let mut scripts = [Script::new(&right_script), Script::new(&left_script)];
    let mut merged = Vec::new();
    let mut last = RangeDifference::new(DifferenceKind::Error, 0, 0, 0, 0);

    while scripts[RIGHT].current().is_some() || scripts[LEFT].current().is_some() {
        scripts[RIGHT].taken.clear();
        scripts[LEFT].taken.clear();

        let start = match (scripts[RIGHT].current(), scripts[LEFT].current()) {
            (None, _) => LEFT,
            (_, None) => RIGHT,
            (Some(mine), Some(yours)) => {
                if mine.left_start() < yours.left_start() {
                    RIGHT
                } else if mine.left_start() > yours.left_start() {
                    LEFT
                } else if mine.left_len() == 0 && yours.left_len() == 0 {
                    // both sides insert at the same spot
                    let (change_start, change_end) = (mine.left_start(), mine.left_end());
                    scripts[RIGHT].advance();
                    scripts[LEFT].advance();
                    last = combine(&scripts, &last, left, right, change_start, change_end);
                    merged.push(last);
                    continue;
                } else if yours.left_len() == 0 {
                    LEFT
                } else {
                    RIGHT
                }
            }
        };

        let Some(first) = scripts[start].current() else {
            break;
        };
        let change_start = first.left_start();
        let mut change_end = first.left_end();
        scripts[start].advance();

        let mut other = 1 - start;
        while let Some(next) = scripts[other].current() {
            if next.left_start() > change_end {
                break;
            }
            let new_end = next.left_end();
            scripts[other].advance();
            if new_end >= change_end {
                change_end = new_end;
                other = 1 - other;
            }
        }

        last = combine(&scripts, &last, left, right, change_start, change_end);
        trace!(%last, "merged three-way change");
        merged.push(last);
    }

    debug!(
        right = right_script.len(),
        left = left_script.len(),
        merged = merged.len(),
        "three-way merge"
    );
    Ok(merged)
}

const RIGHT: usize = 0;
const LEFT: usize = 1;

/// Cursor over one side's edit script against the ancestor. In these
/// differences the "left" range is the ancestor's.
struct Script<'a> {
    differences: &'a [RangeDifference],
    next: usize,
    taken: Vec<RangeDifference>,
}

impl<'a> Script<'a> {
    fn new(differences: &'a [RangeDifference]) -> Self {
        Self {
            differences,
            next: 0,
            taken: Vec::new(),
        }
    }

    fn current(&self) -> Option<RangeDifference> {
        self.differences.get(self.next).copied()
    }

    fn advance(&mut self) {
        if let Some(current) = self.current() {
            self.taken.push(current);
            self.next += 1;
        }
    }

    /// Map the ancestor range onto this side, through the differences taken
    /// in the current round, or through `fallback` when there are none.
    fn project(
        &self,
        change_start: usize,
        change_end: usize,
        fallback: (usize, usize),
    ) -> (usize, usize) {
        let shift = |position: usize, from: usize, to: usize| {
            (position as isize - from as isize + to as isize).max(0) as usize
        };
        match (self.taken.first(), self.taken.last()) {
            (Some(first), Some(last)) => (
                shift(change_start, first.left_start(), first.right_start()),
                shift(change_end, last.left_end(), last.right_end()),
            ),
            _ => {
                let (ancestor_end, side_end) = fallback;
                (
                    shift(change_start, ancestor_end, side_end),
                    shift(change_end, ancestor_end, side_end),
                )
            }
        }
    }
}

fn combine<C>(
    scripts: &[Script<'_>; 2],
    last: &RangeDifference,
    left: &C,
    right: &C,
    change_start: usize,
    change_end: usize,
) -> RangeDifference
where
    C: RangeComparator + ?Sized,
{
    let right_changed = !scripts[RIGHT].taken.is_empty();
    let left_changed = !scripts[LEFT].taken.is_empty();

    let (right_start, right_end) = scripts[RIGHT].project(
        change_start,
        change_end,
        (last.ancestor_end(), last.right_end()),
    );
    let (left_start, left_end) = scripts[LEFT].project(
        change_start,
        change_end,
        (last.ancestor_end(), last.left_end()),
    );

    let kind = match (left_changed, right_changed) {
        (true, false) => DifferenceKind::Left,
        (false, true) => DifferenceKind::Right,
        _ => {
            if spans_equal(left, left_start, left_end, right, right_start, right_end) {
                DifferenceKind::Ancestor
            } else {
                DifferenceKind::Conflict
            }
        }
    };

    RangeDifference::with_ancestor(
        kind,
        left_start,
        left_end.saturating_sub(left_start),
        right_start,
        right_end.saturating_sub(right_start),
        change_start,
        change_end - change_start,
    )
}

fn spans_equal<C>(
    left: &C,
    left_start: usize,
    left_end: usize,
    right: &C,
    right_start: usize,
    right_end: usize,
) -> bool
where
    C: RangeComparator + ?Sized,
{
    let len = left_end.saturating_sub(left_start);
    len == right_end.saturating_sub(right_start)
        && (0..len).all(|i| left.ranges_equal(left_start + i, right, right_start + i))
}
