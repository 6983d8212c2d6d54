/// A sequence of comparable ranges.
///
/// Implementors expose how many atomic ranges they hold and whether one of
/// their ranges equals a range of another sequence of the same kind. The
/// differencer never looks at the ranges themselves.
pub trait RangeComparator {
    /// Number of ranges in the sequence.
    fn range_count(&self) -> usize;

    /// Whether range `own` of `self` equals range `other_index` of `other`.
    ///
    /// `other` may be `self`, which is how the differencer checks whether a
    /// match can slide along a run of equal ranges.
    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool;
}

impl<T: PartialEq> RangeComparator for [T] {
    fn range_count(&self) -> usize {
        self.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        self[own] == other[other_index]
    }
}

impl<T: PartialEq> RangeComparator for Vec<T> {
    fn range_count(&self) -> usize {
        self.len()
    }

    fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
        self[own] == other[other_index]
    }
}
