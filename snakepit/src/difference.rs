use core::fmt;
use core::ops::Range;

/// Classification of a [`RangeDifference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceKind {
    /// The ranges are equal. Only produced by [`find_ranges`](crate::find_ranges).
    NoChange,
    /// A two-way change.
    Change,
    /// Left and right both changed the ancestor, differently.
    Conflict,
    /// Only the left side changed the ancestor.
    Left,
    /// Only the right side changed the ancestor.
    Right,
    /// Left and right changed the ancestor in the same way.
    Ancestor,
    /// Placeholder used while merging three-way scripts. Never returned.
    Error,
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DifferenceKind::NoChange => "nochange",
            DifferenceKind::Change => "change",
            DifferenceKind::Conflict => "conflict",
            DifferenceKind::Left => "left",
            DifferenceKind::Right => "right",
            DifferenceKind::Ancestor => "ancestor",
            DifferenceKind::Error => "error",
        })
    }
}

/// One gap between two (or three) compared sequences, as half-open index
/// ranges into each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeDifference {
    kind: DifferenceKind,
    left_start: usize,
    left_len: usize,
    right_start: usize,
    right_len: usize,
    ancestor_start: usize,
    ancestor_len: usize,
}

impl RangeDifference {
    /// A two-way difference.
    pub fn new(
        kind: DifferenceKind,
        left_start: usize,
        left_len: usize,
        right_start: usize,
        right_len: usize,
    ) -> Self {
        Self::with_ancestor(kind, left_start, left_len, right_start, right_len, 0, 0)
    }

    /// A three-way difference.
    pub fn with_ancestor(
        kind: DifferenceKind,
        left_start: usize,
        left_len: usize,
        right_start: usize,
        right_len: usize,
        ancestor_start: usize,
        ancestor_len: usize,
    ) -> Self {
        Self {
            kind,
            left_start,
            left_len,
            right_start,
            right_len,
            ancestor_start,
            ancestor_len,
        }
    }

    /// Kind of change.
    pub fn kind(&self) -> DifferenceKind {
        self.kind
    }

    /// Start of the left range.
    pub fn left_start(&self) -> usize {
        self.left_start
    }

    /// Length of the left range.
    pub fn left_len(&self) -> usize {
        self.left_len
    }

    /// End (exclusive) of the left range.
    pub fn left_end(&self) -> usize {
        self.left_start + self.left_len
    }

    /// The left range.
    pub fn left(&self) -> Range<usize> {
        self.left_start..self.left_end()
    }

    /// Start of the right range.
    pub fn right_start(&self) -> usize {
        self.right_start
    }

    /// Length of the right range.
    pub fn right_len(&self) -> usize {
        self.right_len
    }

    /// End (exclusive) of the right range.
    pub fn right_end(&self) -> usize {
        self.right_start + self.right_len
    }

    /// The right range.
    pub fn right(&self) -> Range<usize> {
        self.right_start..self.right_end()
    }

    /// Start of the ancestor range. Zero for two-way differences.
    pub fn ancestor_start(&self) -> usize {
        self.ancestor_start
    }

    /// Length of the ancestor range.
    pub fn ancestor_len(&self) -> usize {
        self.ancestor_len
    }

    /// End (exclusive) of the ancestor range.
    pub fn ancestor_end(&self) -> usize {
        self.ancestor_start + self.ancestor_len
    }

    /// The ancestor range.
    pub fn ancestor(&self) -> Range<usize> {
        self.ancestor_start..self.ancestor_end()
    }

    /// Larger of the left and right lengths.
    pub fn max_len(&self) -> usize {
        self.left_len.max(self.right_len)
    }
}

impl fmt::Display for RangeDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} left {}..{} right {}..{}",
            self.kind,
            self.left_start,
            self.left_end(),
            self.right_start,
            self.right_end()
        )?;
        if self.ancestor_len > 0 || self.ancestor_start > 0 {
            write!(f, " ancestor {}..{}", self.ancestor_start, self.ancestor_end())?;
        }
        Ok(())
    }
}
