#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! # Snakepit
//!
//! Sequence differencing with Myers' O((N+M)·D) algorithm.
//!
//! Named after the "snakes" of Myers' paper: the runs of matching elements
//! that the search slithers along while looking for the shortest edit script.
//!
//! ## Layers
//!
//! 1. [`longest_common_subsequence`] finds matched index pairs between two
//!    sequences reachable only through their lengths and an equality predicate.
//! 2. [`RangeComparator`] is the sequence abstraction. Anything with a count
//!    and a way to compare ranges can be diffed, at any granularity.
//! 3. [`find_differences`], [`find_ranges`] and [`find_differences3`] turn
//!    matches into [`RangeDifference`] gaps, two-way or against an ancestor.
//! 4. [`coalesce`] merges fragmented neighboring differences.
//!
//! ## Usage
//!
//! ```
//! use snakepit::{LcsSettings, find_differences};
//!
//! let old = ["this", "is", "a", "blue", "book"];
//! let new = ["this", "is", "a", "big", "blue", "book"];
//! let differences = find_differences(&LcsSettings::default(), &old[..], &new[..]).unwrap();
//!
//! assert_eq!(differences.len(), 1);
//! assert_eq!(differences[0].right(), 3..4);
//! ```
//!
//! ## Bounded cost
//!
//! For very large inputs the search depth is capped (see [`LcsSettings`]) and
//! the result degrades gracefully to a common subsequence that may be shorter
//! than the longest one.

mod coalesce;
mod comparator;
mod difference;
mod differencer;
mod error;
mod lcs;
mod macros;
mod settings;
mod three_way;

pub use coalesce::{bridge_score, coalesce, coalesce_on};
pub use comparator::RangeComparator;
pub use difference::{DifferenceKind, RangeDifference};
pub use differencer::{find_differences, find_ranges};
pub use error::Error;
pub use lcs::{Lcs, lcs_slices, longest_common_subsequence};
pub use settings::LcsSettings;
pub use three_way::find_differences3;
