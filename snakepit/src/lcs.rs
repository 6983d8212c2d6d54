//! Myers' O((N+M)·D) longest common subsequence.
//!
//! The search trims the common prefix and suffix, then repeatedly looks for
//! the "middle snake" of the remaining region and splits around it. Regions
//! are kept on an explicit work list, so deep edit scripts never grow the call
//! stack.
//!
//! When a region needs more differences than the configured depth cap allows,
//! the diagonal with the most progress is used as a zero-length split point.
//! The result is then a common subsequence, but not necessarily the longest.

use crate::LcsSettings;
use crate::macros::{debug, trace};

/// A common subsequence of two sequences, as matched index pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lcs {
    left: Vec<usize>,
    right: Vec<usize>,
}

impl Lcs {
    /// Number of matched elements.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Matched indices into the left sequence, ascending.
    pub fn left_matches(&self) -> &[usize] {
        &self.left
    }

    /// Matched indices into the right sequence, ascending.
    pub fn right_matches(&self) -> &[usize] {
        &self.right
    }

    /// Matched `(left, right)` pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }

    pub(crate) fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.left, self.right)
    }
}

/// Compute a longest common subsequence of two sequences that are only
/// reachable through their lengths and an equality predicate.
///
/// `equal(i, j)` compares element `i` of the left sequence with element `j`
/// of the right sequence.
pub fn longest_common_subsequence<F>(
    left_len: usize,
    right_len: usize,
    settings: &LcsSettings,
    equal: F,
) -> Lcs
where
    F: FnMut(usize, usize) -> bool,
{
    if left_len == 0 || right_len == 0 {
        return Lcs::default();
    }

    let mut search = Search::new(left_len, right_len, settings, equal);
    search.run();
    search.finish()
}

/// Convenience wrapper over [`longest_common_subsequence`] for slices.
pub fn lcs_slices<T: PartialEq>(left: &[T], right: &[T], settings: &LcsSettings) -> Lcs {
    longest_common_subsequence(left.len(), right.len(), settings, |i, j| left[i] == right[j])
}

/// Inclusive bounds of a region still to be aligned.
#[derive(Debug, Clone, Copy)]
struct Region {
    bottom_left: isize,
    top_left: isize,
    bottom_right: isize,
    top_right: isize,
}

impl Region {
    fn is_empty(&self) -> bool {
        self.bottom_left > self.top_left || self.bottom_right > self.top_right
    }
}

/// A run of matches starting at `(x, y)` in absolute coordinates.
#[derive(Debug, Clone, Copy, Default)]
struct Snake {
    x: isize,
    y: isize,
    len: isize,
}

struct Search<F> {
    equal: F,
    left_len: isize,
    right_len: isize,
    max_differences: isize,
    forward: Vec<isize>,
    backward: Vec<isize>,
    matches: Vec<Option<usize>>,
}

impl<F> Search<F>
where
    F: FnMut(usize, usize) -> bool,
{
    fn new(left_len: usize, right_len: usize, settings: &LcsSettings, equal: F) -> Self {
        let mut max_differences = (left_len + right_len).div_ceil(2) as isize;
        if (left_len as f64) * (right_len as f64) > settings.too_long {
            let capped = (max_differences as f64).powf(settings.pow_limit - 1.0) as isize;
            debug!(
                left_len,
                right_len,
                from = max_differences,
                to = capped,
                "capping LCS search depth"
            );
            max_differences = capped;
        }

        let diagonals = left_len + right_len + 3;
        Self {
            equal,
            left_len: left_len as isize,
            right_len: right_len as isize,
            max_differences: max_differences.max(1),
            forward: vec![0; diagonals],
            backward: vec![0; diagonals],
            matches: vec![None; left_len],
        }
    }

    #[inline]
    fn eq(&mut self, left: isize, right: isize) -> bool {
        (self.equal)(left as usize, right as usize)
    }

    #[inline]
    fn record(&mut self, left: isize, right: isize) {
        self.matches[left as usize] = Some(right as usize);
    }

    fn run(&mut self) {
        let (n, m) = (self.left_len, self.right_len);

        // common prefixes and suffixes belong to some LCS
        let mut lower = 0;
        while lower < n.min(m) && self.eq(lower, lower) {
            self.record(lower, lower);
            lower += 1;
        }
        let mut top_left = n - 1;
        let mut top_right = m - 1;
        while top_left >= lower && top_right >= lower && self.eq(top_left, top_right) {
            self.record(top_left, top_right);
            top_left -= 1;
            top_right -= 1;
        }
        trace!(prefix = lower, suffix = n - 1 - top_left, "trimmed common ends");

        let mut pending = vec![Region {
            bottom_left: lower,
            top_left,
            bottom_right: lower,
            top_right,
        }];

        while let Some(region) = pending.pop() {
            if region.is_empty() {
                continue;
            }

            let (d, snake) = self.middle_snake(region);
            for i in 0..snake.len {
                self.record(snake.x + i, snake.y + i);
            }

            if d > 1 {
                pending.push(Region {
                    bottom_left: region.bottom_left,
                    top_left: snake.x - 1,
                    bottom_right: region.bottom_right,
                    top_right: snake.y - 1,
                });
                pending.push(Region {
                    bottom_left: snake.x + snake.len,
                    top_left: region.top_left,
                    bottom_right: snake.y + snake.len,
                    top_right: region.top_right,
                });
            } else if d == 1 {
                // exactly one edit: everything before it lies on the main diagonal
                let before = (snake.x - region.bottom_left).min(snake.y - region.bottom_right);
                for i in 0..before {
                    self.record(region.bottom_left + i, region.bottom_right + i);
                }
            }
        }
    }

    /// Find the middle snake of `region`, returning the length of the
    /// shortest edit script found together with the snake.
    fn middle_snake(&mut self, region: Region) -> (isize, Snake) {
        let bottom_left = region.bottom_left;
        let bottom_right = region.bottom_right;
        let n = region.top_left - bottom_left + 1;
        let m = region.top_right - bottom_right + 1;
        let delta = n - m;
        let is_even = delta & 1 == 0;
        let limit = self.max_differences.min((n + m + 1) / 2);
        let at = |k: isize| (limit + k) as usize;

        let mut forward_parity = m & 1;
        let mut backward_parity = n & 1;
        let (mut start_forward, mut end_forward) = (-m, n);
        let (mut start_backward, mut end_backward) = (-n, m);

        self.forward[at(1)] = 0;
        self.backward[at(-1)] = n;

        let mut snake = Snake::default();
        for d in 0..=limit {
            // forward furthest reaching paths
            let start_diag = (forward_parity + start_forward).max(-d);
            let end_diag = end_forward.min(d);
            forward_parity = 1 - forward_parity;

            let mut k = start_diag;
            while k <= end_diag {
                let mut x = if k == -d || (k < d && self.forward[at(k - 1)] < self.forward[at(k + 1)])
                {
                    self.forward[at(k + 1)]
                } else {
                    self.forward[at(k - 1)] + 1
                };
                let mut y = x - k;
                snake = Snake {
                    x: x + bottom_left,
                    y: y + bottom_right,
                    len: 0,
                };
                while x >= 0
                    && y >= 0
                    && x < n
                    && y < m
                    && self.eq(x + bottom_left, y + bottom_right)
                {
                    x += 1;
                    y += 1;
                    snake.len += 1;
                }
                self.forward[at(k)] = x;

                if !is_even
                    && k >= delta - d + 1
                    && k <= delta + d - 1
                    && x >= self.backward[at(k - delta)]
                {
                    return (2 * d - 1, snake);
                }

                if x >= n && end_forward > k - 1 {
                    end_forward = k - 1;
                } else if y >= m {
                    start_forward = k + 1;
                    forward_parity = 0;
                }
                k += 2;
            }

            // backward furthest reaching paths
            let start_diag = (backward_parity + start_backward).max(-d);
            let end_diag = end_backward.min(d);
            backward_parity = 1 - backward_parity;

            let mut k = start_diag;
            while k <= end_diag {
                let mut x =
                    if k == d || (k != -d && self.backward[at(k - 1)] < self.backward[at(k + 1)]) {
                        self.backward[at(k - 1)]
                    } else {
                        self.backward[at(k + 1)] - 1
                    };
                let mut y = x - k - delta;
                snake.len = 0;
                while x > 0
                    && y > 0
                    && x <= n
                    && y <= m
                    && self.eq(x - 1 + bottom_left, y - 1 + bottom_right)
                {
                    x -= 1;
                    y -= 1;
                    snake.len += 1;
                }
                self.backward[at(k)] = x;

                if is_even && k >= -delta - d && k <= d - delta && x <= self.forward[at(k + delta)]
                {
                    snake.x = bottom_left + x;
                    snake.y = bottom_right + y;
                    return (2 * d, snake);
                }

                if x <= 0 {
                    start_backward = k + 1;
                    backward_parity = 0;
                } else if y <= 0 && end_backward > k - 1 {
                    end_backward = k - 1;
                }
                k += 2;
            }
        }

        // The exact search is too expensive. Pretend a zero-length middle snake
        // sits on the diagonal that made the most progress.
        let (x, y) = self.most_progress(n, m, limit);
        debug!(n, m, limit, x, y, "search depth exhausted, splitting at most progress");
        (
            5,
            Snake {
                x: bottom_left + x,
                y: bottom_right + y,
                len: 0,
            },
        )
    }

    /// Locate the middle diagonal among those with maximal progress, in
    /// region-relative coordinates. Never returns a point that fails to split
    /// the region.
    fn most_progress(&self, n: isize, m: isize, limit: isize) -> (isize, isize) {
        let delta = n - m;
        let at = |k: isize| (limit + k) as usize;

        let forward_start = if (m & 1) == (limit & 1) {
            (-m).max(-limit)
        } else {
            (1 - m).max(-limit)
        };
        let forward_end = n.min(limit);
        let backward_start = if (n & 1) == (limit & 1) {
            (-n).max(-limit)
        } else {
            (1 - n).max(-limit)
        };
        let backward_end = m.min(limit);

        let mut best = vec![(0, 0)];
        let mut best_progress = 0;
        let mut best_is_forward = true;

        let mut k = forward_start;
        while k <= forward_end {
            let x = self.forward[at(k)];
            let y = x - k;
            k += 2;
            if x < 0 || y < 0 || x > n || y > m {
                continue;
            }
            let progress = x + y;
            if progress > best_progress {
                best.clear();
                best.push((x, y));
                best_progress = progress;
            } else if progress == best_progress {
                best.push((x, y));
            }
        }

        let mut k = backward_start;
        while k <= backward_end {
            let x = self.backward[at(k)];
            let y = x - k - delta;
            k += 2;
            if x < 0 || y < 0 || x > n || y > m {
                continue;
            }
            let progress = n - x + m - y;
            if progress > best_progress {
                best.clear();
                best.push((x, y));
                best_progress = progress;
                best_is_forward = false;
            } else if progress == best_progress && !best_is_forward {
                best.push((x, y));
            }
        }

        let (x, y) = best[(best.len() - 1) / 2];
        if (x == 0 && y == 0) || (x == n && y == m) {
            ((n + 1) / 2, m / 2)
        } else {
            (x, y)
        }
    }

    fn finish(self) -> Lcs {
        let mut lcs = Lcs::default();
        for (left, right) in self.matches.into_iter().enumerate() {
            if let Some(right) = right {
                lcs.left.push(left);
                lcs.right.push(right);
            }
        }
        lcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark_testhelpers::test;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn assert_common_subsequence(a: &[char], b: &[char], lcs: &Lcs) {
        let mut last: Option<(usize, usize)> = None;
        for (i, j) in lcs.pairs() {
            assert_eq!(a[i], b[j], "pair ({i}, {j}) does not match");
            if let Some((pi, pj)) = last {
                assert!(i > pi && j > pj, "pairs must be strictly increasing");
            }
            last = Some((i, j));
        }
    }

    #[test]
    fn empty_sequences_have_no_lcs() {
        let settings = LcsSettings::default();
        assert!(lcs_slices::<char>(&[], &chars("abc"), &settings).is_empty());
        assert!(lcs_slices(&chars("abc"), &[], &settings).is_empty());
    }

    #[test]
    fn identical_sequences_match_everything() {
        let settings = LcsSettings::default();
        let a = chars("the quick brown fox");
        let lcs = lcs_slices(&a, &a, &settings);
        assert_eq!(lcs.len(), a.len());
        assert_eq!(lcs.left_matches(), lcs.right_matches());
    }

    #[test]
    fn disjoint_sequences_share_nothing() {
        let settings = LcsSettings::default();
        let lcs = lcs_slices(&chars("abc"), &chars("xyz"), &settings);
        assert_eq!(lcs.len(), 0);
    }

    #[test]
    fn classic_myers_example() {
        let settings = LcsSettings::default();
        let a = chars("ABCABBA");
        let b = chars("CBABAC");
        let lcs = lcs_slices(&a, &b, &settings);
        assert_eq!(lcs.len(), 4);
        assert_common_subsequence(&a, &b, &lcs);
    }

    #[test]
    fn length_is_symmetric() {
        let settings = LcsSettings::default();
        let cases = [
            ("kitten", "sitting"),
            ("a blue book", "a big blue book"),
            ("xaxbxcx", "abc"),
            ("", "abc"),
            ("abcdefghij", "jihgfedcba"),
        ];
        for (a, b) in cases {
            let (a, b) = (chars(a), chars(b));
            let forward = lcs_slices(&a, &b, &settings);
            let backward = lcs_slices(&b, &a, &settings);
            assert_eq!(forward.len(), backward.len(), "{a:?} vs {b:?}");
            assert_common_subsequence(&a, &b, &forward);
            assert_common_subsequence(&b, &a, &backward);
        }
    }

    #[test]
    fn single_insertion() {
        let settings = LcsSettings::default();
        let a = chars("abcdef");
        let b = chars("abcXdef");
        let lcs = lcs_slices(&a, &b, &settings);
        assert_eq!(lcs.left_matches(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(lcs.right_matches(), &[0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn capped_search_still_yields_a_common_subsequence() {
        let settings = LcsSettings {
            too_long: 1.0,
            pow_limit: 1.2,
            use_greedy_method: true,
        };
        let a = chars("the quick brown fox jumps over the lazy dog again and again");
        let b = chars("a lazy cat sleeps under the quick brown sofa over and over");
        let lcs = lcs_slices(&a, &b, &settings);
        assert_common_subsequence(&a, &b, &lcs);

        let exact = lcs_slices(&a, &b, &LcsSettings::default());
        assert!(lcs.len() <= exact.len());
    }
}
