/// Tuning knobs for the LCS search.
///
/// The search is exact as long as `left_len * right_len` stays below
/// [`too_long`](Self::too_long). Above that, the number of differences the
/// search is willing to explore is reduced to `D^(pow_limit - 1)` and the
/// remaining work falls back to an approximate split, trading optimality for a
/// bounded running time.
#[derive(Debug, Clone, PartialEq)]
pub struct LcsSettings {
    /// Product of the two sequence lengths above which the search depth is capped.
    pub too_long: f64,

    /// Exponent used to cap the search depth for long inputs.
    pub pow_limit: f64,

    /// Use the greedy Myers engine. This is the only supported engine;
    /// disabling it makes every differencing call fail.
    pub use_greedy_method: bool,
}

impl Default for LcsSettings {
    fn default() -> Self {
        Self {
            too_long: 100_000_000.0,
            pow_limit: 1.5,
            use_greedy_method: true,
        }
    }
}
