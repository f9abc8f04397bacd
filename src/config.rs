/// Tunables for a [`SecureRegion`](crate::SecureRegion).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
    /// Random overwrite passes run before the final zero pass of a clear.
    ///
    /// A single zero pass is the usual standard; `0` selects exactly that.
    pub random_passes: usize,

    /// Slack kept on both sides of a window by
    /// [`derive_default_window`](crate::SecureRegion::derive_default_window).
    pub min_margin: usize,

    /// Exclude the backing region from core dumps where the platform allows it.
    pub exclude_from_dumps: bool,
}

impl Config {
    pub const DEFAULT_RANDOM_PASSES: usize = 10;
    pub const DEFAULT_MIN_MARGIN: usize = 64;

    pub fn with_random_passes(mut self, random_passes: usize) -> Self {
        self.random_passes = random_passes;
        self
    }

    pub fn with_min_margin(mut self, min_margin: usize) -> Self {
        self.min_margin = min_margin;
        self
    }

    pub fn with_exclude_from_dumps(mut self, exclude_from_dumps: bool) -> Self {
        self.exclude_from_dumps = exclude_from_dumps;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            random_passes: Self::DEFAULT_RANDOM_PASSES,
            min_margin: Self::DEFAULT_MIN_MARGIN,
            exclude_from_dumps: true,
        }
    }
}
