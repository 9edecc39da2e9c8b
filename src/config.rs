//! Construction parameters for a replacer.

use crate::error::{ReplacerError, Result};
use derivative::Derivative;

/// The default `K` used when one is not given explicitly.
pub const DEFAULT_K: usize = 2;

/// The number of frames tracked by a default configuration.
pub const DEFAULT_NUM_FRAMES: usize = 64;

/// The immutable parameters of a replacer, fixed at construction.
#[derive(Derivative, Debug, Clone, Copy, PartialEq, Eq)]
#[derivative(Default)]
pub struct ReplacerConfig {
    /// The number of frames the replacer tracks. Valid frame IDs are `[0, num_frames)`.
    #[derivative(Default(value = "DEFAULT_NUM_FRAMES"))]
    pub num_frames: usize,

    /// The number of accesses after which a frame is ordered by backward `K`-distance.
    #[derivative(Default(value = "DEFAULT_K"))]
    pub k: usize,
}

impl ReplacerConfig {
    /// Creates a configuration for `num_frames` frames with the [`DEFAULT_K`].
    pub fn new(num_frames: usize) -> Self {
        Self {
            num_frames,
            k: DEFAULT_K,
        }
    }

    /// Sets `k`.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Checks that the configuration describes a usable replacer.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidConfig`] if `num_frames` or `k` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 {
            return Err(ReplacerError::InvalidConfig("num_frames must be > 0"));
        }
        if self.k == 0 {
            return Err(ReplacerError::InvalidConfig("k must be >= 1"));
        }
        Ok(())
    }
}
