//! Error types returned by the replacer.

use crate::frame::FrameId;
use thiserror::Error;

/// The ways a replacer operation can be rejected.
///
/// Every variant is a boundary-validation failure: the replacer's state is left untouched when one
/// of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplacerError {
    /// The frame ID is outside of the range `[0, capacity)`.
    #[error("frame {frame_id} is out of range for a replacer of {capacity} frames")]
    InvalidFrame {
        /// The rejected frame ID.
        frame_id: FrameId,
        /// The number of frames the replacer was created with.
        capacity: usize,
    },

    /// Attempted to remove a tracked frame that is not evictable.
    #[error("frame {0} is pinned and cannot be removed")]
    FramePinned(FrameId),

    /// The replacer was configured with zero frames or a `k` of zero.
    #[error("invalid replacer configuration: {0}")]
    InvalidConfig(&'static str),
}

/// A specialized `Result` type for replacer operations.
pub type Result<T> = std::result::Result<T, ReplacerError>;

/// Returned by [`LruKReplacer::check_invariants`](crate::replacer::LruKReplacer::check_invariants)
/// when the internal bookkeeping has drifted out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the description of the invariant that failed.
    pub fn message(&self) -> &str {
        &self.0
    }
}
