//! Replacement policies that decide which buffer frame to reclaim next.
//!
//! A buffer pool manager reports every frame access and every pin / unpin transition to a
//! [`Replacer`], and asks it for a victim whenever it needs a free frame.

use crate::error::Result;
use crate::frame::FrameId;

mod cold;
mod evictor;
mod history;
mod lru_k;
mod matured;

pub use lru_k::LruKReplacer;

/// The interface a buffer pool manager uses to drive a replacement policy.
///
/// All methods take `&self`: implementations synchronize internally so that a single replacer can
/// be shared between every worker thread of the buffer pool.
pub trait Replacer {
    /// Records that the given frame was accessed at the current logical time.
    ///
    /// A frame's first recorded access starts tracking it, and it is evictable by default.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidFrame`](crate::ReplacerError::InvalidFrame) if the frame ID
    /// is out of range.
    fn record_access(&self, frame_id: FrameId) -> Result<()>;

    /// Marks a tracked frame as evictable (unpinned) or not evictable (pinned).
    ///
    /// Does nothing if the frame is not tracked, or if it already has the requested flag.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidFrame`](crate::ReplacerError::InvalidFrame) if the frame ID
    /// is out of range.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()>;

    /// Finds a frame to evict, stops tracking it, and returns its ID.
    ///
    /// Returns `None` if every tracked frame is pinned, or if no frames are tracked at all.
    fn evict(&self) -> Option<FrameId>;

    /// Stops tracking a frame, clearing its access history. Does nothing if it is not tracked.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidFrame`](crate::ReplacerError::InvalidFrame) if the frame ID
    /// is out of range, and [`ReplacerError::FramePinned`](crate::ReplacerError::FramePinned) if the
    /// frame is tracked but not evictable.
    fn remove(&self, frame_id: FrameId) -> Result<()>;

    /// Returns the number of evictable frames.
    fn size(&self) -> usize;
}
