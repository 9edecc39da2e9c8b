//! Victim selection for the LRU-K policy.

use super::cold::ColdSet;
use super::history::AccessHistory;
use super::matured::MaturedSet;
use crate::frame::{FrameId, FrameState};

/// A frame chosen for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Victim {
    /// The frame to evict.
    pub(crate) frame_id: FrameId,

    /// The set the frame was found in.
    pub(crate) state: FrameState,
}

/// Picks the next frame to evict without modifying anything.
///
/// Cold frames have an infinite backward `K`-distance, so the least recently accessed evictable
/// cold frame always wins. Only when every cold frame is pinned do we fall back to the evictable
/// matured frame with the oldest `K`-th most recent access.
pub(crate) fn select_victim(
    history: &AccessHistory,
    cold: &ColdSet,
    matured: &MaturedSet,
) -> Option<Victim> {
    let evictable = |frame_id: FrameId| history.get(frame_id).is_evictable();

    if let Some(frame_id) = cold.find_victim(evictable) {
        return Some(Victim {
            frame_id,
            state: FrameState::Cold,
        });
    }

    matured.find_victim(evictable).map(|frame_id| Victim {
        frame_id,
        state: FrameState::Matured,
    })
}
