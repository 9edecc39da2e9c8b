//! The set of frames that have fewer than `K` recorded accesses.

use crate::frame::{FrameId, Timestamp};
use std::collections::BTreeMap;

/// Frames with an infinite backward `K`-distance, ordered from least to most recently accessed.
///
/// Every access gets a unique timestamp, so a member's most recent access time identifies it.
#[derive(Debug, Default)]
pub(crate) struct ColdSet {
    /// Maps each member's most recent access time to the member.
    order: BTreeMap<Timestamp, FrameId>,
}

impl ColdSet {
    /// Adds a frame at the most-recent end of the set.
    pub(crate) fn insert(&mut self, last_access: Timestamp, frame_id: FrameId) {
        let displaced = self.order.insert(last_access, frame_id);
        debug_assert!(displaced.is_none(), "Two cold frames shared a timestamp");
    }

    /// Moves a member to the most-recent end of the set after it was accessed again.
    pub(crate) fn touch(&mut self, previous: Timestamp, now: Timestamp, frame_id: FrameId) {
        let removed = self.remove(previous);
        debug_assert_eq!(removed, Some(frame_id));
        self.insert(now, frame_id);
    }

    /// Removes the member whose most recent access was at `last_access`.
    pub(crate) fn remove(&mut self, last_access: Timestamp) -> Option<FrameId> {
        self.order.remove(&last_access)
    }

    /// Looks up the member whose most recent access was at `last_access`.
    pub(crate) fn get(&self, last_access: Timestamp) -> Option<FrameId> {
        self.order.get(&last_access).copied()
    }

    /// Finds the least recently accessed member for which `evictable` returns `true`.
    pub(crate) fn find_victim<F>(&self, mut evictable: F) -> Option<FrameId>
    where
        F: FnMut(FrameId) -> bool,
    {
        self.order
            .values()
            .copied()
            .find(|&frame_id| evictable(frame_id))
    }

    /// The number of members.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn victims_in_lru_order() {
        let mut cold = ColdSet::default();
        cold.insert(1, 7);
        cold.insert(2, 3);
        cold.insert(3, 5);

        assert_eq!(cold.find_victim(|_| true), Some(7));
        assert_eq!(cold.find_victim(|frame_id| frame_id != 7), Some(3));
        assert_eq!(cold.find_victim(|_| false), None);
    }

    #[test]
    fn touch_moves_to_most_recent_end() {
        let mut cold = ColdSet::default();
        cold.insert(1, 0);
        cold.insert(2, 1);
        cold.touch(1, 3, 0);

        assert_eq!(cold.len(), 2);
        assert_eq!(cold.get(1), None);
        assert_eq!(cold.get(3), Some(0));
        assert_eq!(cold.find_victim(|_| true), Some(1));
    }

    #[test]
    fn remove_by_last_access() {
        let mut cold = ColdSet::default();
        cold.insert(4, 2);

        assert_eq!(cold.remove(5), None);
        assert_eq!(cold.remove(4), Some(2));
        assert_eq!(cold.len(), 0);
    }
}
