//! The set of frames that have at least `K` recorded accesses.

use crate::frame::{FrameId, Timestamp};
use std::collections::BTreeMap;

/// The position of a frame in the [`MaturedSet`].
///
/// Keys order first by the timestamp of the frame's `K`-th most recent access, and then by the
/// order in which entries were inserted, so that among frames with equal backward `K`-distance the
/// one inserted first is evicted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct MaturedKey {
    /// The timestamp of the `K`-th most recent access.
    pub(crate) kth: Timestamp,

    /// A per-set insertion counter.
    pub(crate) sequence: u64,
}

/// Frames with a finite backward `K`-distance, ordered from the oldest `K`-th most recent access
/// to the newest.
#[derive(Debug, Default)]
pub(crate) struct MaturedSet {
    /// The members, keyed by their position.
    order: BTreeMap<MaturedKey, FrameId>,

    /// The sequence number handed to the next inserted entry.
    next_sequence: u64,
}

impl MaturedSet {
    /// Inserts a frame whose `K`-th most recent access was at `kth`, after every existing member
    /// with the same `kth`. Returns the key the frame was stored under.
    pub(crate) fn insert(&mut self, kth: Timestamp, frame_id: FrameId) -> MaturedKey {
        let key = MaturedKey {
            kth,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let displaced = self.order.insert(key, frame_id);
        debug_assert!(displaced.is_none());

        key
    }

    /// Moves a member to the position given by its new `K`-th most recent access.
    ///
    /// The member is reinserted with a fresh sequence number, exactly as if it had just arrived.
    pub(crate) fn reposition(
        &mut self,
        previous: Option<MaturedKey>,
        kth: Timestamp,
        frame_id: FrameId,
    ) -> MaturedKey {
        if let Some(previous) = previous {
            let removed = self.remove(previous);
            debug_assert_eq!(removed, Some(frame_id));
        }
        self.insert(kth, frame_id)
    }

    /// Removes the member stored under `key`.
    pub(crate) fn remove(&mut self, key: MaturedKey) -> Option<FrameId> {
        self.order.remove(&key)
    }

    /// Looks up the member stored under `key`.
    pub(crate) fn get(&self, key: MaturedKey) -> Option<FrameId> {
        self.order.get(&key).copied()
    }

    /// Finds the member with the smallest key for which `evictable` returns `true`.
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
