//! Per-frame access history and the replacer's logical clock.

use super::matured::MaturedKey;
use crate::frame::{FrameId, FrameState, Timestamp};
use derivative::Derivative;
use std::cmp::Ordering;
use std::collections::VecDeque;

/// The access bookkeeping for a single frame.
#[derive(Debug, Default)]
pub(crate) struct FrameRecord {
    /// The number of accesses recorded since the frame was last untracked.
    count: u64,

    /// The most recent access timestamps, oldest first. Never holds more than `k` entries.
    history: VecDeque<Timestamp>,

    /// Whether the frame may be evicted. Only meaningful while the frame is tracked.
    evictable: bool,

    /// The frame's key in the matured set, present only while the frame is matured.
    matured_key: Option<MaturedKey>,
}

impl FrameRecord {
    /// The number of accesses recorded since the frame was last untracked.
    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// The retained access timestamps, oldest first.
    pub(crate) fn history(&self) -> &VecDeque<Timestamp> {
        &self.history
    }

    /// Whether the frame may be evicted.
    pub(crate) fn is_evictable(&self) -> bool {
        self.evictable
    }

    /// The timestamp of the most recent access, which is also the frame's key in the cold set.
    pub(crate) fn last_access(&self) -> Option<Timestamp> {
        self.history.back().copied()
    }

    /// The frame's key in the matured set.
    pub(crate) fn matured_key(&self) -> Option<MaturedKey> {
        self.matured_key
    }

    /// Returns the record to its untracked state.
    fn clear(&mut self) {
        self.count = 0;
        self.history.clear();
        self.evictable = false;
        self.matured_key = None;
    }
}

/// How a single recorded access moved a frame with respect to the cold and matured sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The frame was untracked and has become cold.
    Admitted {
        /// The time of the access.
        now: Timestamp,
    },
    /// The frame was cold and is still cold.
    Touched {
        /// The time of the frame's previous access, its old cold-set key.
        previous: Timestamp,
        /// The time of the access.
        now: Timestamp,
    },
    /// The frame has just reached `k` accesses.
    Matured {
        /// The frame's old cold-set key, or `None` if the frame was untracked (only when `k == 1`).
        previous: Option<Timestamp>,
        /// The timestamp of the frame's `k`-th most recent access.
        kth: Timestamp,
    },
    /// The frame was already matured, and its oldest retained access was dropped.
    Advanced {
        /// The frame's old matured-set key.
        previous: Option<MaturedKey>,
        /// The timestamp of the frame's new `k`-th most recent access.
        kth: Timestamp,
    },
}

impl Transition {
    /// Returns `true` if the access was the first one recorded for the frame.
    pub(crate) fn is_first_access(&self) -> bool {
        matches!(
            self,
            Self::Admitted { .. } | Self::Matured { previous: None, .. }
        )
    }
}

/// The access records of every frame, stored in an arena indexed by [`FrameId`], together with the
/// logical clock.
///
/// Callers are expected to have validated frame IDs before indexing into the arena.
#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct AccessHistory {
    /// The number of accesses after which a frame is matured.
    k: usize,

    /// One record per frame.
    #[derivative(Debug = "ignore")]
    records: Vec<FrameRecord>,

    /// The timestamp of the most recently recorded access.
    clock: Timestamp,
}

impl AccessHistory {
    /// Creates an `AccessHistory` with `num_frames` untracked records.
    pub(crate) fn new(num_frames: usize, k: usize) -> Self {
        let records = (0..num_frames).map(|_| FrameRecord::default()).collect();

        Self {
            k,
            records,
            clock: 0,
        }
    }

    /// The current logical time.
    pub(crate) fn now(&self) -> Timestamp {
        self.clock
    }

    /// Gets the record of a frame.
    pub(crate) fn get(&self, frame_id: FrameId) -> &FrameRecord {
        &self.records[frame_id]
    }

    /// Classifies a frame by its recorded access count.
    pub(crate) fn state(&self, frame_id: FrameId) -> FrameState {
        FrameState::classify(self.records[frame_id].count, self.k)
    }

    /// Iterates over every record, tracked or not.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (FrameId, &FrameRecord)> + '_ {
        self.records.iter().enumerate()
    }

    /// Advances the clock and records an access to the frame at the new time, returning how the
    /// frame must move between the cold and matured sets.
    ///
    /// A frame's first access marks it evictable. Once a frame has more than `k` accesses, only the
    /// last `k` timestamps are kept.
    pub(crate) fn record(&mut self, frame_id: FrameId) -> Transition {
        self.clock += 1;
        let now = self.clock;
        let k = self.k as u64;

        let record = &mut self.records[frame_id];
        let previous = record.last_access();

        record.count += 1;
        record.history.push_back(now);
        if record.count == 1 {
            record.evictable = true;
        }

        match record.count.cmp(&k) {
            Ordering::Less => match previous {
                None => Transition::Admitted { now },
                Some(previous) => Transition::Touched { previous, now },
            },
            Ordering::Equal => Transition::Matured {
                previous,
                kth: record.history.front().copied().unwrap_or(now),
            },
            Ordering::Greater => {
                record.history.pop_front();

                Transition::Advanced {
                    previous: record.matured_key.take(),
                    kth: record.history.front().copied().unwrap_or(now),
                }
            }
        }
    }

    /// Stores the frame's position in the matured set.
    pub(crate) fn set_matured_key(&mut self, frame_id: FrameId, key: MaturedKey) {
        self.records[frame_id].matured_key = Some(key);
    }

    /// Sets the evictable flag of a tracked frame. Returns `true` if the flag changed.
    ///
    /// Untracked frames are left alone.
    pub(crate) fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> bool {
        let record = &mut self.records[frame_id];

        if record.count == 0 || record.evictable == evictable {
            return false;
        }

        record.evictable = evictable;
        true
    }

    /// Clears the frame's history, returning it to [`FrameState::Untracked`].
    pub(crate) fn clear(&mut self, frame_id: FrameId) {
        self.records[frame_id].clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_shared_between_frames() {
        let mut history = AccessHistory::new(4, 2);

        assert_eq!(history.record(0), Transition::Admitted { now: 1 });
        assert_eq!(history.record(3), Transition::Admitted { now: 2 });
        assert_eq!(history.now(), 2);
        assert_eq!(history.get(0).last_access(), Some(1));
        assert_eq!(history.get(3).last_access(), Some(2));
    }

    #[test]
    fn first_access_marks_evictable() {
        let mut history = AccessHistory::new(2, 3);
        assert!(!history.get(1).is_evictable());

        let transition = history.record(1);
        assert!(transition.is_first_access());
        assert!(history.get(1).is_evictable());
        assert_eq!(history.state(1), FrameState::Cold);
    }

    #[test]
    fn history_is_capped_at_k() {
        let mut history = AccessHistory::new(1, 3);

        assert_eq!(history.record(0), Transition::Admitted { now: 1 });
        assert_eq!(
            history.record(0),
            Transition::Touched {
                previous: 1,
                now: 2
            }
        );
        assert_eq!(
            history.record(0),
            Transition::Matured {
                previous: Some(2),
                kth: 1
            }
        );
        assert_eq!(
            history.record(0),
            Transition::Advanced {
                previous: None,
                kth: 2
            }
        );

        let record = history.get(0);
        assert_eq!(record.count(), 4);
        assert_eq!(record.history().iter().copied().collect::<Vec<Timestamp>>(), vec![2, 3, 4]);
        assert_eq!(history.state(0), FrameState::Matured);
    }

    #[test]
    fn k_of_one_matures_on_first_access() {
        let mut history = AccessHistory::new(1, 1);

        let transition = history.record(0);
        assert_eq!(
            transition,
            Transition::Matured {
                previous: None,
                kth: 1
            }
        );
        assert!(transition.is_first_access());

        assert_eq!(
            history.record(0),
            Transition::Advanced {
                previous: None,
                kth: 2
            }
        );
        assert_eq!(history.get(0).history().len(), 1);
    }

    #[test]
    fn set_evictable_ignores_untracked_frames() {
        let mut history = AccessHistory::new(2, 2);
        assert!(!history.set_evictable(0, true));

        history.record(0);
        assert!(!history.set_evictable(0, true));
        assert!(history.set_evictable(0, false));
        assert!(!history.get(0).is_evictable());
    }

    #[test]
    fn clear_resets_the_record() {
        let mut history = AccessHistory::new(1, 2);
        history.record(0);
        history.record(0);
        history.clear(0);

        let record = history.get(0);
        assert_eq!(record.count(), 0);
        assert!(record.history().is_empty());
        assert_eq!(record.matured_key(), None);
        assert_eq!(history.state(0), FrameState::Untracked);

        // The clock keeps running across resets.
        assert_eq!(history.record(0), Transition::Admitted { now: 3 });
    }
}
