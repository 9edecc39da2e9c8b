//! The LRU-K replacer.

use super::cold::ColdSet;
use super::evictor;
use super::history::{AccessHistory, Transition};
use super::matured::MaturedSet;
use super::Replacer;
use crate::config::ReplacerConfig;
use crate::error::{InvariantError, ReplacerError, Result};
use crate::frame::{FrameId, FrameState};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

/// All of the mutable state of an [`LruKReplacer`], protected by a single lock.
#[derive(Debug)]
struct LruKInner {
    /// Per-frame access records and the logical clock.
    history: AccessHistory,

    /// Frames with fewer than `k` accesses.
    cold: ColdSet,

    /// Frames with at least `k` accesses.
    matured: MaturedSet,

    /// The number of tracked frames that are evictable.
    curr_size: usize,
}

impl LruKInner {
    /// Records an access and moves the frame into the set its new access count places it in.
    fn record_access(&mut self, frame_id: FrameId) -> Transition {
        let transition = self.history.record(frame_id);

        if transition.is_first_access() {
            self.curr_size += 1;
        }

        match transition {
            Transition::Admitted { now } => self.cold.insert(now, frame_id),
            Transition::Touched { previous, now } => self.cold.touch(previous, now, frame_id),
            Transition::Matured { previous, kth } => {
                if let Some(previous) = previous {
                    let removed = self.cold.remove(previous);
                    debug_assert_eq!(removed, Some(frame_id));
                }
                let key = self.matured.insert(kth, frame_id);
                self.history.set_matured_key(frame_id, key);
            }
            Transition::Advanced { previous, kth } => {
                let key = self.matured.reposition(previous, kth, frame_id);
                self.history.set_matured_key(frame_id, key);
            }
        }

        transition
    }

    /// Updates the evictable flag of a tracked frame. Returns `true` if the flag changed.
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> bool {
        if !self.history.set_evictable(frame_id, evictable) {
            return false;
        }

        if evictable {
            self.curr_size += 1;
        } else {
            self.curr_size -= 1;
        }

        true
    }

    /// Evicts the best victim, if there is one.
    fn evict(&mut self) -> Option<evictor::Victim> {
        if self.curr_size == 0 {
            return None;
        }

        let victim = evictor::select_victim(&self.history, &self.cold, &self.matured)?;
        self.untrack(victim.frame_id);

        Some(victim)
    }

    /// Removes a tracked frame from whichever set holds it and clears its history.
    fn untrack(&mut self, frame_id: FrameId) {
        let record = self.history.get(frame_id);
        let evictable = record.is_evictable();

        match self.history.state(frame_id) {
            FrameState::Untracked => return,
            FrameState::Cold => {
                if let Some(last_access) = record.last_access() {
                    self.cold.remove(last_access);
                }
            }
            FrameState::Matured => {
                if let Some(key) = record.matured_key() {
                    self.matured.remove(key);
                }
            }
        }

        if evictable {
            self.curr_size -= 1;
        }
        self.history.clear(frame_id);
    }
}

/// A thread-safe LRU-K replacer.
///
/// The replacer evicts the frame whose backward `K`-distance is the largest, where the backward
/// `K`-distance is the difference between the current logical time and the time of the frame's
/// `K`-th most recent access. A frame with fewer than `K` recorded accesses has an infinite
/// backward `K`-distance, and such frames are evicted in plain LRU order before any frame with a
/// finite distance.
///
/// Every operation runs under one mutex, so the replacer can be shared freely between threads.
///
/// ```
/// use lruk_replacer::{LruKReplacer, Replacer};
///
/// let replacer = LruKReplacer::new(4, 2);
///
/// replacer.record_access(0)?;
/// replacer.record_access(1)?;
/// replacer.record_access(0)?;
///
/// // Frame 1 has only been seen once, so it goes first.
/// assert_eq!(replacer.evict(), Some(1));
/// assert_eq!(replacer.evict(), Some(0));
/// assert_eq!(replacer.evict(), None);
/// # Ok::<(), lruk_replacer::ReplacerError>(())
/// ```
#[derive(Debug)]
pub struct LruKReplacer {
    /// The number of frames tracked. Valid frame IDs are `[0, num_frames)`.
    num_frames: usize,

    /// The number of accesses after which a frame is ordered by backward `K`-distance.
    k: usize,

    /// The mutable state of the replacer.
    ///
    /// We use a synchronous / blocking mutex since every operation is short and never suspends.
    inner: Mutex<LruKInner>,
}

impl LruKReplacer {
    /// Creates a replacer for `num_frames` frames using the `k`-th most recent access.
    ///
    /// # Panics
    ///
    /// This function will panic if `num_frames` or `k` is zero. Use [`LruKReplacer::try_new`] for
    /// user-supplied parameters.
    pub fn new(num_frames: usize, k: usize) -> Self {
        Self::try_new(num_frames, k)
            .unwrap_or_else(|err| panic!("Unable to create an `LruKReplacer`: {err}"))
    }

    /// Creates a replacer for `num_frames` frames using the `k`-th most recent access.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidConfig`] if `num_frames` or `k` is zero.
    pub fn try_new(num_frames: usize, k: usize) -> Result<Self> {
        Self::with_config(ReplacerConfig::new(num_frames).with_k(k))
    }

    /// Creates a replacer from a [`ReplacerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidConfig`] if the configuration does not validate.
    pub fn with_config(config: ReplacerConfig) -> Result<Self> {
        config.validate()?;

        let ReplacerConfig { num_frames, k } = config;
        debug!(num_frames, k, "creating LRU-K replacer");

        Ok(Self {
            num_frames,
            k,
            inner: Mutex::new(LruKInner {
                history: AccessHistory::new(num_frames, k),
                cold: ColdSet::default(),
                matured: MaturedSet::default(),
                curr_size: 0,
            }),
        })
    }

    /// The number of frames this replacer tracks.
    pub fn capacity(&self) -> usize {
        self.num_frames
    }

    /// The `K` of this LRU-K replacer.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the classification of a frame.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidFrame`] if the frame ID is out of range.
    pub fn frame_state(&self, frame_id: FrameId) -> Result<FrameState> {
        self.check_frame(frame_id)?;
        Ok(self.lock().history.state(frame_id))
    }

    /// Returns `true` if the frame is tracked and evictable.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacerError::InvalidFrame`] if the frame ID is out of range.
    pub fn is_evictable(&self, frame_id: FrameId) -> Result<bool> {
        self.check_frame(frame_id)?;

        let guard = self.lock();
        let tracked = guard.history.state(frame_id).is_tracked();

        Ok(tracked && guard.history.get(frame_id).is_evictable())
    }

    /// Verifies that the cold set, the matured set, the evictable count and the per-frame records
    /// all agree with each other.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantError`] describing the first inconsistency found.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        let guard = self.lock();

        let mut evictable = 0;
        let mut cold = 0;
        let mut matured = 0;

        for (frame_id, record) in guard.history.iter() {
            let state = FrameState::classify(record.count(), self.k);

            let expected_len = record.count().min(self.k as u64);
            if record.history().len() as u64 != expected_len {
                return Err(InvariantError::new(format!(
                    "frame {frame_id} has {} timestamps but {} accesses",
                    record.history().len(),
                    record.count()
                )));
            }

            match state {
                FrameState::Untracked => {}
                FrameState::Cold => {
                    cold += 1;
                    let member = record.last_access().and_then(|ts| guard.cold.get(ts));
                    if member != Some(frame_id) {
                        return Err(InvariantError::new(format!(
                            "cold frame {frame_id} is missing from the cold set"
                        )));
                    }
                }
                FrameState::Matured => {
                    matured += 1;
                    let Some(key) = record.matured_key() else {
                        return Err(InvariantError::new(format!(
                            "matured frame {frame_id} has no matured-set key"
                        )));
                    };
                    if guard.matured.get(key) != Some(frame_id) {
                        return Err(InvariantError::new(format!(
                            "matured frame {frame_id} is missing from the matured set"
                        )));
                    }
                    if record.history().front() != Some(&key.kth) {
                        return Err(InvariantError::new(format!(
                            "matured frame {frame_id} is ordered by a stale K-th access"
                        )));
                    }
                }
            }

            if state != FrameState::Matured && record.matured_key().is_some() {
                return Err(InvariantError::new(format!(
                    "{state} frame {frame_id} still has a matured-set key"
                )));
            }

            if state.is_tracked() && record.is_evictable() {
                evictable += 1;
            }
        }

        if guard.cold.len() != cold {
            return Err(InvariantError::new(format!(
                "cold set has {} members but {cold} frames are cold",
                guard.cold.len()
            )));
        }
        if guard.matured.len() != matured {
            return Err(InvariantError::new(format!(
                "matured set has {} members but {matured} frames are matured",
                guard.matured.len()
            )));
        }
        if guard.curr_size != evictable {
            return Err(InvariantError::new(format!(
                "size is {} but {evictable} tracked frames are evictable",
                guard.curr_size
            )));
        }

        Ok(())
    }

    /// Rejects frame IDs outside of `[0, num_frames)`.
    fn check_frame(&self, frame_id: FrameId) -> Result<()> {
        if frame_id >= self.num_frames {
            warn!(frame_id, num_frames = self.num_frames, "invalid frame id");
            return Err(ReplacerError::InvalidFrame {
                frame_id,
                capacity: self.num_frames,
            });
        }
        Ok(())
    }

    /// Acquires the replacer's lock.
    ///
    /// # Panics
    ///
    /// This function will panic if another thread panicked while holding the lock.
    fn lock(&self) -> MutexGuard<'_, LruKInner> {
        self.inner.lock().expect("Lock was somehow poisoned")
    }
}

impl Replacer for LruKReplacer {
    fn record_access(&self, frame_id: FrameId) -> Result<()> {
        self.check_frame(frame_id)?;

        let mut guard = self.lock();
        let transition = guard.record_access(frame_id);

        trace!(
            frame_id,
            timestamp = guard.history.now(),
            ?transition,
            size = guard.curr_size,
            "recorded access"
        );

        Ok(())
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()> {
        self.check_frame(frame_id)?;

        let mut guard = self.lock();
        if guard.set_evictable(frame_id, evictable) {
            trace!(frame_id, evictable, size = guard.curr_size, "set evictable");
        }

        Ok(())
    }

    fn evict(&self) -> Option<FrameId> {
        let mut guard = self.lock();

        match guard.evict() {
            Some(victim) => {
                trace!(
                    frame_id = victim.frame_id,
                    state = %victim.state,
                    size = guard.curr_size,
                    "evicted frame"
                );
                Some(victim.frame_id)
            }
            None => {
                trace!(size = guard.curr_size, "no evictable frame");
                None
            }
        }
    }

    fn remove(&self, frame_id: FrameId) -> Result<()> {
        self.check_frame(frame_id)?;

        let mut guard = self.lock();
        let state = guard.history.state(frame_id);

        if !state.is_tracked() {
            return Ok(());
        }

        if !guard.history.get(frame_id).is_evictable() {
            warn!(frame_id, "tried to remove a pinned frame");
            return Err(ReplacerError::FramePinned(frame_id));
        }

        guard.untrack(frame_id);
        debug!(frame_id, %state, size = guard.curr_size, "removed frame");

        Ok(())
    }

    fn size(&self) -> usize {
        self.lock().curr_size
    }
}
