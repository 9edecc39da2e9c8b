//! Identifiers and classifications for the frames a replacer keeps track of.

use std::fmt;

/// The index of a buffer frame, in the range `[0, num_frames)` of the owning replacer.
pub type FrameId = usize;

/// A logical timestamp. The replacer advances its clock by one on every recorded access.
pub type Timestamp = u64;

/// The classification of a frame, derived from how many accesses have been recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// No accesses have been recorded since the frame was created, evicted, or removed.
    Untracked,
    /// Fewer than `K` accesses have been recorded. The frame has an infinite backward `K`-distance
    /// and is ordered purely by recency.
    Cold,
    /// At least `K` accesses have been recorded, so the frame is ordered by the timestamp of its
    /// `K`-th most recent access.
    Matured,
}

impl FrameState {
    /// Classifies a frame given its recorded access count and the replacer's `k`.
    pub fn classify(count: u64, k: usize) -> Self {
        if count == 0 {
            Self::Untracked
        } else if count < k as u64 {
            Self::Cold
        } else {
            Self::Matured
        }
    }

    /// Returns `true` if the frame is a member of either the cold or the matured set.
    pub fn is_tracked(self) -> bool {
        !matches!(self, Self::Untracked)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untracked => f.write_str("untracked"),
            Self::Cold => f.write_str("cold"),
            Self::Matured => f.write_str("matured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_count() {
        assert_eq!(FrameState::classify(0, 3), FrameState::Untracked);
        assert_eq!(FrameState::classify(1, 3), FrameState::Cold);
        assert_eq!(FrameState::classify(2, 3), FrameState::Cold);
        assert_eq!(FrameState::classify(3, 3), FrameState::Matured);
        assert_eq!(FrameState::classify(40, 3), FrameState::Matured);
    }

    #[test]
    fn k_of_one_skips_cold() {
        assert_eq!(FrameState::classify(1, 1), FrameState::Matured);
        assert!(!FrameState::Untracked.is_tracked());
        assert!(FrameState::Cold.is_tracked());
    }
}
