//! An LRU-K replacement policy for the fixed set of frames managed by a buffer pool.
//!
//! The [`LruKReplacer`](replacer::LruKReplacer) decides which frame a buffer pool manager should
//! reclaim next. It tracks the last `K` logical access times of every frame, and evicts the frame
//! whose `K`-th most recent access is furthest in the past. Frames that have been accessed fewer
//! than `K` times have an infinite backward `K`-distance, and are evicted first in plain LRU order.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::missing_safety_doc)]

pub mod config;
pub mod error;
pub mod frame;
pub mod replacer;

pub use config::ReplacerConfig;
pub use error::{InvariantError, ReplacerError, Result};
pub use frame::{FrameId, FrameState, Timestamp};
pub use replacer::{LruKReplacer, Replacer};
