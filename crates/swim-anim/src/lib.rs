//! SwimPath animation: easing and the looping timeline that advances playheads.

pub mod ease;
pub mod timeline;

pub use ease::{Ease, EasePath, EaseSegment};
pub use timeline::{LoopingTimeline, PlayheadSource, PlayheadTrack};
