//! Looping timeline that drives swimmer playheads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use swim_core::InstanceId;

use crate::ease::Ease;

/// Read-only view of the playhead each swimmer should use this frame.
pub trait PlayheadSource {
    /// Playhead in `[0, 1]` for `id`; unknown ids sit at 0.
    fn current_playhead(&self, id: InstanceId) -> f64;
}

/// One 0 → 1 tween inside a timeline cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayheadTrack {
    /// Seconds from the start of a cycle until the tween begins
    pub start: f64,
    /// Seconds the tween takes
    pub duration: f64,
    pub ease: Ease,
}

impl PlayheadTrack {
    pub fn new(start: f64, duration: f64, ease: Ease) -> Self {
        Self { start, duration, ease }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Value at `local` seconds into a cycle.
    pub fn value_at(&self, local: f64) -> f64 {
        if local < self.start {
            return 0.0;
        }
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.ease.apply((local - self.start) / self.duration)
    }
}

/// Tracks that replay forever, with a pause after each cycle.
///
/// During the pause every track holds its end value; a new cycle resets
/// tracks that have not started yet back to 0.
#[derive(Clone, Debug, Default)]
pub struct LoopingTimeline {
    tracks: HashMap<InstanceId, PlayheadTrack>,
    repeat_delay: f64,
    time: f64,
}

impl LoopingTimeline {
    pub fn new(repeat_delay: f64) -> Self {
        Self {
            tracks: HashMap::new(),
            repeat_delay: repeat_delay.max(0.0),
            time: 0.0,
        }
    }

    pub fn insert(&mut self, id: InstanceId, track: PlayheadTrack) {
        self.tracks.insert(id, track);
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<PlayheadTrack> {
        self.tracks.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Length of the animated part of one cycle.
    pub fn active_duration(&self) -> f64 {
        self.tracks.values().map(PlayheadTrack::end).fold(0.0, f64::max)
    }

    /// Active duration plus the pause.
    pub fn cycle_length(&self) -> f64 {
        self.active_duration() + self.repeat_delay
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn seek(&mut self, time: f64) {
        self.time = time.max(0.0);
    }

    pub fn advance(&mut self, dt: f64) {
        self.seek(self.time + dt);
    }

    /// Seconds into the current cycle.
    pub fn local_time(&self) -> f64 {
        let cycle = self.cycle_length();
        if cycle <= 0.0 {
            0.0
        } else {
            self.time.rem_euclid(cycle)
        }
    }
}

impl PlayheadSource for LoopingTimeline {
    fn current_playhead(&self, id: InstanceId) -> f64 {
        self.tracks
            .get(&id)
            .map_or(0.0, |track| track.value_at(self.local_time()))
    }
}
