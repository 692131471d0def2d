use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Direction of travel when a one-shot action reaches its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayDirection {
    Forward,
    Reverse,
}

/// A stateful player bound to one clip.
///
/// An action only advances once it has been scheduled with [`play`](Self::play).
/// In [`LoopMode::Once`] the action finishes when the cursor crosses `duration`
/// (forward) or `0` (reverse): with `clamp_when_finished` it pauses on the
/// bound and keeps holding the final pose, otherwise it disables itself.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub clamp_when_finished: bool,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    running: bool,
    finished: bool,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            clamp_when_finished: false,
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            running: false,
            finished: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Schedules the action. Does not touch the cursor.
    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.reset()
    }

    /// Rewinds the cursor to 0 and clears the playback bookkeeping.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.reset_playback_state()
    }

    /// Clears finished/paused/disabled state but keeps the cursor where it is.
    pub fn reset_playback_state(&mut self) -> &mut Self {
        self.paused = false;
        self.enabled = true;
        self.finished = false;
        self
    }

    /// Scheduled, enabled, not paused and not at a one-shot bound.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && self.enabled && !self.paused && !self.finished && self.time_scale != 0.0
    }

    /// Scheduled and enabled; a clamped, finished action is still active and
    /// keeps writing its final pose.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.running && self.enabled
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the cursor by `dt * time_scale`.
    ///
    /// Returns the direction of travel when a one-shot action reaches its
    /// bound during this step.
    pub fn update(&mut self, dt: f32) -> Option<PlayDirection> {
        if !self.running || self.paused || !self.enabled || self.finished {
            return None;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return None;
        }

        let step = dt * self.time_scale;
        if step == 0.0 {
            return None;
        }
        self.time += step;

        match self.loop_mode {
            LoopMode::Once => {
                // Only the bound in the direction of travel ends the action.
                let direction = if step > 0.0 && self.time >= duration {
                    self.time = duration;
                    PlayDirection::Forward
                } else if step < 0.0 && self.time <= 0.0 {
                    self.time = 0.0;
                    PlayDirection::Reverse
                } else {
                    return None;
                };

                self.finished = true;
                if self.clamp_when_finished {
                    self.paused = true;
                } else {
                    self.enabled = false;
                }
                Some(direction)
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    self.time = duration + (self.time % duration);
                }
                None
            }
            LoopMode::PingPong => {
                // Bounce off either end and keep travelling the other way.
                if self.time >= duration {
                    self.time = (2.0 * duration - self.time).max(0.0);
                    self.time_scale = -self.time_scale;
                } else if self.time < 0.0 {
                    self.time = (-self.time).min(duration);
                    self.time_scale = -self.time_scale;
                }
                None
            }
        }
    }

    /// Samples the track at `track_index` at the current cursor.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => {
                t.sample_with_cursor(self.time, cursor).map(TrackValue::Quaternion)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(glam::Vec3),
    Quaternion(glam::Quat),
}
