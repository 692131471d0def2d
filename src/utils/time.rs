use std::time::{Duration, Instant};

/// Longest step a single frame may advance the simulation by.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

/// Frame clock feeding [`Viewer::tick`](crate::viewer::Viewer::tick).
///
/// Deltas are capped at `max_delta`, so a stalled frame (window drag, GPU
/// init, a slow load continuation) resumes animations where they were
/// instead of snapping them to their end pose.
#[derive(Debug, Clone)]
pub struct Timer {
    last_tick: Instant,
    max_delta: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_delta(DEFAULT_MAX_DELTA)
    }

    #[must_use]
    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last_tick: Instant::now(),
            max_delta,
            frame_count: 0,
        }
    }

    /// Seconds since the previous tick, capped at `max_delta`.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) against an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick).min(self.max_delta);
        self.last_tick = now;
        self.frame_count += 1;
        delta.as_secs_f32()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
