//! Frame pacing and the draw-gating loop state.
//!
//! The clock turns the render loop's poll timeout into an explicit frame
//! boundary, so pacing is testable with synthetic instants instead of a real
//! clock. The loop itself is a two-state machine: it does nothing until the
//! first gesture starts it, then schedules every frame unconditionally and
//! gates only the draw step on playback.

use std::time::{Duration, Instant};

/// One display frame at roughly 60 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Time left until the next frame boundary. Zero once the boundary has
    /// passed, which makes the event poll non-blocking.
    pub fn budget(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// True when a frame boundary has passed since the last tick. A stall
    /// longer than one interval yields a single tick and realigns, so missed
    /// frames are skipped rather than drawn in a burst.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    NotStarted,
    Running,
}

/// Frame counter pair for the render loop. Frames advance on every tick
/// while running; draws advance only when playback is live.
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
    draws: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::NotStarted,
            frames: 0,
            draws: 0,
        }
    }

    /// Starts the loop. Called at most once in practice; extra calls are
    /// harmless.
    pub fn start(&mut self) {
        self.state = LoopState::Running;
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Accounts for one frame boundary. Returns whether this frame draws.
    pub fn on_frame(&mut self, playing: bool) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.frames += 1;
        if playing {
            self.draws += 1;
            true
        } else {
            false
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}
