//! Frame timing from two independent time sources.
//!
//! Delta time comes from a wall clock, FPS from a high-resolution counter.
//! The two are sampled separately and may disagree when the wall clock is
//! adjusted.

use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Delta reported by the first tick, before any interval exists.
pub const FIRST_FRAME_DELTA: f32 = 1.0 / 50.0;

/// A source of timestamps measured from an arbitrary fixed origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall clock time since the Unix epoch. Can jump backwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl TimeSource for SystemWallClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }
}

/// Monotonic counter anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicCounter {
    origin: Instant,
}

impl Default for MonotonicCounter {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicCounter {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and headless runs. Clones share one time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f32) {
        self.advance(Duration::from_secs_f32(secs));
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Timing for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameTiming {
    /// Seconds since the previous frame, by the wall clock.
    pub delta: f32,
    /// Frames per second, by the counter. Zero when no interval elapsed.
    pub fps: f32,
    /// Frames ticked so far, starting at 1.
    pub frame: u64,
}

pub struct FrameClock {
    wall: Box<dyn TimeSource>,
    counter: Box<dyn TimeSource>,
    last_wall: Option<Duration>,
    last_counter: Duration,
    frame: u64,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("last_wall", &self.last_wall)
            .field("last_counter", &self.last_counter)
            .field("frame", &self.frame)
            .finish()
    }
}

impl FrameClock {
    /// The counter is sampled immediately, so the first FPS reading covers
    /// the time between construction and the first tick.
    pub fn new(wall: Box<dyn TimeSource>, counter: Box<dyn TimeSource>) -> Self {
        let last_counter = counter.now();
        Self {
            wall,
            counter,
            last_wall: None,
            last_counter,
            frame: 0,
        }
    }

    pub fn system() -> Self {
        Self::new(
            Box::new(SystemWallClock),
            Box::new(MonotonicCounter::default()),
        )
    }

    /// Both sources driven by the same manual clock.
    pub fn manual(clock: &ManualClock) -> Self {
        Self::new(Box::new(clock.clone()), Box::new(clock.clone()))
    }

    pub fn tick(&mut self) -> FrameTiming {
        let wall_now = self.wall.now();
        let delta = match self.last_wall {
            None => FIRST_FRAME_DELTA,
            Some(prev) => match wall_now.checked_sub(prev) {
                Some(d) => d.as_secs_f32(),
                None => {
                    tracing::warn!(
                        back_by = ?(prev - wall_now),
                        "wall clock moved backwards, clamping delta to zero"
                    );
                    0.0
                }
            },
        };
        self.last_wall = Some(wall_now);

        let counter_now = self.counter.now();
        let interval = counter_now.saturating_sub(self.last_counter);
        self.last_counter = counter_now;
        let fps = if interval.is_zero() {
            0.0
        } else {
            1.0 / interval.as_secs_f32()
        };

        self.frame += 1;
        FrameTiming {
            delta,
            fps,
            frame: self.frame,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}
