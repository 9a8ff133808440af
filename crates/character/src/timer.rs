/// Shared animation clock owned by the viewer and advanced once per frame.
///
/// Idle effects (breathing) derive their phase from it so that every effect
/// sees the same time within a frame.
#[derive(Debug, Clone, Default)]
pub struct AnimationTimer {
    elapsed: f64,
    ticks: u64,
}

impl AnimationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative steps are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += dt as f64;
        }
        self.ticks += 1;
    }

    /// Seconds accumulated so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Position within a cycle of `period` seconds, in `[0, 1)`.
    pub fn phase(&self, period: f32) -> f32 {
        if period <= 0.0 {
            return 0.0;
        }
        (self.elapsed / period as f64).fract() as f32
    }
}
