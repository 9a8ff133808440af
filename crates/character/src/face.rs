use glam::Vec2;

const WINK_INTERVAL: f32 = 3.5;
const WINK_DURATION: f32 = 0.15;
const TALK_RATE: f32 = 8.0;
const MOUTH_SHAPES: u8 = 3;

/// Idle face animation: winking, talking, random mouth shapes and glances.
#[derive(Debug, Clone)]
pub(crate) struct FaceState {
    pub wink: bool,
    pub talking: bool,
    pub random_mouth: bool,
    pub random_look: bool,
    winking: bool,
    wink_timer: f32,
    talk_time: f32,
    mouth_shape: u8,
    mouth_timer: f32,
    look: Vec2,
    look_timer: f32,
    rng: u64,
}

impl FaceState {
    pub fn new(seed: u64) -> Self {
        Self {
            wink: false,
            talking: false,
            random_mouth: false,
            random_look: false,
            winking: false,
            wink_timer: WINK_INTERVAL,
            talk_time: 0.0,
            mouth_shape: 0,
            mouth_timer: 0.0,
            look: Vec2::ZERO,
            look_timer: 0.0,
            rng: seed,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.wink {
            self.wink_timer -= dt;
            if self.wink_timer <= 0.0 {
                self.winking = !self.winking;
                self.wink_timer = if self.winking { WINK_DURATION } else { WINK_INTERVAL };
            }
        } else {
            self.winking = false;
        }

        if self.talking {
            self.talk_time += dt;
            self.mouth_shape = ((self.talk_time * TALK_RATE) as u32 % 2) as u8 + 1;
        } else if self.random_mouth {
            self.mouth_timer -= dt;
            if self.mouth_timer <= 0.0 {
                self.mouth_shape = (self.next() % MOUTH_SHAPES as u64) as u8;
                self.mouth_timer = 2.0 + self.next_unit() * 3.0;
            }
        } else {
            self.mouth_shape = 0;
        }

        if self.random_look {
            self.look_timer -= dt;
            if self.look_timer <= 0.0 {
                let x = (self.next() % 3) as f32 - 1.0;
                let y = (self.next() % 3) as f32 - 1.0;
                self.look = Vec2::new(x, y) * 0.5;
                self.look_timer = 1.0 + self.next_unit() * 2.0;
            }
        } else {
            self.look = Vec2::ZERO;
        }
    }

    pub fn is_winking(&self) -> bool {
        self.winking
    }

    /// 0 closed, 1 half open, 2 open.
    pub fn mouth_shape(&self) -> u8 {
        self.mouth_shape
    }

    /// Eye offset in voxels.
    pub fn look(&self) -> Vec2 {
        self.look
    }

    fn next(&mut self) -> u64 {
        self.rng = splitmix64(self.rng);
        self.rng
    }

    fn next_unit(&mut self) -> f32 {
        (self.next() >> 40) as f32 / (1u64 << 24) as f32
    }
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
