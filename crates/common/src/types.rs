use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Linear RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Multiply the RGB channels by `factor`, leaving alpha untouched.
    pub fn scaled(self, factor: f32) -> Self {
        Self::rgba(
            (self.r * factor).clamp(0.0, 1.0),
            (self.g * factor).clamp(0.0, 1.0),
            (self.b * factor).clamp(0.0, 1.0),
            self.a,
        )
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Colour> for Vec4 {
    fn from(c: Colour) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_opaque_white() {
        let c = Colour::default();
        assert_eq!(c, Colour::WHITE);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn scaled_keeps_alpha_and_clamps() {
        let c = Colour::rgba(0.8, 0.5, 0.1, 0.5).scaled(2.0);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 1.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn converts_to_vec4() {
        let v: Vec4 = Colour::YELLOW.into();
        assert_eq!(v, Vec4::new(1.0, 1.0, 0.0, 1.0));
    }
}
