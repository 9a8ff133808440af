use glam::{Mat4, Quat, Vec3};
use voxview_common::CameraConfig;
use voxview_render::RenderContext;

/// Free-flying camera described by an explicit orthonormal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub facing: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    pub fn new(position: Vec3, facing: Vec3, up: Vec3, right: Vec3) -> Self {
        Self {
            position,
            facing,
            up,
            right,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position, config.facing, config.up, config.right)
    }

    /// Move along the facing vector.
    pub fn fly(&mut self, distance: f32) {
        self.position += self.facing * distance;
    }

    /// Move along the right vector. Negative distances strafe left.
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right * distance;
    }

    pub fn levitate(&mut self, distance: f32) {
        self.position += self.up * distance;
    }

    /// Turn about the world Y axis.
    pub fn rotate_y(&mut self, radians: f32) {
        let q = Quat::from_rotation_y(radians);
        self.facing = q * self.facing;
        self.up = q * self.up;
        self.right = q * self.right;
        self.orthonormalize();
    }

    /// Tilt about the camera's right vector.
    pub fn pitch(&mut self, radians: f32) {
        let q = Quat::from_axis_angle(self.right.normalize_or_zero(), radians);
        self.facing = q * self.facing;
        self.up = q * self.up;
        self.orthonormalize();
    }

    fn orthonormalize(&mut self) {
        self.facing = self.facing.normalize_or_zero();
        self.right = self.facing.cross(self.up).normalize_or_zero();
        self.up = self.right.cross(self.facing).normalize_or_zero();
    }

    pub fn target(&self) -> Vec3 {
        self.position + self.facing
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), self.up)
    }

    /// Point the render context at what this camera sees.
    pub fn look(&self, ctx: &mut dyn RenderContext) {
        ctx.set_look_at(self.position, self.target(), self.up);
    }

    /// `Pos(..), Facing(..) = len, Up(..) = len, Right(..) = len`, two decimals.
    pub fn describe(&self) -> String {
        let v = |v: Vec3| format!("{:.2}, {:.2}, {:.2}", v.x, v.y, v.z);
        format!(
            "Pos({}), Facing({}) = {:.2}, Up({}) = {:.2}, Right({}) = {:.2}",
            v(self.position),
            v(self.facing),
            self.facing.length(),
            v(self.up),
            self.up.length(),
            v(self.right),
            self.right.length(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(c: &Camera) {
        assert!((c.facing.length() - 1.0).abs() < 1e-4);
        assert!((c.up.length() - 1.0).abs() < 1e-4);
        assert!((c.right.length() - 1.0).abs() < 1e-4);
        assert!(c.facing.dot(c.up).abs() < 1e-4);
        assert!(c.facing.dot(c.right).abs() < 1e-4);
    }

    #[test]
    fn default_matches_config() {
        let c = Camera::default();
        assert_eq!(c.position, Vec3::new(0.0, 1.25, 3.0));
        assert_eq!(c.facing, Vec3::NEG_Z);
        assert_orthonormal(&c);
    }

    #[test]
    fn fly_strafe_levitate_follow_basis() {
        let mut c = Camera::default();
        c.fly(2.0);
        assert!((c.position - Vec3::new(0.0, 1.25, 1.0)).length() < 1e-6);
        c.strafe(-1.0);
        assert!((c.position.x + 1.0).abs() < 1e-6);
        c.levitate(0.75);
        assert!((c.position.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotations_keep_basis_orthonormal() {
        let mut c = Camera::default();
        c.rotate_y(0.7);
        c.pitch(-0.3);
        c.rotate_y(-2.1);
        assert_orthonormal(&c);
        // right stays horizontal under yaw and pitch
        assert!(c.right.y.abs() < 1e-4);
    }

    #[test]
    fn quarter_turn_faces_negative_x() {
        let mut c = Camera::default();
        c.rotate_y(std::f32::consts::FRAC_PI_2);
        assert!((c.facing - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn describe_formats_two_decimals() {
        let c = Camera::default();
        assert_eq!(
            c.describe(),
            "Pos(0.00, 1.25, 3.00), Facing(0.00, 0.00, -1.00) = 1.00, \
             Up(0.00, 1.00, 0.00) = 1.00, Right(1.00, 0.00, 0.00) = 1.00"
        );
    }

    #[test]
    fn view_matrix_is_finite() {
        let m = Camera::default().view_matrix();
        assert!(m.is_finite());
    }
}
