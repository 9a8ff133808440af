use crate::renderer::RenderError;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
struct MatrixState {
    projection: Mat4,
    view: Mat4,
    world: Mat4,
}

impl Default for MatrixState {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
        }
    }
}

/// CPU-side projection/view/world matrix stack shared by the backends.
#[derive(Debug, Clone, Default)]
pub struct MatrixStack {
    current: MatrixState,
    saved: Vec<MatrixState>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to identity matrices with an empty stack.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    pub fn pop(&mut self) -> Result<(), RenderError> {
        self.current = self.saved.pop().ok_or(RenderError::MatrixUnderflow)?;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn multiply(&mut self, matrix: Mat4) {
        self.current.world *= matrix;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.current.projection = projection;
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.current.view = Mat4::look_at_rh(eye, target, up);
    }

    pub fn world(&self) -> Mat4 {
        self.current.world
    }

    pub fn view_projection(&self) -> Mat4 {
        self.current.projection * self.current.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_restores_all_matrices() {
        let mut s = MatrixStack::new();
        s.push();
        s.multiply(Mat4::from_translation(Vec3::X));
        s.set_projection(Mat4::from_scale(Vec3::splat(2.0)));
        s.look_at(Vec3::Z, Vec3::ZERO, Vec3::Y);
        assert_ne!(s.world(), Mat4::IDENTITY);
        s.pop().unwrap();
        assert_eq!(s.world(), Mat4::IDENTITY);
        assert_eq!(s.view_projection(), Mat4::IDENTITY);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn multiply_composes_in_order() {
        let mut s = MatrixStack::new();
        s.multiply(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        s.multiply(Mat4::from_scale(Vec3::splat(2.0)));
        let p = s.world().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn pop_on_empty_stack_fails() {
        let mut s = MatrixStack::new();
        assert!(matches!(s.pop(), Err(RenderError::MatrixUnderflow)));
    }
}
