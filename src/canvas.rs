use glam::{Mat4, Vec3};

use crate::color::Hsb;

/// Drawing capability the flower is rendered through. Angles are degrees,
/// colors HSB, and positions are in the current transform's local space.
/// Screen convention: +y points down.
pub trait Canvas {
    fn set_fill(&mut self, color: Hsb);

    /// Closed quad through four corners, in order.
    fn draw_quad(&mut self, p: [Vec3; 4]);

    fn draw_triangle(&mut self, p: [Vec3; 3]);

    /// Cylinder centered on the local origin, axis along y.
    fn draw_cylinder(&mut self, radius: f32, height: f32);

    fn push(&mut self);
    fn pop(&mut self);
    fn translate(&mut self, v: Vec3);
    fn rotate_x(&mut self, deg: f32);
    fn rotate_y(&mut self, deg: f32);
    fn rotate_z(&mut self, deg: f32);
}

/// Model transform stack shared by the canvases in this crate.
#[derive(Clone, Debug)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn current(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced pops reset to identity rather than panicking.
    pub fn pop(&mut self) {
        self.current = self.saved.pop().unwrap_or(Mat4::IDENTITY);
    }

    pub fn translate(&mut self, v: Vec3) {
        self.current *= Mat4::from_translation(v);
    }

    pub fn rotate_x(&mut self, deg: f32) {
        self.current *= Mat4::from_rotation_x(deg.to_radians());
    }

    pub fn rotate_y(&mut self, deg: f32) {
        self.current *= Mat4::from_rotation_y(deg.to_radians());
    }

    pub fn rotate_z(&mut self, deg: f32) {
        self.current *= Mat4::from_rotation_z(deg.to_radians());
    }

    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.current.transform_point3(p)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Quad { points: [Vec3; 4], fill: Hsb },
    Triangle { points: [Vec3; 3], fill: Hsb },
    Cylinder { center: Vec3, radius: f32, height: f32, fill: Hsb },
}

/// Canvas that records world-space draw commands instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub commands: Vec<DrawCommand>,
    transform: TransformStack,
    fill: Hsb,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quad_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Quad { .. }))
            .count()
    }

    pub fn triangle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Triangle { .. }))
            .count()
    }

    pub fn cylinders(&self) -> impl Iterator<Item = (Vec3, f32, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Cylinder {
                center,
                radius,
                height,
                ..
            } => Some((*center, *radius, *height)),
            _ => None,
        })
    }

    pub fn stack_depth(&self) -> usize {
        self.transform.depth()
    }
}

impl Canvas for Recorder {
    fn set_fill(&mut self, color: Hsb) {
        self.fill = color;
    }

    fn draw_quad(&mut self, p: [Vec3; 4]) {
        let points = p.map(|v| self.transform.apply(v));
        self.commands.push(DrawCommand::Quad {
            points,
            fill: self.fill,
        });
    }

    fn draw_triangle(&mut self, p: [Vec3; 3]) {
        let points = p.map(|v| self.transform.apply(v));
        self.commands.push(DrawCommand::Triangle {
            points,
            fill: self.fill,
        });
    }

    fn draw_cylinder(&mut self, radius: f32, height: f32) {
        self.commands.push(DrawCommand::Cylinder {
            center: self.transform.apply(Vec3::ZERO),
            radius,
            height,
            fill: self.fill,
        });
    }

    fn push(&mut self) {
        self.transform.push();
    }

    fn pop(&mut self) {
        self.transform.pop();
    }

    fn translate(&mut self, v: Vec3) {
        self.transform.translate(v);
    }

    fn rotate_x(&mut self, deg: f32) {
        self.transform.rotate_x(deg);
    }

    fn rotate_y(&mut self, deg: f32) {
        self.transform.rotate_y(deg);
    }

    fn rotate_z(&mut self, deg: f32) {
        self.transform.rotate_z(deg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_restores() {
        let mut t = TransformStack::default();
        t.translate(Vec3::new(1.0, 2.0, 3.0));
        t.push();
        t.rotate_y(90.0);
        t.translate(Vec3::X);
        t.pop();
        assert_eq!(t.apply(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn rotations_compose_in_local_space() {
        let mut t = TransformStack::default();
        t.rotate_y(90.0);
        let p = t.apply(Vec3::Z);
        assert!((p - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn recorder_transforms_to_world() {
        let mut rec = Recorder::new();
        rec.translate(Vec3::new(0.0, 10.0, 0.0));
        rec.set_fill(Hsb::new(120.0, 100.0, 50.0));
        rec.draw_cylinder(4.0, 45.0);
        rec.draw_triangle([Vec3::ZERO, Vec3::X, Vec3::Y]);
        let (c, r, h) = rec.cylinders().next().unwrap();
        assert_eq!(c, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!((r, h), (4.0, 45.0));
        assert_eq!(rec.triangle_count(), 1);
        assert_eq!(rec.quad_count(), 0);
    }
}
