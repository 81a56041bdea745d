use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::canvas::{Canvas, TransformStack};
use crate::color::Hsb;
use crate::grid::Grid;
use crate::math::{cos_deg, sin_deg};

const SKY_TOP: Hsb = Hsb::new(200.0, 70.0, 60.0);
const SKY_BOTTOM: Hsb = Hsb::new(240.0, 40.0, 20.0);

/// Largest image side the binaries accept.
pub const MAX_SIDE: u32 = 4096;

const FOV_Y_DEG: f32 = 60.0;
const NEAR: f32 = 1.0;
const CYLINDER_SIDES: usize = 24;

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Vertical background gradient, one RGBA row per image row. Empty when
/// either side is zero.
pub fn render_background(w: usize, h: usize) -> Vec<u8> {
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let top = SKY_TOP.to_rgba();
    let bottom = SKY_BOTTOM.to_rgba();
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let t = if h > 1 { y as f32 / (h - 1) as f32 } else { 0.0 };
        let color = lerp_color(top, bottom, t);
        for px in row.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    });

    rgba
}

/// Software z-buffered rasterizer with flat fills.
///
/// The eye sits at `distance` on +z looking at the origin; screen y grows
/// downward like world y.
pub struct Rasterizer {
    w: usize,
    h: usize,
    rgba: Vec<u8>,
    /// Inverse view depth per pixel, 0 where nothing has been drawn.
    inv_depth: Grid<f32>,
    transform: TransformStack,
    fill: [u8; 4],
    distance: f32,
    focal: f32,
}

impl Rasterizer {
    pub fn new(w: usize, h: usize, distance: f32) -> Self {
        let focal = (h as f32 * 0.5) / (FOV_Y_DEG * 0.5).to_radians().tan();
        Self {
            w,
            h,
            rgba: render_background(w, h),
            inv_depth: Grid::new(w, h),
            transform: TransformStack::default(),
            fill: [255, 255, 255, 255],
            distance,
            focal,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.w + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Number of pixels covered by geometry.
    pub fn covered_pixels(&self) -> usize {
        self.inv_depth.data.iter().filter(|&&d| d > 0.0).count()
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Local point to (screen x, screen y, 1/depth). None behind the near plane.
    fn project(&self, p: Vec3) -> Option<Vec3> {
        let world = self.transform.apply(p);
        let depth = self.distance - world.z;
        if depth < NEAR {
            return None;
        }
        let s = self.focal / depth;
        Some(Vec3::new(
            self.w as f32 * 0.5 + world.x * s,
            self.h as f32 * 0.5 + world.y * s,
            1.0 / depth,
        ))
    }

    fn fill_triangle(&mut self, p: [Vec3; 3]) {
        if self.rgba.is_empty() {
            return;
        }
        let [a, b, c] = p;
        let area = edge(a.truncate(), b.truncate(), c.truncate());
        if area.abs() < 1e-6 {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.w as f32 - 1.0);
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.h as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let q = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.truncate(), c.truncate(), q) / area;
                let w1 = edge(c.truncate(), a.truncate(), q) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let inv_z = w0 * a.z + w1 * b.z + w2 * c.z;
                let i = self.inv_depth.idx(x, y);
                if inv_z > self.inv_depth.data[i] {
                    self.inv_depth.data[i] = inv_z;
                    self.rgba[i * 4..i * 4 + 4].copy_from_slice(&self.fill);
                }
            }
        }
    }

    fn raster(&mut self, p: [Vec3; 3]) {
        let [Some(a), Some(b), Some(c)] = p.map(|v| self.project(v)) else {
            return;
        };
        self.fill_triangle([a, b, c]);
    }
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl Canvas for Rasterizer {
    fn set_fill(&mut self, color: Hsb) {
        self.fill = color.to_rgba();
    }

    fn draw_quad(&mut self, p: [Vec3; 4]) {
        self.raster([p[0], p[1], p[2]]);
        self.raster([p[0], p[2], p[3]]);
    }

    fn draw_triangle(&mut self, p: [Vec3; 3]) {
        self.raster(p);
    }

    fn draw_cylinder(&mut self, radius: f32, height: f32) {
        let half = height * 0.5;
        let rim = |k: usize| {
            let a = k as f32 * 360.0 / CYLINDER_SIDES as f32;
            (radius * cos_deg(a), radius * sin_deg(a))
        };
        let top = Vec3::new(0.0, -half, 0.0);
        let bottom = Vec3::new(0.0, half, 0.0);
        for k in 0..CYLINDER_SIDES {
            let (x0, z0) = rim(k);
            let (x1, z1) = rim(k + 1);
            let t0 = Vec3::new(x0, -half, z0);
            let t1 = Vec3::new(x1, -half, z1);
            let b0 = Vec3::new(x0, half, z0);
            let b1 = Vec3::new(x1, half, z1);
            self.draw_quad([t0, b0, b1, t1]);
            self.raster([top, t0, t1]);
            self.raster([bottom, b1, b0]);
        }
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
