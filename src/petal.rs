use glam::Vec3;
use rayon::prelude::*;

use crate::config::ShapeParams;
use crate::grid::Grid;
use crate::math::{cos_deg, sin_deg};

/// Grid resolution of the petal surface. Constant across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Radial steps R; the grid has R + 1 rings.
    pub radial: usize,
    /// Angular steps Θ; each ring has Θ + 1 samples.
    pub angular: usize,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            radial: 30,
            angular: 600,
        }
    }
}

impl Resolution {
    /// Degrees between angular samples. The full sweep covers 15 half turns
    /// (7.5 rotations) regardless of Θ.
    #[inline]
    pub fn angular_delta(&self) -> f32 {
        180.0 * 15.0 / self.angular as f32
    }

    /// Normalized radius ρ = r / R.
    #[inline]
    pub fn rho(&self, r: usize) -> f32 {
        r as f32 / self.radial as f32
    }

    /// Swept angle a = θ · angular_delta in degrees.
    #[inline]
    pub fn angle(&self, theta: usize) -> f32 {
        theta as f32 * self.angular_delta()
    }

    pub fn grid_dims(&self) -> (usize, usize) {
        (self.angular + 1, self.radial + 1)
    }
}

/// Spiral decay angle φ: starts at 180/openingAngle at the center of the
/// sweep and decays exponentially with the swept angle.
#[inline]
pub fn decay_angle(shape: &ShapeParams, angle: f32) -> f32 {
    (180.0 / shape.opening_angle) * (-angle / (shape.vertical_density * 180.0)).exp()
}

/// Periodic petal envelope, 1 at the lobe center and pinched toward 0.5
/// between lobes. Period is 360 / petalAlignment degrees of sweep.
#[inline]
pub fn petal_cut(shape: &ShapeParams, angle: f32) -> f32 {
    let m = (shape.petal_alignment * angle).rem_euclid(360.0) / 180.0;
    let inner = 1.25 * (1.0 - m).powi(2) - 0.25;
    1.0 - 0.5 * inner.powi(2)
}

/// Droop/curl offset. Zero at ρ = 0 and at ρ = 1/outerCurve.
#[inline]
pub fn hang_down(shape: &ShapeParams, rho: f32, phi: f32) -> f32 {
    shape.inner_curve * rho.powi(2) * (shape.outer_curve * rho - 1.0).powi(2) * sin_deg(phi)
}

/// One surface point for normalized radius `rho` and swept angle `angle`.
#[inline]
pub fn petal_point(shape: &ShapeParams, rho: f32, angle: f32) -> Vec3 {
    let phi = decay_angle(shape, angle);
    let cut = petal_cut(shape, angle);
    let hang = hang_down(shape, rho, phi);
    let (sin_phi, cos_phi) = (sin_deg(phi), cos_deg(phi));

    let radial = shape.petal_size * cut * (rho * sin_phi + hang * cos_phi);
    Vec3::new(
        radial * sin_deg(angle),
        -shape.petal_size * cut * (rho * cos_phi - hang * sin_phi),
        radial * cos_deg(angle),
    )
}

/// Build the (R+1) × (Θ+1) vertex grid for `shape`.
pub fn generate_petals(shape: &ShapeParams, res: Resolution) -> Grid<Vec3> {
    let (w, h) = res.grid_dims();
    let mut grid = Grid::new(w, h);
    generate_petals_into(&mut grid, shape, res);
    grid
}

/// Same as `generate_petals` but overwrites a caller-owned buffer, so a frame
/// loop can keep one allocation alive.
///
/// Rings are filled in parallel; each point depends only on its own (r, θ),
/// so the output is identical to a serial fill.
pub fn generate_petals_into(grid: &mut Grid<Vec3>, shape: &ShapeParams, res: Resolution) {
    let (w, h) = res.grid_dims();
    grid.reshape(w, h);

    grid.data.par_chunks_mut(w).enumerate().for_each(|(r, ring)| {
        let rho = res.rho(r);
        for (theta, p) in ring.iter_mut().enumerate() {
            *p = petal_point(shape, rho, res.angle(theta));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rose() -> ShapeParams {
        ShapeParams::default()
    }

    #[test]
    fn default_resolution_delta() {
        let res = Resolution::default();
        assert!((res.angular_delta() - 4.5).abs() < 1e-6);
        assert_eq!(res.grid_dims(), (601, 31));
    }

    #[test]
    fn grid_has_fixed_dimensions() {
        let res = Resolution::default();
        let grid = generate_petals(&rose(), res);
        assert_eq!(grid.w, 601);
        assert_eq!(grid.h, 31);
        assert_eq!(grid.data.len(), 601 * 31);
    }

    #[test]
    fn center_ring_collapses_to_origin() {
        let grid = generate_petals(&rose(), Resolution::default());
        for &p in grid.row(0) {
            assert_eq!(p.x, 0.0);
            assert_eq!(p.z, 0.0);
            assert!(p.y.abs() < 1e-6);
        }
    }

    #[test]
    fn petal_cut_is_one_at_lobe_center() {
        assert_eq!(petal_cut(&rose(), 0.0), 1.0);
    }

    #[test]
    fn petal_cut_periodic() {
        let shape = rose();
        let period = 360.0 / shape.petal_alignment;
        for i in 0..40 {
            let a = i as f32 * 7.3;
            let d = (petal_cut(&shape, a) - petal_cut(&shape, a + period)).abs();
            assert!(d < 1e-3, "a={a} diff={d}");
        }
    }

    #[test]
    fn petal_cut_bounded() {
        let shape = rose();
        for i in 0..2000 {
            let c = petal_cut(&shape, i as f32 * 0.37);
            assert!((0.49..=1.0).contains(&c), "cut {c}");
        }
    }

    #[test]
    fn hang_down_vanishes_at_roots() {
        for (ic, oc) in [(2.0, 1.3), (-6.0, 0.5), (5.5, 0.7)] {
            let shape = ShapeParams {
                inner_curve: ic,
                outer_curve: oc,
                ..rose()
            };
            assert_eq!(hang_down(&shape, 0.0, 37.0), 0.0);
            assert!(hang_down(&shape, 1.0 / oc, 37.0).abs() < 1e-5);
        }
    }

    #[test]
    fn reuse_buffer_matches_fresh() {
        let res = Resolution { radial: 8, angular: 40 };
        let fresh = generate_petals(&rose(), res);
        let mut buf = Grid::filled(3, 3, Vec3::ONE);
        generate_petals_into(&mut buf, &rose(), res);
        assert_eq!(buf, fresh);
    }
}
