use glam::Vec3;

use crate::canvas::Canvas;
use crate::color::{ColorScheme, petal_color};
use crate::grid::Grid;
use crate::petal::Resolution;

/// Draw the petal surface as one quad per grid cell, colored by `scheme`.
/// Corner order is (r,θ), (r+1,θ), (r+1,θ+1), (r,θ+1). Returns the quad count.
pub fn draw_petals<C: Canvas + ?Sized>(
    grid: &Grid<Vec3>,
    res: Resolution,
    scheme: ColorScheme,
    canvas: &mut C,
) -> usize {
    let mut quads = 0;
    for r in 0..grid.h.saturating_sub(1) {
        let rho = res.rho(r);
        let inner = grid.row(r);
        let outer = grid.row(r + 1);
        for theta in 0..grid.w.saturating_sub(1) {
            canvas.set_fill(petal_color(scheme, r, rho, res.angle(theta)));
            canvas.draw_quad([inner[theta], outer[theta], outer[theta + 1], inner[theta + 1]]);
            quads += 1;
        }
    }
    quads
}
