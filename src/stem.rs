use std::sync::OnceLock;

use glam::Vec3;

use crate::canvas::Canvas;
use crate::color::Hsb;
use crate::config::LeafParams;
use crate::math::{cos_deg, map_range, sin_deg};
use crate::rng::Rng;

pub const SEGMENTS: usize = 10;
pub const SEGMENT_HEIGHT: f32 = 45.0;
pub const LAYOUT_LEN: usize = 10;
pub const LAYOUT_SEED: u64 = 42;

const LEAF_STATIONS: usize = 10;

/// Fixed placement of one leaf slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafSlot {
    /// Designated stem segment. May lie past the end of the stem, in which
    /// case the leaf is drawn at its fallback segment.
    pub segment: usize,
    /// Rotation about the stem axis, degrees.
    pub azimuth: f32,
    /// +1 or -1: which way the blade extends and tilts.
    pub side: f32,
    /// Tilt away from horizontal, degrees.
    pub tilt: f32,
}

/// Pseudo-random but reproducible leaf table. Built once, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafLayout {
    slots: [LeafSlot; LAYOUT_LEN],
}

impl LeafLayout {
    /// Slots climb two segments at a time and fan out 36° apart, alternating
    /// sides; the seed only jitters azimuth (±6°) and tilt (±2°).
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        Self::build(|spread| rng.range_f32(-spread, spread))
    }

    /// The same table with no jitter: azimuth `36·i`, tilt `20 + 2·i`.
    pub fn without_jitter() -> Self {
        Self::build(|_| 0.0)
    }

    fn build(mut jitter: impl FnMut(f32) -> f32) -> Self {
        let slots = std::array::from_fn(|i| LeafSlot {
            segment: i * 2,
            azimuth: i as f32 * 36.0 + jitter(6.0),
            side: if i % 2 == 0 { 1.0 } else { -1.0 },
            tilt: 20.0 + i as f32 * 2.0 + jitter(2.0),
        });
        Self { slots }
    }

    /// Process-wide layout built from `LAYOUT_SEED` on first use.
    pub fn standard() -> &'static LeafLayout {
        static LAYOUT: OnceLock<LeafLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| LeafLayout::from_seed(LAYOUT_SEED))
    }

    pub fn slots(&self) -> &[LeafSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Where a leaf actually ended up on a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafPlacement {
    pub leaf: usize,
    pub segment: usize,
    pub fallback: bool,
}

/// Segment used when a leaf's designated segment is not on the stem.
#[inline]
pub fn fallback_segment(leaf: usize) -> usize {
    5 + leaf % 3
}

/// Sideways sway of segment `i`, so the stem is not perfectly straight.
pub fn segment_offset(i: usize) -> Vec3 {
    let n = SEGMENTS as f32;
    let fi = i as f32;
    Vec3::new(
        sin_deg(fi * (20.0 / n)) * 15.0,
        fi * SEGMENT_HEIGHT,
        cos_deg(fi * (15.0 / n)) * 10.0,
    )
}

/// Narrow under the flower head (i = 0), wide toward the base.
pub fn segment_radius(i: usize) -> f32 {
    map_range(i as f32, 0.0, SEGMENTS as f32, 6.0, 18.0)
}

/// Draw the stem and `leaves.leaf_count` leaves (capped at the layout length).
/// Every requested leaf is drawn exactly once; the return value lists them in
/// drawing order.
pub fn draw_stem<C: Canvas + ?Sized>(
    leaves: &LeafParams,
    layout: &LeafLayout,
    canvas: &mut C,
) -> Vec<LeafPlacement> {
    let count = leaves.leaf_count.min(layout.len());
    if leaves.leaf_count > count {
        tracing::debug!(requested = leaves.leaf_count, drawn = count, "leaf count capped");
    }

    let mut placed = [false; LAYOUT_LEN];
    let mut placements = Vec::with_capacity(count);

    canvas.push();
    for i in 0..SEGMENTS {
        canvas.push();
        canvas.translate(segment_offset(i));
        canvas.set_fill(Hsb::new(
            120.0,
            100.0,
            map_range(i as f32, 0.0, SEGMENTS as f32, 40.0, 50.0),
        ));
        canvas.draw_cylinder(segment_radius(i), SEGMENT_HEIGHT);

        for (j, slot) in layout.slots().iter().enumerate().take(count) {
            if slot.segment == i {
                draw_leaf(canvas, slot, leaves);
                placed[j] = true;
                placements.push(LeafPlacement {
                    leaf: j,
                    segment: i,
                    fallback: false,
                });
            }
        }
        canvas.pop();
    }

    for (j, slot) in layout.slots().iter().enumerate().take(count) {
        if placed[j] {
            continue;
        }
        let segment = fallback_segment(j);
        canvas.push();
        canvas.translate(segment_offset(segment));
        draw_leaf(canvas, slot, leaves);
        canvas.pop();
        placements.push(LeafPlacement {
            leaf: j,
            segment,
            fallback: true,
        });
    }
    canvas.pop();

    placements
}

/// Tapered blade as a triangle strip: 11 stations along the blade, each with
/// an upper and a lower edge vertex. The outer 30% droops by up to 20% of
/// the blade length.
pub fn draw_leaf<C: Canvas + ?Sized>(canvas: &mut C, slot: &LeafSlot, leaves: &LeafParams) {
    canvas.push();
    canvas.rotate_y(slot.azimuth);
    canvas.rotate_z(slot.tilt * slot.side);

    let length = SEGMENT_HEIGHT * 1.7 * leaves.leaf_height;
    let width = SEGMENT_HEIGHT * 0.6 * leaves.leaf_width;

    let mut strip: Vec<(Vec3, Hsb)> = Vec::with_capacity((LEAF_STATIONS + 1) * 2);
    for i in 0..=LEAF_STATIONS {
        let t = i as f32 / LEAF_STATIONS as f32;
        let droop = if t > 0.7 {
            map_range(t, 0.7, 1.0, 0.0, length * 0.2)
        } else {
            0.0
        };
        let x = slot.side * length * t;
        let y = -droop;
        let z = width * sin_deg(t * 180.0);

        let sat = map_range(t, 0.0, 1.0, 200.0, 240.0);
        let bri = map_range(t, 0.0, 1.0, 50.0, 30.0);
        strip.push((Vec3::new(x, y, z), Hsb::new(120.0, sat, bri).normalized()));
        strip.push((Vec3::new(x, y + 1.0, -z), Hsb::new(120.0, sat, bri - 5.0).normalized()));
    }

    for tri in strip.windows(3) {
        canvas.set_fill(tri[2].1);
        canvas.draw_triangle([tri[0].0, tri[1].0, tri[2].0]);
    }
    canvas.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Recorder;

    fn leaves(n: usize) -> LeafParams {
        LeafParams {
            leaf_count: n,
            ..LeafParams::default()
        }
    }

    #[test]
    fn layout_is_reproducible() {
        assert_eq!(LeafLayout::from_seed(LAYOUT_SEED), LeafLayout::from_seed(LAYOUT_SEED));
        assert_eq!(LeafLayout::standard(), &LeafLayout::from_seed(LAYOUT_SEED));
        assert_ne!(LeafLayout::from_seed(1), LeafLayout::from_seed(2));
    }

    #[test]
    fn layout_shape() {
        let layout = LeafLayout::standard();
        assert_eq!(layout.len(), LAYOUT_LEN);
        for (i, s) in layout.slots().iter().enumerate() {
            assert_eq!(s.segment, i * 2);
            assert_eq!(s.side, if i % 2 == 0 { 1.0 } else { -1.0 });
            assert!((s.azimuth - i as f32 * 36.0).abs() <= 6.0);
            assert!((s.tilt - (20.0 + 2.0 * i as f32)).abs() <= 2.0);
        }
    }

    #[test]
    fn unjittered_layout_is_exact() {
        let exact = LeafLayout::without_jitter();
        for (i, s) in exact.slots().iter().enumerate() {
            assert_eq!(s.segment, i * 2);
            assert_eq!(s.azimuth, i as f32 * 36.0);
            assert_eq!(s.tilt, 20.0 + 2.0 * i as f32);
        }
        let seeded = LeafLayout::standard();
        for (a, b) in exact.slots().iter().zip(seeded.slots()) {
            assert_eq!((a.segment, a.side), (b.segment, b.side));
        }
    }

    #[test]
    fn draws_ten_tapered_segments() {
        let mut rec = Recorder::new();
        draw_stem(&leaves(0), LeafLayout::standard(), &mut rec);
        let cyl: Vec<_> = rec.cylinders().collect();
        assert_eq!(cyl.len(), SEGMENTS);
        assert!(cyl.windows(2).all(|w| w[0].1 < w[1].1));
        assert_eq!(cyl[0].0, segment_offset(0));
        assert_eq!(rec.triangle_count(), 0);
        assert_eq!(rec.stack_depth(), 0);
    }

    #[test]
    fn every_requested_leaf_drawn_once() {
        let per_leaf = 2 * LEAF_STATIONS;
        for n in 0..=LAYOUT_LEN {
            let mut rec = Recorder::new();
            let placements = draw_stem(&leaves(n), LeafLayout::standard(), &mut rec);
            assert_eq!(placements.len(), n);
            let mut ids: Vec<usize> = placements.iter().map(|p| p.leaf).collect();
            ids.sort_unstable();
            assert_eq!(ids, (0..n).collect::<Vec<_>>());
            assert_eq!(rec.triangle_count(), n * per_leaf);
        }
    }

    #[test]
    fn overflow_leaves_use_fallback_segments() {
        let placements = draw_stem(&leaves(LAYOUT_LEN), LeafLayout::standard(), &mut Recorder::new());
        for p in placements {
            if p.leaf < 5 {
                assert!(!p.fallback);
                assert_eq!(p.segment, p.leaf * 2);
            } else {
                assert!(p.fallback);
                assert_eq!(p.segment, 5 + p.leaf % 3);
            }
        }
    }

    #[test]
    fn leaf_count_is_capped_by_layout() {
        let placements = draw_stem(&leaves(25), LeafLayout::standard(), &mut Recorder::new());
        assert_eq!(placements.len(), LAYOUT_LEN);
    }

    #[test]
    fn leaf_blade_spans_configured_length() {
        let slot = LeafSlot {
            segment: 0,
            azimuth: 0.0,
            side: 1.0,
            tilt: 0.0,
        };
        let params = LeafParams {
            leaf_count: 1,
            leaf_height: 1.0,
            leaf_width: 1.0,
        };
        let mut rec = Recorder::new();
        draw_leaf(&mut rec, &slot, &params);
        let max_x = rec
            .commands
            .iter()
            .filter_map(|c| match c {
                crate::canvas::DrawCommand::Triangle { points, .. } => {
                    Some(points.iter().map(|p| p.x).fold(f32::MIN, f32::max))
                }
                _ => None,
            })
            .fold(f32::MIN, f32::max);
        assert!((max_x - SEGMENT_HEIGHT * 1.7).abs() < 1e-3);
    }
}
