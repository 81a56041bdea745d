pub mod camera;
pub mod canvas;
pub mod color;
pub mod config;
pub mod grid;
pub mod math;
pub mod mesh;
pub mod petal;
pub mod presets;
pub mod render;
pub mod rng;
pub mod stem;

use std::time::Instant;

use glam::Vec3;

use camera::CameraState;
use canvas::Canvas;
use config::FlowerConfig;
use grid::Grid;
use petal::Resolution;
use render::Rasterizer;
use stem::{LeafLayout, LeafPlacement};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// What one frame drew.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub quads: usize,
    pub leaves: Vec<LeafPlacement>,
}

/// Long-lived render state: the fixed leaf layout, the camera, and a vertex
/// buffer that is overwritten every frame.
pub struct FlowerScene {
    pub camera: CameraState,
    resolution: Resolution,
    layout: LeafLayout,
    vertices: Grid<Vec3>,
}

impl Default for FlowerScene {
    fn default() -> Self {
        Self::new(Resolution::default(), stem::LAYOUT_SEED)
    }
}

impl FlowerScene {
    pub fn new(resolution: Resolution, layout_seed: u64) -> Self {
        let (w, h) = resolution.grid_dims();
        Self {
            camera: CameraState::default(),
            resolution,
            layout: LeafLayout::from_seed(layout_seed),
            vertices: Grid::new(w, h),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn layout(&self) -> &LeafLayout {
        &self.layout
    }

    /// Last generated petal grid.
    pub fn vertices(&self) -> &Grid<Vec3> {
        &self.vertices
    }

    /// Draw one frame of `config` onto `canvas`: camera transform, petals,
    /// stem and leaves, then advance the camera.
    pub fn render_frame<C: Canvas + ?Sized>(
        &mut self,
        config: &FlowerConfig,
        canvas: &mut C,
    ) -> (FrameStats, Vec<Timing>) {
        let mut timings = Vec::new();
        let total_start = Instant::now();

        canvas.push();
        self.camera.apply(canvas);

        // 1. Petal surface
        let t = Instant::now();
        petal::generate_petals_into(&mut self.vertices, &config.shape, self.resolution);
        timings.push(Timing {
            name: "petal_grid",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        // 2. Petal mesh
        let t = Instant::now();
        let quads = mesh::draw_petals(&self.vertices, self.resolution, config.color, canvas);
        timings.push(Timing {
            name: "petal_mesh",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        // 3. Stem and leaves
        let t = Instant::now();
        let leaves = stem::draw_stem(&config.leaves, &self.layout, canvas);
        timings.push(Timing {
            name: "stem",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        canvas.pop();
        self.camera.tick();

        let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        timings.push(Timing {
            name: "TOTAL",
            ms: total_ms,
        });
        for t in &timings {
            tracing::debug!(stage = t.name, ms = t.ms, "frame stage");
        }

        (FrameStats { quads, leaves }, timings)
    }

    /// Render a frame to an RGBA8 image of `w` × `h` pixels.
    pub fn render_image(
        &mut self,
        config: &FlowerConfig,
        w: usize,
        h: usize,
    ) -> (Vec<u8>, FrameStats, Vec<Timing>) {
        let t = Instant::now();
        let mut raster = Rasterizer::new(w, h, self.camera.distance);
        let (stats, mut timings) = self.render_frame(config, &mut raster);
        let rgba = raster.into_rgba();
        timings.push(Timing {
            name: "raster_total",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
        (rgba, stats, timings)
    }
}
