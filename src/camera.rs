use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;

pub const PITCH_LIMIT: f32 = 90.0;
pub const DRAG_DEGREES_PER_PIXEL: f32 = 0.5;
pub const AUTO_YAW_STEP: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraMode {
    #[default]
    Manual,
    AutoRotate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    last_x: f32,
    last_y: f32,
}

/// Orbit camera. Pointer events mutate it between frames; the frame loop
/// calls `apply` before drawing and `tick` after.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    /// Rotation about X in degrees, always within ±PITCH_LIMIT.
    pitch: f32,
    /// Rotation about Y in degrees.
    yaw: f32,
    pub distance: f32,
    mode: CameraMode,
    drag: Option<Drag>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            pitch: -30.0,
            yaw: 0.0,
            distance: 800.0,
            mode: CameraMode::Manual,
            drag: None,
        }
    }
}

impl CameraState {
    pub fn with_angles(pitch: f32, yaw: f32) -> Self {
        let mut cam = Self::default();
        cam.set_angles(pitch, yaw);
        cam
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_angles(&mut self, pitch: f32, yaw: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = yaw;
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    pub fn toggle_auto_rotate(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::Manual => CameraMode::AutoRotate,
            CameraMode::AutoRotate => CameraMode::Manual,
        };
        self.mode
    }

    pub fn pointer_pressed(&mut self, x: f32, y: f32) {
        self.drag = Some(Drag { last_x: x, last_y: y });
    }

    pub fn pointer_released(&mut self) {
        self.drag = None;
    }

    /// Integrate a pointer move. Ignored unless dragging in manual mode.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.mode != CameraMode::Manual {
            return;
        }
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = x - drag.last_x;
        let dy = y - drag.last_y;
        drag.last_x = x;
        drag.last_y = y;

        self.yaw += dx * DRAG_DEGREES_PER_PIXEL;
        self.pitch = (self.pitch - dy * DRAG_DEGREES_PER_PIXEL).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Per-frame state transition: auto-rotate advances yaw.
    pub fn tick(&mut self) {
        if self.mode == CameraMode::AutoRotate {
            self.yaw = (self.yaw + AUTO_YAW_STEP).rem_euclid(360.0);
        }
    }

    /// View transform, applied before any geometry.
    pub fn apply<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.rotate_x(self.pitch);
        canvas.rotate_y(self.yaw);
    }
}
