use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::color::{ColorScheme, Hsb};
use crate::presets;

/// Petal surface shape. Read-only to the generator during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeParams {
    /// Larger values flatten the flower. Must be non-zero.
    pub opening_angle: f32,
    /// Larger values wind the spiral further before it decays.
    pub vertical_density: f32,
    /// Number of petal lobes per 360° of sweep.
    pub petal_alignment: f32,
    pub inner_curve: f32,
    pub outer_curve: f32,
    pub petal_size: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            opening_angle: 2.0,
            vertical_density: 8.0,
            petal_alignment: 3.6,
            inner_curve: 2.0,
            outer_curve: 1.3,
            petal_size: 260.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeafParams {
    pub leaf_count: usize,
    pub leaf_height: f32,
    pub leaf_width: f32,
}

impl Default for LeafParams {
    fn default() -> Self {
        Self {
            leaf_count: 3,
            leaf_height: 2.0,
            leaf_width: 2.0,
        }
    }
}

/// Everything a frame needs from the parameter source. `Copy`, so every frame
/// works on its own snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowerConfig {
    pub shape: ShapeParams,
    pub leaves: LeafParams,
    pub color: ColorScheme,
}

// Slider ranges of the control panel. The core never checks these; parameter
// sources call `FlowerConfig::clamped` before handing a config over.
pub const OPENING_ANGLE: RangeInclusive<f32> = 1.0..=10.0;
pub const VERTICAL_DENSITY: RangeInclusive<f32> = 1.0..=20.0;
pub const PETAL_ALIGNMENT: RangeInclusive<f32> = 0.0..=6.0;
pub const INNER_CURVE: RangeInclusive<f32> = -6.0..=6.0;
pub const OUTER_CURVE: RangeInclusive<f32> = 0.5..=1.5;
pub const PETAL_SIZE: RangeInclusive<f32> = 150.0..=400.0;
pub const LEAF_HEIGHT: RangeInclusive<f32> = 0.5..=4.0;
pub const LEAF_WIDTH: RangeInclusive<f32> = 0.5..=4.0;
pub const MAX_LEAVES: usize = crate::stem::LAYOUT_LEN;

#[inline]
fn clamp_to(v: f32, range: &RangeInclusive<f32>) -> f32 {
    v.clamp(*range.start(), *range.end())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown preset '{0}' (expected one of: rose, tulip, carnation)")]
    UnknownPreset(String),
}

impl FlowerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every field into the control panel's slider range.
    pub fn clamped(mut self) -> Self {
        let s = &mut self.shape;
        s.opening_angle = clamp_to(s.opening_angle, &OPENING_ANGLE);
        s.vertical_density = clamp_to(s.vertical_density, &VERTICAL_DENSITY);
        s.petal_alignment = clamp_to(s.petal_alignment, &PETAL_ALIGNMENT);
        s.inner_curve = clamp_to(s.inner_curve, &INNER_CURVE);
        s.outer_curve = clamp_to(s.outer_curve, &OUTER_CURVE);
        s.petal_size = clamp_to(s.petal_size, &PETAL_SIZE);

        let l = &mut self.leaves;
        l.leaf_count = l.leaf_count.min(MAX_LEAVES);
        l.leaf_height = clamp_to(l.leaf_height, &LEAF_HEIGHT);
        l.leaf_width = clamp_to(l.leaf_width, &LEAF_WIDTH);

        if let ColorScheme::Custom { h, s, b } = self.color {
            let c = Hsb::new(h, s, b).normalized();
            self.color = ColorScheme::Custom { h: c.h, s: c.s, b: c.b };
        }
        self
    }
}

/// Mutable parameter store owned by the parameter source (UI, CLI, server).
/// The renderer only ever sees `snapshot()` copies taken between frames.
#[derive(Clone, Debug)]
pub struct ParamStore {
    current: FlowerConfig,
    /// Last custom color picked, kept while another mode is active.
    custom: Hsb,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(FlowerConfig::default())
    }
}

impl ParamStore {
    pub fn new(config: FlowerConfig) -> Self {
        let custom = match config.color {
            ColorScheme::Custom { h, s, b } => Hsb::new(h, s, b),
            _ => Hsb::new(340.0, 100.0, 70.0),
        };
        Self {
            current: config,
            custom,
        }
    }

    pub fn snapshot(&self) -> FlowerConfig {
        self.current
    }

    pub fn shape_mut(&mut self) -> &mut ShapeParams {
        &mut self.current.shape
    }

    pub fn leaves_mut(&mut self) -> &mut LeafParams {
        &mut self.current.leaves
    }

    /// Select a color mode by tag; `custom` reuses the remembered custom color.
    pub fn set_color_mode(&mut self, mode: &str) {
        self.current.color = ColorScheme::from_mode_name(mode, self.custom);
    }

    /// Picking a custom color also switches to custom mode.
    pub fn set_custom_color(&mut self, color: Hsb) {
        self.custom = color;
        self.current.color = ColorScheme::Custom {
            h: color.h,
            s: color.s,
            b: color.b,
        };
    }

    pub fn apply(&mut self, config: FlowerConfig) {
        if let ColorScheme::Custom { h, s, b } = config.color {
            self.custom = Hsb::new(h, s, b);
        }
        self.current = config;
    }

    /// Overlay a partial JSON config onto the current state. Fields the patch
    /// leaves out keep their current values. A `color` object without `mode`
    /// keeps the current mode; missing `h`, `s` or `b` come from the
    /// remembered custom color.
    pub fn apply_json(&mut self, patch: &Value) -> Result<(), ConfigError> {
        let mut base = serde_json::to_value(self.current)?;
        if let (Some(obj), Some(color)) = (base.as_object_mut(), patch.get("color")) {
            if color.is_object() {
                let mut scheme = serde_json::to_value(self.custom_scheme())?;
                scheme["mode"] = self.current.color.mode_name().into();
                obj.insert("color".into(), scheme);
            }
        }
        merge_json(&mut base, patch);

        if let Some(color) = base.get_mut("color").and_then(Value::as_object_mut) {
            if color.get("mode").and_then(Value::as_str) != Some("custom") {
                for key in ["h", "s", "b"] {
                    color.remove(key);
                }
            }
        }
        let config: FlowerConfig = serde_json::from_value(base)?;
        self.apply(config);
        Ok(())
    }

    pub fn apply_json_str(&mut self, patch: &str) -> Result<(), ConfigError> {
        let patch: Value = serde_json::from_str(patch)?;
        self.apply_json(&patch)
    }

    pub fn apply_json_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path)?;
        self.apply_json_str(&text)
    }

    fn custom_scheme(&self) -> ColorScheme {
        ColorScheme::Custom {
            h: self.custom.h,
            s: self.custom.s,
            b: self.custom.b,
        }
    }

    /// Replace shape, leaves and color in one step.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let preset = presets::lookup(name)?;
        self.apply(preset.config);
        Ok(())
    }
}

/// Recursive object merge; anything that is not an object on both sides is
/// replaced by `patch`.
fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(b), Value::Object(p)) => {
            for (k, v) in p {
                match b.get_mut(k) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        b.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (slot, v) => *slot = v.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_sketch_state() {
        let c = FlowerConfig::default();
        assert_eq!(c.shape.opening_angle, 2.0);
        assert_eq!(c.shape.petal_size, 260.0);
        assert_eq!(c.leaves.leaf_count, 3);
        assert_eq!(c.leaves.leaf_width, 2.0);
        assert_eq!(c.color, ColorScheme::Custom { h: 340.0, s: 100.0, b: 70.0 });
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = FlowerConfig::from_json_str(
            r#"{"shape":{"openingAngle":9,"petalSize":300},"color":{"mode":"funky"}}"#,
        )
        .unwrap();
        assert_eq!(c.shape.opening_angle, 9.0);
        assert_eq!(c.shape.petal_size, 300.0);
        assert_eq!(c.shape.vertical_density, 8.0);
        assert_eq!(c.leaves, LeafParams::default());
        assert_eq!(c.color, ColorScheme::Funky);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(
            FlowerConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn clamped_enforces_slider_ranges() {
        let mut c = FlowerConfig::default();
        c.shape.opening_angle = 0.0;
        c.shape.outer_curve = 7.0;
        c.leaves.leaf_count = 99;
        c.color = ColorScheme::Custom { h: 370.0, s: 120.0, b: -4.0 };
        let c = c.clamped();
        assert_eq!(c.shape.opening_angle, 1.0);
        assert_eq!(c.shape.outer_curve, 1.5);
        assert_eq!(c.leaves.leaf_count, MAX_LEAVES);
        match c.color {
            ColorScheme::Custom { h, s, b } => {
                assert!((h - 10.0).abs() < 1e-4);
                assert_eq!((s, b), (100.0, 0.0));
            }
            other => panic!("unexpected scheme {other:?}"),
        }
    }

    #[test]
    fn store_snapshots_are_independent() {
        let mut store = ParamStore::default();
        let before = store.snapshot();
        store.shape_mut().petal_size = 390.0;
        store.leaves_mut().leaf_count = 5;
        assert_eq!(before.shape.petal_size, 260.0);
        assert_eq!(store.snapshot().shape.petal_size, 390.0);
        assert_eq!(store.snapshot().leaves.leaf_count, 5);
    }

    #[test]
    fn store_remembers_custom_color_across_modes() {
        let mut store = ParamStore::default();
        store.set_custom_color(Hsb::new(51.0, 85.0, 91.0));
        store.set_color_mode("rainbow");
        assert_eq!(store.snapshot().color, ColorScheme::Rainbow);
        store.set_color_mode("custom");
        assert_eq!(
            store.snapshot().color,
            ColorScheme::Custom { h: 51.0, s: 85.0, b: 91.0 }
        );
    }

    #[test]
    fn preset_applies_atomically() {
        let mut store = ParamStore::default();
        store.apply_preset("tulip").unwrap();
        let c = store.snapshot();
        assert_eq!(c.shape.opening_angle, 9.0);
        assert_eq!(c.leaves.leaf_count, 2);
        assert_eq!(c.color, ColorScheme::Custom { h: 282.0, s: 85.0, b: 96.0 });

        let err = store.apply_preset("daisy").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(_)));
        assert_eq!(store.snapshot(), c);
    }

    #[test]
    fn json_overlay_keeps_preset_fields() {
        let mut store = ParamStore::default();
        store.apply_preset("tulip").unwrap();
        store.apply_json_str(r#"{"color":{"mode":"rainbow"}}"#).unwrap();
        let c = store.snapshot();
        assert_eq!(c.shape, presets::TULIP.config.shape);
        assert_eq!(c.leaves, presets::TULIP.config.leaves);
        assert_eq!(c.color, ColorScheme::Rainbow);
    }

    #[test]
    fn json_overlay_merges_nested_fields() {
        let mut store = ParamStore::default();
        store.apply_preset("carnation").unwrap();
        store
            .apply_json_str(r#"{"shape":{"petalSize":320},"leaves":{"leafCount":7}}"#)
            .unwrap();
        let c = store.snapshot();
        assert_eq!(c.shape.petal_size, 320.0);
        assert_eq!(c.shape.opening_angle, 1.5);
        assert_eq!(c.leaves.leaf_count, 7);
        assert_eq!(c.leaves.leaf_width, 1.3);
        assert_eq!(c.color, presets::CARNATION.config.color);
    }

    #[test]
    fn json_overlay_custom_mode_uses_remembered_color() {
        let mut store = ParamStore::default();
        store.apply_preset("carnation").unwrap();
        store.set_color_mode("funky");
        store.apply_json_str(r#"{"color":{"mode":"custom","b":40}}"#).unwrap();
        assert_eq!(
            store.snapshot().color,
            ColorScheme::Custom { h: 51.0, s: 85.0, b: 40.0 }
        );
    }

    #[test]
    fn json_overlay_color_without_mode_keeps_mode() {
        let mut store = ParamStore::default();
        store.set_color_mode("pink");
        store.apply_json_str(r#"{"color":{"h":10}}"#).unwrap();
        assert_eq!(store.snapshot().color, ColorScheme::Pink);

        store.set_custom_color(Hsb::new(200.0, 50.0, 60.0));
        store.apply_json_str(r#"{"color":{"h":10}}"#).unwrap();
        assert_eq!(
            store.snapshot().color,
            ColorScheme::Custom { h: 10.0, s: 50.0, b: 60.0 }
        );
    }

    #[test]
    fn json_overlay_rejects_bad_input_without_changes() {
        let mut store = ParamStore::default();
        store.apply_preset("tulip").unwrap();
        let before = store.snapshot();
        assert!(store.apply_json_str(r#"{"shape":{"petalSize":"big"}}"#).is_err());
        assert_eq!(store.snapshot(), before);
    }
}
