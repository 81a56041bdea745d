use serde::Serialize;

use crate::color::ColorScheme;
use crate::config::{ConfigError, FlowerConfig, LeafParams, ShapeParams};

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub config: FlowerConfig,
}

pub const ROSE: Preset = Preset {
    name: "rose",
    config: FlowerConfig {
        shape: ShapeParams {
            opening_angle: 2.0,
            vertical_density: 8.0,
            petal_alignment: 3.6,
            inner_curve: 2.0,
            outer_curve: 1.3,
            petal_size: 260.0,
        },
        leaves: LeafParams {
            leaf_count: 3,
            leaf_height: 1.0,
            leaf_width: 1.0,
        },
        color: ColorScheme::Custom { h: 340.0, s: 100.0, b: 70.0 },
    },
};

pub const TULIP: Preset = Preset {
    name: "tulip",
    config: FlowerConfig {
        shape: ShapeParams {
            opening_angle: 9.0,
            vertical_density: 13.5,
            petal_alignment: 4.6,
            inner_curve: 5.5,
            outer_curve: 0.7,
            petal_size: 300.0,
        },
        leaves: LeafParams {
            leaf_count: 2,
            leaf_height: 1.2,
            leaf_width: 0.8,
        },
        color: ColorScheme::Custom { h: 282.0, s: 85.0, b: 96.0 },
    },
};

pub const CARNATION: Preset = Preset {
    name: "carnation",
    config: FlowerConfig {
        shape: ShapeParams {
            opening_angle: 1.5,
            vertical_density: 12.0,
            petal_alignment: 4.5,
            inner_curve: 0.0,
            outer_curve: 1.1,
            petal_size: 240.0,
        },
        leaves: LeafParams {
            leaf_count: 4,
            leaf_height: 0.8,
            leaf_width: 1.3,
        },
        color: ColorScheme::Custom { h: 51.0, s: 85.0, b: 91.0 },
    },
};

pub const ALL: [Preset; 3] = [ROSE, TULIP, CARNATION];

/// Case-insensitive lookup by preset name.
pub fn lookup(name: &str) -> Result<Preset, ConfigError> {
    ALL.iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .copied()
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("Carnation").unwrap().config.shape.petal_size, 240.0);
        assert_eq!(lookup(" ROSE ").unwrap().name, "rose");
    }

    #[test]
    fn presets_stay_inside_slider_ranges() {
        for p in ALL {
            assert_eq!(p.config.clamped(), p.config, "preset {} out of range", p.name);
        }
    }
}
