use serde::{Deserialize, Serialize};

/// Hue in degrees [0, 360), saturation and brightness in [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsb {
    pub h: f32,
    pub s: f32,
    pub b: f32,
}

impl Hsb {
    pub const fn new(h: f32, s: f32, b: f32) -> Self {
        Self { h, s, b }
    }

    /// Wrap the hue and clamp saturation/brightness into range.
    pub fn normalized(self) -> Self {
        Self {
            h: self.h.rem_euclid(360.0),
            s: self.s.clamp(0.0, 100.0),
            b: self.b.clamp(0.0, 100.0),
        }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        let Hsb { h, s, b } = self.normalized();
        let s = s / 100.0;
        let v = b / 100.0;
        let c = v * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r, g, bl) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        [to_u8(r), to_u8(g), to_u8(bl), 255]
    }
}

/// How petal quads are colored.
///
/// Serialized internally tagged: `{"mode": "custom", "h": 340, "s": 100, "b": 70}`.
/// Any mode name this build does not know deserializes to `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColorScheme {
    Rainbow,
    Funky,
    Custom { h: f32, s: f32, b: f32 },
    Pink,
    #[serde(other)]
    Unknown,
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Custom {
            h: 340.0,
            s: 100.0,
            b: 70.0,
        }
    }
}

impl ColorScheme {
    /// Resolve a mode tag as a parameter source would send it. `custom` takes
    /// its color from `custom`; unrecognized tags map to `Unknown`.
    pub fn from_mode_name(name: &str, custom: Hsb) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "rainbow" => ColorScheme::Rainbow,
            "funky" => ColorScheme::Funky,
            "custom" => ColorScheme::Custom {
                h: custom.h,
                s: custom.s,
                b: custom.b,
            },
            "pink" => ColorScheme::Pink,
            _ => ColorScheme::Unknown,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Funky => "funky",
            ColorScheme::Custom { .. } => "custom",
            ColorScheme::Pink => "pink",
            ColorScheme::Unknown => "unknown",
        }
    }
}

/// Fill color for the petal quad whose lower corner is ring `r`, step `theta`.
///
/// `rho` is `r / R` and `angle` is `theta * angular_delta` in degrees.
pub fn petal_color(scheme: ColorScheme, r: usize, rho: f32, angle: f32) -> Hsb {
    match scheme {
        ColorScheme::Rainbow | ColorScheme::Unknown => {
            Hsb::new(angle.rem_euclid(360.0), 100.0, 70.0 + rho * 30.0)
        }
        ColorScheme::Funky => Hsb::new(
            (angle + r as f32 * 30.0).rem_euclid(360.0),
            100.0,
            70.0 + rho * 30.0,
        ),
        ColorScheme::Custom { b, .. } if b == 0.0 => Hsb::new(0.0, 0.0, rho * 15.0),
        ColorScheme::Custom { h, s, b } => {
            Hsb::new(h, s, (b * 0.5 + rho * 50.0).clamp(0.0, 100.0))
        }
        ColorScheme::Pink => Hsb::new(340.0, 100.0, (-20.0 + rho * 120.0).clamp(0.0, 100.0)),
    }
}
