use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::{self, Deserializer};
use tracing::warn;

use crate::dimensions::{DimensionsCm, parse_dimensions};
use crate::error::Error;

/// An sRGB color, written as `"#rrggbb"` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Parse `#rrggbb` (leading `#` optional, case-insensitive).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self([r, g, b]))
    }

    /// Multiply each channel toward black; used for the baseboard tint.
    #[must_use]
    pub fn darken(self, factor: f32) -> Self {
        let scale = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
        Self([scale(self.0[0]), scale(self.0[1]), scale(self.0[2])])
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| de::Error::custom(format!("expected '#rrggbb' color, got {raw:?}")))
    }
}

/// Top/bottom gradient colors for the wall or the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorPair {
    pub top: Rgb,
    pub bottom: Rgb,
}

/// Partial override for the artwork anchor. Unset fields keep the built-in
/// defaults (and cm-derived values, when physical dimensions are supplied).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArtworkAnchorOverride {
    pub center_x: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub bottom_gap: Option<f32>,
}

/// Partial override for the chair anchor.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChairAnchorOverride {
    pub center_x: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub floor_offset: Option<f32>,
}

/// Scene configuration. Every field is optional in the YAML file; the
/// defaults reproduce the built-in room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Artwork bitmap path; absent means the placeholder gradient is shown.
    pub artwork_image: Option<PathBuf>,
    /// Chair bitmap path; absent means the translucent placeholder box.
    pub chair_image: Option<PathBuf>,
    /// Free-text physical size, e.g. `"96 × 80 cm"`.
    pub dimensions: Option<String>,
    pub wall_colors: Option<ColorPair>,
    pub floor_colors: Option<ColorPair>,
    pub show_chair: bool,
    pub debug_overlay: bool,
    pub artwork_anchor: ArtworkAnchorOverride,
    pub chair_anchor: ChairAnchorOverride,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            artwork_image: None,
            chair_image: None,
            dimensions: None,
            wall_colors: None,
            floor_colors: None,
            show_chair: Self::default_show_chair(),
            debug_overlay: false,
            artwork_anchor: ArtworkAnchorOverride::default(),
            chair_anchor: ChairAnchorOverride::default(),
        }
    }
}

impl Configuration {
    const fn default_show_chair() -> bool {
        true
    }

    /// The parsed physical dimensions, or `None` when unset or unparseable.
    #[must_use]
    pub fn dimensions_cm(&self) -> Option<DimensionsCm> {
        self.dimensions.as_deref().and_then(parse_dimensions)
    }

    /// Sanity checks that go beyond serde's shape validation. An unparseable
    /// dimension string is downgraded to "no dimensions" with a warning; the
    /// scene must stay paintable.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(raw) = self.dimensions.as_deref() {
            if parse_dimensions(raw).is_none() {
                warn!(dimensions = raw, "unparseable dimension string, ignoring");
            }
        }
        for (name, value) in [
            ("artwork-anchor.width", self.artwork_anchor.width),
            ("artwork-anchor.height", self.artwork_anchor.height),
            ("chair-anchor.width", self.chair_anchor.width),
            ("chair-anchor.height", self.chair_anchor.height),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::BadConfig(format!("{name} must be positive, got {v}")));
                }
            }
        }
        Ok(())
    }
}

/// Load and deserialize a YAML configuration file.
pub fn from_yaml_file(path: &Path) -> Result<Configuration, Error> {
    let text = std::fs::read_to_string(path)?;
    let cfg: Configuration = serde_yaml::from_str(&text)?;
    Ok(cfg)
}
