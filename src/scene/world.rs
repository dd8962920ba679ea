//! Fixed logical world space and the scene's authored geometry.
//!
//! All scene objects are placed in a constant 1600×900 coordinate system;
//! only the final affine transform maps it to device pixels.

use crate::config::{ColorPair, Rgb};

pub const WORLD_W: f32 = 1600.0;
pub const WORLD_H: f32 = 900.0;

/// Default wall/floor boundary. May move per-frame for large artworks, see
/// [`crate::scene::mapping::seam_for`].
pub const SEAM_Y: f32 = 720.0;

pub const WALL_COLORS: ColorPair = ColorPair {
    top: Rgb([0xf8, 0xf7, 0xf6]),
    bottom: Rgb([0xf2, 0xf0, 0xed]),
};

pub const FLOOR_COLORS: ColorPair = ColorPair {
    top: Rgb([0xb8, 0xb5, 0xb0]),
    bottom: Rgb([0x9a, 0x97, 0x92]),
};

/// Fallback baseboard tint used when no floor colors are configured.
pub const BASEBOARD_COLOR: Rgb = Rgb([0xa5, 0xa2, 0x9d]);

/// Reference artwork: a 96 × 80 cm piece occupies 414 × 345 world units.
/// Width and height scale independently from this reference.
pub const REF_ART_CM_W: f32 = 96.0;
pub const REF_ART_CM_H: f32 = 80.0;
pub const REF_ART_WORLD_W: f32 = 414.0;
pub const REF_ART_WORLD_H: f32 = 345.0;
pub const REF_LONG_EDGE_CM: f32 = 96.0;

/// World-unit gap between the artwork's right edge and the chair center.
pub const CHAIR_GAP_RIGHT_OF_ART: f32 = 200.0;

/// The artwork's bounding box, anchored by its bottom edge hanging
/// `bottom_gap` units above the seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkAnchor {
    pub cx: f32,
    pub w: f32,
    pub h: f32,
    pub bottom_gap: f32,
}

impl ArtworkAnchor {
    pub const DEFAULT: Self = Self {
        cx: WORLD_W * 0.5,
        w: REF_ART_WORLD_W,
        h: REF_ART_WORLD_H,
        bottom_gap: 280.0,
    };

    /// World-space box `(x, y, w, h)` for the given seam height.
    #[must_use]
    pub fn rect(&self, seam_y: f32) -> (f32, f32, f32, f32) {
        (
            self.cx - self.w / 2.0,
            seam_y - self.bottom_gap - self.h,
            self.w,
            self.h,
        )
    }
}

/// The chair's bounding box, anchored by its feet standing `floor_offset`
/// units below the seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChairAnchor {
    pub cx: f32,
    pub w: f32,
    pub h: f32,
    pub floor_offset: f32,
}

impl ChairAnchor {
    pub const DEFAULT: Self = Self {
        cx: WORLD_W * 0.5 + REF_ART_WORLD_W / 2.0 + CHAIR_GAP_RIGHT_OF_ART,
        w: 460.0,
        h: 430.0,
        floor_offset: 100.0,
    };

    /// World-space box `(x, y, w, h)` for the given seam height.
    #[must_use]
    pub fn rect(&self, seam_y: f32) -> (f32, f32, f32, f32) {
        let bottom = seam_y + self.floor_offset;
        (self.cx - self.w / 2.0, bottom - self.h, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artwork_box_hangs_above_seam() {
        let (x, y, w, h) = ArtworkAnchor::DEFAULT.rect(SEAM_Y);
        assert_eq!(x, 800.0 - 207.0);
        assert_eq!(y, SEAM_Y - 280.0 - 345.0);
        assert_eq!((w, h), (414.0, 345.0));
    }

    #[test]
    fn chair_feet_sit_below_seam() {
        let anchor = ChairAnchor::DEFAULT;
        let (_, y, _, h) = anchor.rect(SEAM_Y);
        assert_eq!(y + h, SEAM_Y + anchor.floor_offset);
    }
}
