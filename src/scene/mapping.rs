//! Dimension mapper: physical centimeters → world size, seam, gap, zoom.
//!
//! Pure functions recomputed every frame; absent input yields identity
//! behavior (factor 1, default gap and seam).

use crate::dimensions::DimensionsCm;

use super::world::{
    REF_ART_CM_H, REF_ART_CM_W, REF_ART_WORLD_H, REF_ART_WORLD_W, REF_LONG_EDGE_CM, SEAM_Y,
};

pub const ART_ZOOM_FACTOR_MIN: f32 = 0.32;
pub const ART_ZOOM_FACTOR_MAX: f32 = 1.12;
/// Raised maximum for pieces with an edge of 2 m or more.
pub const ART_ZOOM_FACTOR_MAX_WIDE: f32 = 1.4;

pub const BOTTOM_GAP_REF: f32 = 280.0;
pub const BOTTOM_GAP_MIN: f32 = 100.0;
const BOTTOM_GAP_SMALL_ART: f32 = 190.0;
const BOTTOM_GAP_HEIGHT_FACTOR: f32 = 0.6;

/// Seam used for mid-size pieces (200–300 cm edge): more visible floor.
const DEEP_SEAM_Y: f32 = 800.0;

pub const W_DESKTOP: f32 = 1400.0;

/// Per-frame mapping of an optional physical size onto the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionMap {
    pub world_w: f32,
    pub world_h: f32,
    pub art_zoom_factor: f32,
    pub bottom_gap: f32,
    pub seam_y: f32,
}

#[must_use]
pub fn map_dimensions(dims: Option<DimensionsCm>, view_w: f32) -> DimensionMap {
    let seam_y = seam_for(dims);
    match dims {
        None => DimensionMap {
            world_w: REF_ART_WORLD_W,
            world_h: REF_ART_WORLD_H,
            art_zoom_factor: 1.0,
            bottom_gap: BOTTOM_GAP_REF,
            seam_y,
        },
        Some(d) => {
            let (world_w, world_h) = world_size_for(d);
            DimensionMap {
                world_w,
                world_h,
                art_zoom_factor: art_zoom_factor_for(d),
                bottom_gap: bottom_gap_for(world_h, d, view_w),
                seam_y,
            }
        }
    }
}

/// Componentwise scale from the reference artwork. The box does not preserve
/// the reference aspect ratio; the bitmap is later contain-fit inside it.
#[must_use]
pub fn world_size_for(d: DimensionsCm) -> (f32, f32) {
    (
        d.width_cm / REF_ART_CM_W * REF_ART_WORLD_W,
        d.height_cm / REF_ART_CM_H * REF_ART_WORLD_H,
    )
}

/// Mid-size pieces lower the seam to reveal more floor; very large pieces
/// reset to the default.
#[must_use]
pub fn seam_for(dims: Option<DimensionsCm>) -> f32 {
    let Some(d) = dims else { return SEAM_Y };
    if d.width_cm >= 300.0 || d.height_cm >= 300.0 {
        SEAM_Y
    } else if d.width_cm >= 200.0 || d.height_cm >= 200.0 {
        DEEP_SEAM_Y
    } else {
        SEAM_Y
    }
}

/// Taller artworks sit closer to the seam, clamped so the box never touches
/// it. Small pieces on desktop viewports use a fixed tighter gap.
#[must_use]
pub fn bottom_gap_for(art_world_h: f32, d: DimensionsCm, view_w: f32) -> f32 {
    if view_w >= W_DESKTOP && d.width_cm < 100.0 && d.height_cm < 100.0 {
        return BOTTOM_GAP_SMALL_ART;
    }
    let reduction = (art_world_h - REF_ART_WORLD_H) * BOTTOM_GAP_HEIGHT_FACTOR;
    (BOTTOM_GAP_REF - reduction).max(BOTTOM_GAP_MIN)
}

/// Smaller real artworks zoom in more; edges of 2 m or more receive a boost
/// and a raised cap so large families stay distinguishable.
#[must_use]
pub fn art_zoom_factor_for(d: DimensionsCm) -> f32 {
    let mut factor = REF_LONG_EDGE_CM / d.long_edge();
    let mut max_factor = ART_ZOOM_FACTOR_MAX;
    if d.width_cm >= 200.0 || d.height_cm >= 200.0 {
        let wide_boost = if d.width_cm >= 300.0 || d.height_cm >= 300.0 {
            1.1
        } else {
            1.3
        };
        factor *= wide_boost;
        max_factor = ART_ZOOM_FACTOR_MAX_WIDE;
    }
    factor.clamp(ART_ZOOM_FACTOR_MIN, max_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn cm(w: f32, h: f32) -> DimensionsCm {
        DimensionsCm {
            width_cm: w,
            height_cm: h,
        }
    }

    #[test]
    fn reference_size_maps_exactly() {
        let m = map_dimensions(Some(cm(96.0, 80.0)), 1920.0);
        assert_eq!(m.world_w, 414.0);
        assert_eq!(m.world_h, 345.0);
        assert_eq!(m.art_zoom_factor, 1.0);
    }

    #[test]
    fn absent_dimensions_are_identity() {
        let m = map_dimensions(None, 1920.0);
        assert_eq!(m.art_zoom_factor, 1.0);
        assert_eq!(m.bottom_gap, BOTTOM_GAP_REF);
        assert_eq!(m.seam_y, SEAM_Y);
    }

    #[test]
    fn world_size_scales_componentwise() {
        let (w, h) = world_size_for(cm(192.0, 40.0));
        assert_eq!(w, 828.0);
        assert_eq!(h, 172.5);
    }

    #[test]
    fn seam_deepens_for_mid_size_and_resets_for_huge() {
        assert_eq!(seam_for(None), SEAM_Y);
        assert_eq!(seam_for(Some(cm(100.0, 80.0))), SEAM_Y);
        assert_eq!(seam_for(Some(cm(250.0, 80.0))), DEEP_SEAM_Y);
        assert_eq!(seam_for(Some(cm(80.0, 250.0))), DEEP_SEAM_Y);
        assert_eq!(seam_for(Some(cm(300.0, 400.0))), SEAM_Y);
    }

    #[test]
    fn bottom_gap_never_drops_below_floor_constant() {
        for h_cm in [20.0, 80.0, 150.0, 250.0, 400.0, 1000.0] {
            let d = cm(100.0, h_cm);
            let (_, world_h) = world_size_for(d);
            for view_w in [320.0, 768.0, 1400.0, 1920.0] {
                assert!(bottom_gap_for(world_h, d, view_w) >= BOTTOM_GAP_MIN);
            }
        }
    }

    #[test]
    fn small_art_on_desktop_uses_fixed_gap() {
        let d = cm(60.0, 40.0);
        let (_, world_h) = world_size_for(d);
        assert_eq!(bottom_gap_for(world_h, d, 1920.0), 190.0);
        // same artwork on a tablet falls back to the height rule
        assert_ne!(bottom_gap_for(world_h, d, 800.0), 190.0);
    }

    #[test]
    fn zoom_factor_monotone_within_each_boost_regime() {
        // The wide boost steps the factor up when an edge crosses 200 cm, so
        // monotonicity holds per regime, not across the threshold itself.
        for longs in [
            &[40.0, 96.0, 150.0, 199.0][..],
            &[200.0, 220.0, 263.0, 290.0][..],
            &[320.0, 400.0, 500.0][..],
        ] {
            let mut prev = f32::INFINITY;
            for &long in longs {
                let f = art_zoom_factor_for(cm(long, long * 0.8));
                assert!(f <= prev, "factor rose at long edge {long}");
                assert!((ART_ZOOM_FACTOR_MIN..=ART_ZOOM_FACTOR_MAX_WIDE).contains(&f));
                prev = f;
            }
        }
    }

    #[test]
    fn wide_boost_raises_cap() {
        // 96/220 * 1.3 = 0.567..; without the boost this would be 0.436
        let f = art_zoom_factor_for(cm(220.0, 100.0));
        assert!((f - 96.0 / 220.0 * 1.3).abs() < 1e-6);
        // >= 300 cm uses the gentler boost and still clamps at the minimum
        assert_eq!(art_zoom_factor_for(cm(400.0, 300.0)), ART_ZOOM_FACTOR_MIN);
    }
}
