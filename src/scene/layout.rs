//! Responsive layout: viewport size → final zoom, world offset, chair nudge.
//!
//! Zoom multiplier and chair nudge interpolate smoothly between breakpoints
//! so resizing never produces a visible snap. Everything here is a pure
//! function of its inputs and is recomputed from scratch each frame.

use crate::dimensions::DimensionsCm;

use super::mapping::{ART_ZOOM_FACTOR_MIN, W_DESKTOP, map_dimensions};
use super::world::{ArtworkAnchor, CHAIR_GAP_RIGHT_OF_ART, ChairAnchor, WORLD_H, WORLD_W};

pub const W_MOBILE: f32 = 380.0;
pub const W_TABLET: f32 = 768.0;

/// The artwork may occupy at most this share of a mobile viewport's width.
const MOBILE_ART_WIDTH_RATIO: f32 = 0.9;

/// Extra zoom-in for small pieces on large screens.
const DESKTOP_SMALL_ART_BOOST: f32 = 1.25;

/// Large-size family that shares one visual scale on desktop. Contract
/// values, not a principle to generalize.
const SHARED_SCALE_LONG_EDGE_CM: f32 = 263.0;
const SHARED_SCALE_SHORT_EDGE_CM: f32 = 200.0;

#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Hermite ease (`3t² − 2t³`), clamped to `[0, 1]`.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let x = t.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// The two paired responsive quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsiveCurve {
    pub zoom_multiplier: f32,
    pub chair_nudge: f32,
}

/// Breakpoint interpolation: constant 2.95/350 up to 380 px, easing down to
/// 1.65/230 at 768 px and 1/0 at 1400 px, constant beyond.
#[must_use]
pub fn responsive_curve(view_w: f32) -> ResponsiveCurve {
    if view_w <= W_MOBILE {
        ResponsiveCurve {
            zoom_multiplier: 2.95,
            chair_nudge: 350.0,
        }
    } else if view_w < W_TABLET {
        let t = smoothstep((view_w - W_MOBILE) / (W_TABLET - W_MOBILE));
        ResponsiveCurve {
            zoom_multiplier: lerp(2.95, 1.65, t),
            chair_nudge: lerp(350.0, 230.0, t),
        }
    } else if view_w < W_DESKTOP {
        let t = smoothstep((view_w - W_TABLET) / (W_DESKTOP - W_TABLET));
        ResponsiveCurve {
            zoom_multiplier: lerp(1.65, 1.0, t),
            chair_nudge: lerp(230.0, 0.0, t),
        }
    } else {
        ResponsiveCurve {
            zoom_multiplier: 1.0,
            chair_nudge: 0.0,
        }
    }
}

/// Uniform scale-to-fit of the world rectangle in the viewport.
#[must_use]
pub fn zoom_fit(view_w: f32, view_h: f32) -> f32 {
    (view_w / WORLD_W).min(view_h / WORLD_H)
}

/// Per-frame scene inputs: optional physical size plus the base anchors
/// (defaults merged with any configured overrides).
#[derive(Debug, Clone, Copy)]
pub struct SceneInputs {
    pub dims: Option<DimensionsCm>,
    pub artwork_base: ArtworkAnchor,
    pub chair_base: ChairAnchor,
}

impl Default for SceneInputs {
    fn default() -> Self {
        Self {
            dims: None,
            artwork_base: ArtworkAnchor::DEFAULT,
            chair_base: ChairAnchor::DEFAULT,
        }
    }
}

/// Fully resolved per-frame layout, ready for the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    pub zoom: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub seam_y: f32,
    pub art: ArtworkAnchor,
    pub chair: ChairAnchor,
    pub art_zoom_factor: f32,
    pub chair_nudge: f32,
    pub dims: Option<DimensionsCm>,
    pub view_w: f32,
    pub view_h: f32,
}

/// Compose the dimension map, the responsive curve, and the zoom clamps into
/// the final world-to-viewport layout. Pure; identical inputs yield
/// bit-identical output.
#[must_use]
pub fn compute_layout(inputs: &SceneInputs, view_w: f32, view_h: f32) -> SceneLayout {
    let curve = responsive_curve(view_w);
    let map = map_dimensions(inputs.dims, view_w);
    let seam_y = map.seam_y;

    let mut art = inputs.artwork_base;
    let mut chair = inputs.chair_base;
    if inputs.dims.is_some() {
        art.w = map.world_w;
        art.h = map.world_h;
        art.bottom_gap = map.bottom_gap;
        chair.cx = art.cx + art.w / 2.0 + CHAIR_GAP_RIGHT_OF_ART;
    }
    chair.cx -= curve.chair_nudge;

    // Desktop-only overrides, applied in this order by contract.
    let mut art_zoom_factor = map.art_zoom_factor;
    if view_w >= W_DESKTOP {
        if let Some(d) = inputs.dims {
            if d.width_cm < 200.0 && d.height_cm < 200.0 {
                art_zoom_factor *= DESKTOP_SMALL_ART_BOOST;
            }
            if d.long_edge() >= SHARED_SCALE_LONG_EDGE_CM
                && d.short_edge() >= SHARED_SCALE_SHORT_EDGE_CM
            {
                art_zoom_factor = art_zoom_factor.min(ART_ZOOM_FACTOR_MIN);
            }
        }
    }

    // Cap so the seam stays at least half the viewport above world center.
    let base_zoom = zoom_fit(view_w, view_h) * curve.zoom_multiplier;
    let max_zoom_to_see_floor = view_h / (2.0 * (seam_y - WORLD_H / 2.0));
    let max_art_zoom_for_floor = if base_zoom > 0.0 {
        max_zoom_to_see_floor / base_zoom
    } else {
        art_zoom_factor
    };
    art_zoom_factor = art_zoom_factor.min(max_art_zoom_for_floor);

    let mut zoom = base_zoom * art_zoom_factor;
    if view_w <= W_TABLET && art.w > 0.0 {
        zoom = zoom.min(view_w * MOBILE_ART_WIDTH_RATIO / art.w);
    }

    let offset_x = view_w / 2.0 - WORLD_W / 2.0 * zoom;
    let large = inputs
        .dims
        .is_some_and(|d| d.width_cm >= 200.0 || d.height_cm >= 200.0);
    let offset_y = if view_w > W_MOBILE && large {
        // Bias the crop toward the upper wall region for big pieces.
        view_h / 2.0 - seam_y * 0.25 * zoom
    } else {
        view_h / 2.0 - WORLD_H / 2.0 * zoom
    };

    SceneLayout {
        zoom,
        offset_x,
        offset_y,
        seam_y,
        art,
        chair,
        art_zoom_factor,
        chair_nudge: curve.chair_nudge,
        dims: inputs.dims,
        view_w,
        view_h,
    }
}
