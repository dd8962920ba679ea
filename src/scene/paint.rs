//! Scene compositor: paints the room back-to-front into a device-pixel frame.
//!
//! Stateless with respect to its inputs; the render loop owns every bitmap
//! and calls [`paint`] once per frame. Draw order is fixed: backdrop fill,
//! wall, floor, seam dressing, grain, bounce light, artwork, chair, debug
//! overlay. Nothing here ever triggers a load.

use ab_glyph::FontVec;
use image::RgbaImage;

use crate::config::ColorPair;

use super::draw::{Canvas, black, contain_fit, opaque, white};
use super::layout::SceneLayout;
use super::world::{BASEBOARD_COLOR, FLOOR_COLORS, WALL_COLORS, WORLD_H, WORLD_W};

/// Minimum background overdraw beyond the world rectangle, in world units.
pub const BACKGROUND_PAD: f32 = 800.0;

const BASEBOARD_H: f32 = 8.0;
const WALL_GRAIN_ALPHA: f32 = 0.025;
const FLOOR_GRAIN_ALPHA: f32 = 0.035;

/// Everything the compositor reads. It only ever borrows bitmaps; slots that
/// are pending or failed arrive as `None` and fall back to placeholders.
pub struct Scene<'a> {
    pub layout: &'a SceneLayout,
    pub wall_colors: Option<ColorPair>,
    pub floor_colors: Option<ColorPair>,
    pub artwork: Option<&'a RgbaImage>,
    pub chair: Option<&'a RgbaImage>,
    pub noise: &'a RgbaImage,
    pub show_chair: bool,
    pub debug_overlay: bool,
    pub debug_font: Option<&'a FontVec>,
    pub device_pixel_ratio: f32,
}

/// Paint one frame. `frame` is sized to device pixels by the caller.
pub fn paint(frame: &mut RgbaImage, scene: &Scene<'_>) {
    let layout = scene.layout;
    let wall = scene.wall_colors.unwrap_or(WALL_COLORS);
    let dpr = scene.device_pixel_ratio;

    let mut canvas = Canvas::new(frame);

    // Backdrop fill first so transform padding can never flash through.
    canvas.fill_frame(opaque(wall.top));

    canvas.set_transform(
        dpr * layout.zoom,
        dpr * layout.offset_x,
        dpr * layout.offset_y,
    );

    let pad = background_pad(layout);
    paint_background(&mut canvas, scene, pad);
    paint_artwork(&mut canvas, layout, scene.artwork);
    if scene.show_chair {
        paint_chair(&mut canvas, layout, scene.chair);
    }

    // Debug overlay is screen space: transform carries only the DPR.
    if scene.debug_overlay {
        canvas.set_transform(dpr, 0.0, 0.0);
        paint_debug_overlay(&mut canvas, scene);
    }
}

// Enough overdraw that extreme zoom-out never reveals bare canvas.
fn background_pad(layout: &SceneLayout) -> f32 {
    (layout.view_w / (2.0 * layout.zoom) - WORLD_W / 2.0)
        .max(layout.view_h / (2.0 * layout.zoom) - WORLD_H / 2.0)
        .max(BACKGROUND_PAD)
        .ceil()
}

fn paint_background(canvas: &mut Canvas<'_>, scene: &Scene<'_>, pad: f32) {
    let wall = scene.wall_colors.unwrap_or(WALL_COLORS);
    let floor = scene.floor_colors.unwrap_or(FLOOR_COLORS);
    let seam = scene.layout.seam_y;

    let left = -pad;
    let top = -pad;
    let right = WORLD_W + pad;
    let bottom = WORLD_H + pad;
    let width = right - left;

    // Wall: gradient settles into the bottom color from 70% down.
    canvas.fill_rect_vgradient(
        left,
        top,
        width,
        seam - top,
        top,
        seam,
        &[
            (0.0, opaque(wall.top)),
            (0.7, opaque(wall.bottom)),
            (1.0, opaque(wall.bottom)),
        ],
    );

    // Floor.
    canvas.fill_rect_vgradient(
        left,
        seam,
        width,
        bottom - seam,
        seam,
        bottom,
        &[(0.0, opaque(floor.top)), (1.0, opaque(floor.bottom))],
    );

    // Ambient occlusion straddling the seam sells the junction.
    canvas.fill_rect_vgradient(
        left,
        seam - 30.0,
        width,
        70.0,
        seam - 30.0,
        seam + 40.0,
        &[
            (0.0, black(0.0)),
            (0.4, black(0.04)),
            (0.6, black(0.06)),
            (1.0, black(0.0)),
        ],
    );

    // Baseboard with a light top edge and a dark line at the seam.
    let baseboard = if scene.floor_colors.is_some() {
        floor.bottom.darken(0.90)
    } else {
        BASEBOARD_COLOR
    };
    canvas.fill_rect(left, seam - BASEBOARD_H, width, BASEBOARD_H, opaque(baseboard));
    canvas.fill_rect(left, seam - BASEBOARD_H, width, 1.0, white(0.12));
    canvas.fill_rect(left, seam, width, 1.0, black(0.08));

    // Grain breaks up gradient banding; slightly stronger on the floor.
    canvas.fill_rect_pattern(left, top, width, seam - top, scene.noise, WALL_GRAIN_ALPHA);
    canvas.fill_rect_pattern(left, seam, width, bottom - seam, scene.noise, FLOOR_GRAIN_ALPHA);

    // Soft bounce light on the floor, strongest near horizontal center.
    canvas.fill_rect_radial(
        left,
        seam,
        width,
        bottom - seam,
        WORLD_W / 2.0,
        seam + 200.0,
        WORLD_W * 0.6,
        white(0.06),
        white(0.0),
    );
}

fn paint_artwork(canvas: &mut Canvas<'_>, layout: &SceneLayout, bitmap: Option<&RgbaImage>) {
    let (bx, by, bw, bh) = layout.art.rect(layout.seam_y);
    match bitmap {
        Some(img) => {
            let (dx, dy, dw, dh) = contain_fit(img.width(), img.height(), bx, by, bw, bh);
            // Wide wall shadow, then a tight one for matting depth.
            canvas.shadow_rect(dx, dy, dw, dh, 32.0, 0.0, 6.0, 0.28);
            canvas.shadow_rect(dx, dy, dw, dh, 8.0, 4.0, 4.0, 0.60);
            canvas.fill_rect(dx, dy, dw, dh, white(1.0));
            canvas.draw_image(img, dx, dy, dw, dh);
        }
        None => {
            // The scene must never be blank while an asset is pending.
            canvas.shadow_rect(bx, by, bw, bh, 24.0, 0.0, 6.0, 0.25);
            canvas.fill_rect_dgradient(
                bx,
                by,
                bw,
                bh,
                &[
                    (0.0, image::Rgba([0x6b, 0x8f, 0x71, 255])),
                    (0.5, image::Rgba([0xa3, 0xc4, 0xa8, 255])),
                    (1.0, image::Rgba([0x8b, 0x6f, 0x47, 255])),
                ],
            );
        }
    }
}

fn paint_chair(canvas: &mut Canvas<'_>, layout: &SceneLayout, bitmap: Option<&RgbaImage>) {
    let (bx, by, bw, bh) = layout.chair.rect(layout.seam_y);
    match bitmap {
        Some(img) => {
            let (dx, dy, dw, dh) = contain_fit(img.width(), img.height(), bx, by, bw, bh);
            canvas.draw_image(img, dx, dy, dw, dh);
        }
        None => {
            canvas.fill_rect(bx, by, bw, bh, image::Rgba([60, 48, 38, 153]));
        }
    }
}

fn paint_debug_overlay(canvas: &mut Canvas<'_>, scene: &Scene<'_>) {
    const PADDING: f32 = 10.0;
    const LINE_H: f32 = 17.0;
    const BOX_W: f32 = 380.0;
    const FONT_PX: f32 = 12.0;

    let l = scene.layout;
    let mut lines = vec![
        format!(
            "Viewport: {} x {} CSS px",
            l.view_w.round(),
            l.view_h.round()
        ),
        format!("zoom: {:.4}", l.zoom),
        format!("WORLD: {WORLD_W} x {WORLD_H}"),
        format!("seamY: {}", l.seam_y),
    ];
    if let Some(d) = l.dims {
        lines.push(format!("Dimensions: {} x {} cm", d.width_cm, d.height_cm));
        lines.push(format!("Art zoom factor: {:.3}", l.art_zoom_factor));
    }
    lines.push(format!(
        "Art: {:.0}x{:.0} px  bottomGap: {}",
        l.art.w, l.art.h, l.art.bottom_gap
    ));
    lines.push(format!(
        "Chair floorOffset: {}  (feet at y={})",
        l.chair.floor_offset,
        l.seam_y + l.chair.floor_offset
    ));
    lines.push(format!("DPR: {}", scene.device_pixel_ratio));

    let box_h = lines.len() as f32 * LINE_H + PADDING * 2.0;
    canvas.fill_round_rect(10.0, 10.0, BOX_W, box_h, 6.0, black(0.6));

    if let Some(font) = scene.debug_font {
        for (i, line) in lines.iter().enumerate() {
            canvas.draw_text(
                font,
                FONT_PX,
                10.0 + PADDING,
                10.0 + PADDING + i as f32 * LINE_H,
                white(1.0),
                line,
            );
        }
    }
}
