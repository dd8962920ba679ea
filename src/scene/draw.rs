//! Minimal immediate-mode 2D drawing over an RGBA pixel buffer.
//!
//! The compositor authors everything in world units; a [`Canvas`] carries the
//! uniform world-to-device transform (scale plus translation) and clips every
//! primitive to the buffer. Blending is plain source-over.

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::config::Rgb;

/// A fully opaque color from config-space RGB.
#[must_use]
pub fn opaque(color: Rgb) -> Rgba<u8> {
    Rgba([color.0[0], color.0[1], color.0[2], 255])
}

/// Black at the given opacity.
#[must_use]
pub fn black(alpha: f32) -> Rgba<u8> {
    Rgba([0, 0, 0, alpha_byte(alpha)])
}

/// White at the given opacity.
#[must_use]
pub fn white(alpha: f32) -> Rgba<u8> {
    Rgba([255, 255, 255, alpha_byte(alpha)])
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = f32::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = src;
        return;
    }
    for c in 0..3 {
        let d = f32::from(dst[c]);
        let s = f32::from(src[c]);
        dst[c] = (s * sa + d * (1.0 - sa)).round() as u8;
    }
    let da = f32::from(dst[3]) / 255.0;
    dst[3] = ((sa + da * (1.0 - sa)) * 255.0).round() as u8;
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Rgba([
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        mix(a[3], b[3]),
    ])
}

/// Piecewise-linear gradient evaluation over `[0, 1]`. Stops must be sorted.
fn gradient_at(stops: &[(f32, Rgba<u8>)], t: f32) -> Rgba<u8> {
    let Some(&(first_pos, first_color)) = stops.first() else {
        return Rgba([0, 0, 0, 0]);
    };
    if t <= first_pos {
        return first_color;
    }
    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            let span = (p1 - p0).max(f32::EPSILON);
            return lerp_color(c0, c1, (t - p0) / span);
        }
    }
    stops.last().map_or(Rgba([0, 0, 0, 0]), |&(_, c)| c)
}

/// Smooth 0→1 edge ramp used for soft shadows.
fn edge_coverage(p: f32, lo: f32, hi: f32, r: f32) -> f32 {
    let ease = |t: f32| {
        let x = t.clamp(0.0, 1.0);
        x * x * (3.0 - 2.0 * x)
    };
    let rise = ease((p - (lo - r)) / (2.0 * r));
    let fall = 1.0 - ease((p - (hi - r)) / (2.0 * r));
    rise.min(fall).max(0.0)
}

/// Contain-fit a bitmap inside a box: wider-than-box images fit the width and
/// bottom-align, taller ones fit the height and center horizontally. The
/// image is never cropped, only letterboxed within its own anchor box.
#[must_use]
pub fn contain_fit(
    img_w: u32,
    img_h: u32,
    box_x: f32,
    box_y: f32,
    box_w: f32,
    box_h: f32,
) -> (f32, f32, f32, f32) {
    let img_aspect = img_w.max(1) as f32 / img_h.max(1) as f32;
    let box_aspect = box_w / box_h.max(f32::EPSILON);
    if img_aspect > box_aspect {
        let dh = box_w / img_aspect;
        (box_x, box_y + (box_h - dh), box_w, dh)
    } else {
        let dw = box_h * img_aspect;
        (box_x + (box_w - dw) / 2.0, box_y, dw, box_h)
    }
}

/// Immediate-mode drawing target with a world-to-device transform.
pub struct Canvas<'a> {
    frame: &'a mut RgbaImage,
    scale: f32,
    tx: f32,
    ty: f32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut RgbaImage) -> Self {
        Self {
            frame,
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn set_transform(&mut self, scale: f32, tx: f32, ty: f32) {
        self.scale = scale;
        self.tx = tx;
        self.ty = ty;
    }

    fn world_x(&self, dx: f32) -> f32 {
        (dx - self.tx) / self.scale
    }

    fn world_y(&self, dy: f32) -> f32 {
        (dy - self.ty) / self.scale
    }

    /// Device pixel bounds `(x0, y0, x1, y1)` of a world rect, clipped to the
    /// frame. `None` when fully off-screen or degenerate.
    fn device_bounds(&self, x: f32, y: f32, w: f32, h: f32) -> Option<(u32, u32, u32, u32)> {
        if !(self.scale > 0.0) || w <= 0.0 || h <= 0.0 {
            return None;
        }
        let fx0 = x * self.scale + self.tx;
        let fy0 = y * self.scale + self.ty;
        let fx1 = (x + w) * self.scale + self.tx;
        let fy1 = (y + h) * self.scale + self.ty;
        let x0 = fx0.round().max(0.0) as u32;
        let y0 = fy0.round().max(0.0) as u32;
        let x1 = (fx1.round().min(f32::from(u16::MAX)) as u32).min(self.frame.width());
        let y1 = (fy1.round().min(f32::from(u16::MAX)) as u32).min(self.frame.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Flat fill of the whole buffer, ignoring the transform.
    pub fn fill_frame(&mut self, color: Rgba<u8>) {
        for px in self.frame.pixels_mut() {
            *px = color;
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        for dy in y0..y1 {
            for dx in x0..x1 {
                blend(self.frame.get_pixel_mut(dx, dy), color);
            }
        }
    }

    /// Fill a world rect with a vertical gradient spanning `[grad_y0, grad_y1]`
    /// in world space.
    pub fn fill_rect_vgradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        grad_y0: f32,
        grad_y1: f32,
        stops: &[(f32, Rgba<u8>)],
    ) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        let span = (grad_y1 - grad_y0).max(f32::EPSILON);
        for dy in y0..y1 {
            let wy = self.world_y(dy as f32 + 0.5);
            let color = gradient_at(stops, ((wy - grad_y0) / span).clamp(0.0, 1.0));
            for dx in x0..x1 {
                blend(self.frame.get_pixel_mut(dx, dy), color);
            }
        }
    }

    /// Fill a world rect with a gradient running from its top-left corner to
    /// its bottom-right corner.
    pub fn fill_rect_dgradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        stops: &[(f32, Rgba<u8>)],
    ) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        // project onto the diagonal (w, h) / |(w, h)|²
        let len_sq = (w * w + h * h).max(f32::EPSILON);
        for dy in y0..y1 {
            let wy = self.world_y(dy as f32 + 0.5);
            for dx in x0..x1 {
                let wx = self.world_x(dx as f32 + 0.5);
                let t = ((wx - x) * w + (wy - y) * h) / len_sq;
                blend(
                    self.frame.get_pixel_mut(dx, dy),
                    gradient_at(stops, t.clamp(0.0, 1.0)),
                );
            }
        }
    }

    /// Radial falloff from `inner` at the center to `outer` at `radius`,
    /// clipped to the given world rect.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rect_radial(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        cx: f32,
        cy: f32,
        radius: f32,
        inner: Rgba<u8>,
        outer: Rgba<u8>,
    ) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        let radius = radius.max(f32::EPSILON);
        for dy in y0..y1 {
            let wy = self.world_y(dy as f32 + 0.5);
            for dx in x0..x1 {
                let wx = self.world_x(dx as f32 + 0.5);
                let d = ((wx - cx).powi(2) + (wy - cy).powi(2)).sqrt() / radius;
                blend(
                    self.frame.get_pixel_mut(dx, dy),
                    lerp_color(inner, outer, d),
                );
            }
        }
    }

    /// Tile a bitmap across a world rect at the given opacity. The pattern
    /// repeats in world units, so it scales with the zoom like everything
    /// else in the scene.
    pub fn fill_rect_pattern(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        tile: &RgbaImage,
        alpha: f32,
    ) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        if tile.width() == 0 || tile.height() == 0 {
            return;
        }
        let a = alpha_byte(alpha);
        let (tw, th) = (tile.width() as f32, tile.height() as f32);
        for dy in y0..y1 {
            let v = self.world_y(dy as f32 + 0.5).rem_euclid(th) as u32 % tile.height();
            for dx in x0..x1 {
                let u = self.world_x(dx as f32 + 0.5).rem_euclid(tw) as u32 % tile.width();
                let p = tile.get_pixel(u, v);
                blend(self.frame.get_pixel_mut(dx, dy), Rgba([p[0], p[1], p[2], a]));
            }
        }
    }

    /// Soft black drop shadow for an axis-aligned world rect. `blur` is the
    /// half-extent of the smooth edge ramp; `dx_off`/`dy_off` shift the
    /// shadow relative to the rect. All in world units.
    #[allow(clippy::too_many_arguments)]
    pub fn shadow_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        blur: f32,
        dx_off: f32,
        dy_off: f32,
        alpha: f32,
    ) {
        let sx = x + dx_off;
        let sy = y + dy_off;
        let r = blur.max(f32::EPSILON);
        let Some((x0, y0, x1, y1)) =
            self.device_bounds(sx - r, sy - r, w + 2.0 * r, h + 2.0 * r)
        else {
            return;
        };
        for dy in y0..y1 {
            let wy = self.world_y(dy as f32 + 0.5);
            let cov_y = edge_coverage(wy, sy, sy + h, r);
            if cov_y <= 0.0 {
                continue;
            }
            for dx in x0..x1 {
                let wx = self.world_x(dx as f32 + 0.5);
                let a = alpha * cov_y * edge_coverage(wx, sx, sx + w, r);
                if a > 0.0 {
                    blend(self.frame.get_pixel_mut(dx, dy), black(a));
                }
            }
        }
    }

    /// Blit a bitmap into a world rect (already contain-fitted by the
    /// caller), resampling to the device pixel size.
    pub fn draw_image(&mut self, img: &RgbaImage, x: f32, y: f32, w: f32, h: f32) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        let (dw, dh) = (x1 - x0, y1 - y0);
        let resized = imageops::resize(img, dw, dh, FilterType::Triangle);
        for (px, py, p) in resized.enumerate_pixels() {
            blend(self.frame.get_pixel_mut(x0 + px, y0 + py), *p);
        }
    }

    /// Rounded-corner panel. Coordinates and radius are in world units and go
    /// through the transform like every other primitive.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_round_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Rgba<u8>,
    ) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(x, y, w, h) else {
            return;
        };
        let r = radius.max(0.0);
        for dy in y0..y1 {
            let wy = self.world_y(dy as f32 + 0.5);
            for dx in x0..x1 {
                let wx = self.world_x(dx as f32 + 0.5);
                let qx = (wx - (x + r)).min(0.0) + (wx - (x + w - r)).max(0.0);
                let qy = (wy - (y + r)).min(0.0) + (wy - (y + h - r)).max(0.0);
                if qx * qx + qy * qy <= r * r {
                    blend(self.frame.get_pixel_mut(dx, dy), color);
                }
            }
        }
    }

    /// Rasterize a single line of text. `size_px` and the position are in
    /// world units; the transform maps them to device pixels.
    pub fn draw_text(
        &mut self,
        font: &FontVec,
        size_px: f32,
        x: f32,
        y: f32,
        color: Rgba<u8>,
        text: &str,
    ) {
        let scale = PxScale::from(size_px * self.scale);
        let scaled = font.as_scaled(scale);
        let mut pen_x = x * self.scale + self.tx;
        let baseline = y * self.scale + self.ty + scaled.ascent();
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                pen_x += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(pen_x, baseline));
            pen_x += scaled.h_advance(id);
            prev = Some(id);
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bb = outlined.px_bounds();
                let (fw, fh) = (self.frame.width() as i64, self.frame.height() as i64);
                outlined.draw(|gx, gy, cov| {
                    let dx = bb.min.x as i64 + i64::from(gx);
                    let dy = bb.min.y as i64 + i64::from(gy);
                    if dx >= 0 && dy >= 0 && dx < fw && dy < fh && cov > 0.0 {
                        let a = f32::from(color[3]) / 255.0 * cov;
                        blend(
                            self.frame.get_pixel_mut(dx as u32, dy as u32),
                            Rgba([color[0], color[1], color[2], alpha_byte(a)]),
                        );
                    }
                });
            }
        }
    }
}

/// Locate a monospace face for the debug overlay. Absence is non-fatal: the
/// panel is then drawn without text.
#[must_use]
pub fn load_monospace_font() -> Option<FontVec> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let query = fontdb::Query {
        families: &[fontdb::Family::Monospace],
        ..Default::default()
    };
    let id = db.query(&query)?;
    let (source, index) = db.face_source(id)?;
    let data = match source {
        fontdb::Source::Binary(bytes) => bytes.as_ref().as_ref().to_vec(),
        fontdb::Source::File(path) => std::fs::read(path).ok()?,
        fontdb::Source::SharedFile(path, _) => std::fs::read(path).ok()?,
    };
    let font = FontVec::try_from_vec_and_index(data, index).ok();
    if font.is_none() {
        debug!("monospace face found but could not be parsed");
    }
    font
}
