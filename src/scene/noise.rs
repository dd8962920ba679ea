//! Tileable grayscale grain used to break up flat gradient banding.

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NOISE_TILE_SIZE: u32 = 256;

// Fixed seed: the grain must not shimmer between repaints.
const NOISE_SEED: u64 = 0x0A11_0F_60A7_5;

/// Build the grain tile. Pure and deterministic; callers cache the result.
#[must_use]
pub fn noise_tile(size: u32) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(NOISE_SEED);
    let mut img = RgbaImage::new(size, size);
    for px in img.pixels_mut() {
        let v = 128.0 + (rng.random::<f32>() - 0.5) * 40.0;
        let v = v.round().clamp(0.0, 255.0) as u8;
        *px = Rgba([v, v, v, 255]);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_is_opaque_gray_within_band() {
        let tile = noise_tile(16);
        for px in tile.pixels() {
            assert_eq!(px[3], 255);
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert!((108..=148).contains(&px[0]));
        }
    }

    #[test]
    fn tile_is_deterministic() {
        assert_eq!(noise_tile(32), noise_tile(32));
    }
}
