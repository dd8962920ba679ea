//! Request-driven background image loader.
//!
//! Receives decode jobs off the render loop, decodes to RGBA8 (with EXIF
//! orientation applied), and returns results without ever blocking a paint.
//! A failed decode is a result too — `image: None` — so the compositor's
//! placeholder path is the single recovery mechanism.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use tracing::debug;

/// Which bitmap slot a request and its result belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Artwork,
    Chair,
}

/// Message sent to the background loader thread.
pub enum LoaderMsg {
    /// Decode `path` for `slot`. `generation` is echoed back untouched so the
    /// render loop can drop results from superseded requests.
    Load {
        slot: Slot,
        generation: u64,
        path: PathBuf,
    },
    /// Stop the loader.
    Quit,
}

/// A decode result. `image` is `None` when the file failed to open or decode.
pub struct LoadedBitmap {
    pub slot: Slot,
    pub generation: u64,
    pub image: Option<RgbaImage>,
}

/// Spawn the request-driven loader thread.
pub fn spawn_loader(rx: Receiver<LoaderMsg>, tx: Sender<LoadedBitmap>) {
    thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            match msg {
                LoaderMsg::Quit => break,
                LoaderMsg::Load {
                    slot,
                    generation,
                    path,
                } => {
                    let image = match decode_rgba8_apply_exif(&path) {
                        Ok(img) => {
                            debug!(path = %path.display(), "decoded bitmap");
                            Some(img)
                        }
                        Err(err) => {
                            debug!(path = %path.display(), %err, "bitmap failed to decode");
                            None
                        }
                    };
                    let _ = tx.send(LoadedBitmap {
                        slot,
                        generation,
                        image,
                    });
                }
            }
        }
    });
}

// Decodes an image to RGBA8 and applies EXIF orientation if available.
// Orientation handling is best-effort; missing metadata keeps the decoded
// orientation.
fn decode_rgba8_apply_exif(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;

    let mut img = img.to_rgba8();

    let orientation: u16 = read_orientation(path).unwrap_or(1);
    match orientation {
        1 => {}
        2 => {
            img = image::imageops::flip_horizontal(&img);
        }
        3 => {
            img = image::imageops::rotate180(&img);
        }
        4 => {
            img = image::imageops::flip_vertical(&img);
        }
        5 => {
            img = image::imageops::rotate90(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        6 => {
            img = image::imageops::rotate90(&img);
        }
        7 => {
            img = image::imageops::rotate270(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        8 => {
            img = image::imageops::rotate270(&img);
        }
        _ => {}
    }

    Ok(img)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let val = field.value.get_uint(0)?;
    debug!("exif orientation {} for {}", val, path.display());
    Some(val as u16)
}
