//! Image resolution, decoding and scaling.

use std::io::Cursor;
use std::path::Path;

use ecow::{EcoString, eco_format};
use image::{GenericImageView, ImageFormat};
use log::{debug, warn};

use crate::Result;
use crate::fetch::{ImageFetcher, is_remote};
use crate::ir;

/// EMUs per pixel at 96 dpi.
pub const EMU_PER_PX: u64 = 9525;
/// EMUs per centimeter.
pub const EMU_PER_CM: f64 = 360_000.0;

/// Image data a document can embed, with its pixel size.
#[derive(Debug)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes image data, re-encoding formats other than PNG and JPEG as PNG.
pub fn decode(data: Vec<u8>) -> Result<DecodedImage> {
    let format = image::guess_format(&data)?;
    let img = image::load_from_memory_with_format(&data, format)?;
    let (width, height) = img.dimensions();

    let data = match format {
        ImageFormat::Png | ImageFormat::Jpeg => data,
        _ => {
            debug!("converting {format:?} image to PNG");
            let mut buffer = Vec::new();
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
            buffer
        }
    };

    Ok(DecodedImage {
        data,
        width,
        height,
    })
}

/// Computes the displayed size in EMUs, shrinking the image to
/// `max_width_cm` while keeping its aspect ratio.
pub fn scaled_size(width: u32, height: u32, max_width_cm: f64) -> (u32, u32) {
    let width_emu = u64::from(width) * EMU_PER_PX;
    let height_emu = u64::from(height) * EMU_PER_PX;
    let max_emu = (max_width_cm * EMU_PER_CM).max(0.0).round() as u64;

    if width_emu <= max_emu || width_emu == 0 {
        return (clamp(width_emu), clamp(height_emu));
    }

    let ratio = max_emu as f64 / width_emu as f64;
    (clamp(max_emu), (height_emu as f64 * ratio).round() as u32)
}

fn clamp(emu: u64) -> u32 {
    u32::try_from(emu).unwrap_or(u32::MAX)
}

/// Resolves an image source to an embeddable image.
///
/// On failure, returns the text of the placeholder standing in for the image.
pub fn resolve(
    source: &str,
    base_dir: &Path,
    max_width_cm: f64,
    fetcher: &mut dyn ImageFetcher,
) -> std::result::Result<ir::Image, EcoString> {
    let path = if is_remote(source) {
        match fetcher.fetch(source) {
            Ok(path) => path,
            Err(err) => {
                warn!("cannot download image {source}: {err}");
                return Err(eco_format!("[Remote image not downloaded: {source}]"));
            }
        }
    } else {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    };

    let name: EcoString = path
        .file_name()
        .map_or_else(|| source.into(), |name| name.to_string_lossy().as_ref().into());

    if !path.exists() {
        warn!("cannot find image {}", path.display());
        return Err(eco_format!("[Image not found: {name}]"));
    }

    let decoded = std::fs::read(&path).map_err(Into::into).and_then(decode);
    match decoded {
        Ok(img) => {
            let (width_emu, height_emu) = scaled_size(img.width, img.height, max_width_cm);
            Ok(ir::Image {
                data: img.data,
                width_emu,
                height_emu,
                source: source.into(),
            })
        }
        Err(err) => {
            warn!("cannot load image {}: {err}", path.display());
            Err(eco_format!("[Image could not be loaded: {name}]"))
        }
    }
}
