//! PNG export for tile color textures and height maps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::{ColorBuffer, TileBuffers};

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("Buffer length {0} does not match {1}x{2} image")]
    LengthMismatch(usize, usize, usize),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height mapped to black.
    pub min_height: f32,
    /// Height mapped to white.
    pub max_height: f32,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Normalizes over `[0, max_height]`, the full range a tile can reach
    /// with a curve bounded in [0, 1].
    pub fn for_max_height(max_height: f32) -> Self {
        Self {
            min_height: 0.0,
            max_height,
            ..Default::default()
        }
    }

    /// Creates options with the height range detected from the tile.
    pub fn auto_range(tile: &TileBuffers) -> Self {
        let (min, max) = tile.height_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Writes a tile color buffer as an 8-bit RGB PNG, row `z` as image row.
pub fn export_color_png(
    colors: &ColorBuffer,
    path: &Path,
    compression: CompressionType,
    filter: FilterType,
) -> Result<(), PngExportError> {
    if colors.pixels.len() != colors.width * colors.depth {
        return Err(PngExportError::LengthMismatch(colors.pixels.len(), colors.width, colors.depth));
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, compression, filter);
    encoder.write_image(
        colors.as_bytes(),
        colors.width as u32,
        colors.depth as u32,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Writes tile vertex heights as a 16-bit grayscale PNG.
pub fn export_height_png(
    tile: &TileBuffers,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let side = tile.side as u32;
    if tile.heights.len() != tile.vertex_count() {
        return Err(PngExportError::LengthMismatch(tile.heights.len(), tile.side, tile.side));
    }
    let range = max - min;

    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(side, side);

    for (i, &height) in tile.heights.iter().enumerate() {
        let normalized = ((height - min) / range).clamp(0.0, 1.0);
        let value = (normalized * 65535.0) as u16;
        img.put_pixel(i as u32 % side, i as u32 / side, Luma([value]));
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());

    encoder.write_image(byte_slice, side, side, image::ExtendedColorType::L16)?;
    Ok(())
}
