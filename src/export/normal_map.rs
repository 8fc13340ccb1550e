//! Normal map export for tile normals.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::Vec3;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;
use thiserror::Error;

/// Errors that can occur during normal map export.
#[derive(Error, Debug)]
pub enum NormalMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Normal count {0} does not match a {1}x{1} tile")]
    LengthMismatch(usize, usize),
}

/// Options for normal map generation.
#[derive(Debug, Clone)]
pub struct NormalMapOptions {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for NormalMapOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Packs a unit normal into RGB, mapping each component from [-1, 1] to [0, 255].
///
/// Channels are written as (x, z, y) so that "up" lands in blue, the usual
/// tangent-space layout.
pub fn encode_normal_rgb8(n: Vec3) -> [u8; 3] {
    let c = (Vec3::new(n.x, n.z, n.y) * 0.5) + Vec3::splat(0.5);
    [
        (c.x.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.y.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.z.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

/// Writes `side * side` row-major normals as an RGB PNG.
pub fn export_normal_map_png(
    normals: &[Vec3],
    side: usize,
    path: &Path,
    options: &NormalMapOptions,
) -> Result<(), NormalMapError> {
    if normals.len() != side * side {
        return Err(NormalMapError::LengthMismatch(normals.len(), side));
    }

    let bytes: Vec<u8> = normals.iter().flat_map(|&n| encode_normal_rgb8(n)).collect();

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(&bytes, side as u32, side as u32, image::ExtendedColorType::Rgb8)?;
    Ok(())
}
