//! Per-tile export of a generated level.

use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType};
use thiserror::Error;

use super::normal_map::{export_normal_map_png, NormalMapError, NormalMapOptions};
use super::png::{export_color_png, export_height_png, PngExportError, PngExportOptions};
use super::raw::{export_heights_raw, RawExportError, RawFormat};
use crate::level::{LevelLayout, Tile};

/// Errors that can occur while exporting a level.
#[derive(Error, Debug)]
pub enum LevelExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Png(#[from] PngExportError),
    #[error(transparent)]
    Raw(#[from] RawExportError),
    #[error(transparent)]
    NormalMap(#[from] NormalMapError),
    #[error("Tile ({0}, {1}) has not been generated yet")]
    NotGenerated(usize, usize),
}

/// Storage format for vertex heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightFormat {
    /// 16-bit grayscale PNG.
    Png,
    Raw(RawFormat),
}

/// What to write for every tile.
#[derive(Debug, Clone)]
pub struct LevelExportOptions {
    /// `None` skips height export.
    pub heights: Option<HeightFormat>,
    pub colors: bool,
    pub normals: bool,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for LevelExportOptions {
    fn default() -> Self {
        Self {
            heights: Some(HeightFormat::Png),
            colors: true,
            normals: false,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Path stem for a tile: `{base_name}_{x}_{z}`.
pub fn tile_file_stem(output_dir: &Path, base_name: &str, tile: &Tile) -> PathBuf {
    let (x, z) = tile.grid();
    output_dir.join(format!("{}_{}_{}", base_name, x, z))
}

/// Exports every tile of the level.
///
/// Files are named `{base_name}_{x}_{z}_{color|height|normal}.{png|raw}`.
/// Heights are normalized over `[0, max_height]` for 16-bit outputs.
/// Returns the number of files written.
pub fn export_level(
    layout: &LevelLayout,
    output_dir: &Path,
    base_name: &str,
    options: &LevelExportOptions,
) -> Result<usize, LevelExportError> {
    std::fs::create_dir_all(output_dir)?;

    let max_height = layout.settings().max_height;
    let (min_h, max_h) = if max_height > 0.0 {
        (0.0, max_height)
    } else if max_height < 0.0 {
        (max_height, 0.0)
    } else {
        (0.0, 1.0)
    };
    let png_options = PngExportOptions {
        min_height: min_h,
        max_height: max_h,
        compression: options.compression,
        filter: options.filter,
    };
    let normal_options = NormalMapOptions {
        compression: options.compression,
        filter: options.filter,
    };

    let mut written = 0;
    for tile in layout.tiles() {
        let (x, z) = tile.grid();
        let buffers = tile.buffers().ok_or(LevelExportError::NotGenerated(x, z))?;
        let stem = tile_file_stem(output_dir, base_name, tile);
        let stem = stem.to_string_lossy();

        if options.colors {
            let path = PathBuf::from(format!("{}_color.png", stem));
            export_color_png(&buffers.colors, &path, options.compression, options.filter)?;
            written += 1;
        }

        match options.heights {
            Some(HeightFormat::Png) => {
                let path = PathBuf::from(format!("{}_height.png", stem));
                export_height_png(buffers, &path, &png_options)?;
                written += 1;
            }
            Some(HeightFormat::Raw(format)) => {
                let path = PathBuf::from(format!("{}_height.raw", stem));
                export_heights_raw(&buffers.heights, &path, format, min_h, max_h)?;
                written += 1;
            }
            None => {}
        }

        if options.normals {
            let path = PathBuf::from(format!("{}_normal.png", stem));
            export_normal_map_png(&buffers.normals, buffers.side, &path, &normal_options)?;
            written += 1;
        }
    }

    log::info!("exported {} files to {}", written, output_dir.display());
    Ok(written)
}
