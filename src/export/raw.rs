//! RAW height export for game engine import.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian.
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (unnormalized).
    R32Float,
}

/// Writes row-major vertex heights as a headerless RAW file.
///
/// R16 formats normalize `[min_height, max_height]` to the full u16 range;
/// R32 writes heights as-is and ignores the range.
pub fn export_heights_raw(
    heights: &[f32],
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let range = max_height - min_height;
    let quantize = |height: f32| -> u16 {
        let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
        (normalized * 65535.0) as u16
    };

    match format {
        RawFormat::R16LittleEndian => {
            for &height in heights {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in heights {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in heights {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Returns the expected file size for a RAW export of `vertex_count` heights.
pub fn expected_file_size(vertex_count: usize, format: RawFormat) -> u64 {
    let n = vertex_count as u64;
    match format {
        RawFormat::R16LittleEndian | RawFormat::R16BigEndian => n * 2,
        RawFormat::R32Float => n * 4,
    }
}
