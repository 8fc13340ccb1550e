//! Export module for saving tile buffers to image and RAW files.
//!
//! Color buffers become RGB textures, vertex heights 16-bit PNG or RAW
//! heightmaps, and normals RGB normal maps.

mod level;
mod normal_map;
mod png;
mod raw;

pub use level::{export_level, tile_file_stem, HeightFormat, LevelExportError, LevelExportOptions};
pub use normal_map::{encode_normal_rgb8, export_normal_map_png, NormalMapError, NormalMapOptions};
pub use png::{export_color_png, export_height_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_heights_raw, RawExportError, RawFormat};
