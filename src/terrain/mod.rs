//! Tile terrain synthesis.
//!
//! Height maps are sampled from the shared wave field, then turned into the
//! three per-tile buffers: remapped vertex heights, a terrain color buffer and
//! vertex normals.

mod border;
mod classify;
mod curve;
mod heightmap;
mod normals;
mod tile;

pub use border::BorderPolicy;
pub use classify::{colorize, ColorBuffer, TerrainPalette, TerrainType};
pub use curve::{CurveKey, HeightCurve};
pub use heightmap::{generate_for_policy, generate_height_map, HeightMap};
pub use normals::{reconstruct_normals, STRAIGHT_UP};
pub use tile::{grid_side, TerrainSettings, TileAssembler, TileBuffers};
