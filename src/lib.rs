//! Seamless tiled terrain synthesis.
//!
//! This crate builds a grid of terrain tiles from layered coherent noise.
//! Every tile samples the same world-space wave field, so neighboring tiles
//! agree on heights, colors and (with a bordered height map) normals along
//! their shared edges.

pub mod error;
pub mod noise;
pub mod terrain;
pub mod level;
pub mod export;

pub use error::TerrainError;
pub use noise::{NoiseKind, NoisePrimitive, PerlinPrimitive, SimplexPrimitive, Wave, WaveField};
pub use terrain::{
    BorderPolicy, ColorBuffer, HeightCurve, HeightMap, TerrainPalette, TerrainSettings, TerrainType,
    TileAssembler, TileBuffers,
};
pub use level::{LevelConfig, LevelLayout, Tile};
