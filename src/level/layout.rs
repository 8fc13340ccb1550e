//! Tile grid layout and regeneration passes.

use glam::Vec3;
use rand::Rng;
use rayon::prelude::*;

use super::config::LevelConfig;
use crate::error::TerrainError;
use crate::noise::{NoisePrimitive, WaveField};
use crate::terrain::{TerrainSettings, TileAssembler, TileBuffers};

/// One mesh patch of the level.
#[derive(Debug, Clone)]
pub struct Tile {
    grid_x: usize,
    grid_z: usize,
    position: Vec3,
    buffers: Option<TileBuffers>,
}

impl Tile {
    fn new(grid_x: usize, grid_z: usize, position: Vec3) -> Self {
        Self {
            grid_x,
            grid_z,
            position,
            buffers: None,
        }
    }

    /// Grid coordinate `(x, z)` within the level.
    pub fn grid(&self) -> (usize, usize) {
        (self.grid_x, self.grid_z)
    }

    /// World position of the tile's first vertex.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Buffers of the last successful pass, if any.
    pub fn buffers(&self) -> Option<&TileBuffers> {
        self.buffers.as_ref()
    }

    /// Noise grid offsets for this tile.
    pub fn sample_offsets(&self, vertex_spacing: f32) -> (f32, f32) {
        (self.position.x / vertex_spacing, self.position.z / vertex_spacing)
    }
}

/// Summary of a finished pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassStats {
    pub pass: u64,
    pub tiles: usize,
    pub min_height: f32,
    pub max_height: f32,
}

/// Grid of tiles sharing one wave field and one set of terrain settings.
///
/// Tiles are stored in an arena indexed by grid coordinate, x-major.
pub struct LevelLayout {
    config: LevelConfig,
    settings: TerrainSettings,
    waves: WaveField,
    primitive: Box<dyn NoisePrimitive>,
    origin: Vec3,
    tiles: Vec<Tile>,
    passes: u64,
}

impl LevelLayout {
    /// Validates the configuration and places tiles at the world origin.
    pub fn new(config: LevelConfig) -> Result<Self, TerrainError> {
        Self::with_origin(config, Vec3::ZERO)
    }

    /// Validates the configuration and places tile `(i, j)` at
    /// `origin + (i * tile_size, 0, j * tile_size)`.
    pub fn with_origin(config: LevelConfig, origin: Vec3) -> Result<Self, TerrainError> {
        let settings = config.settings()?;
        let primitive = config.noise.build();
        let waves = config.waves.clone();

        let mut tiles = Vec::with_capacity(config.map_width * config.map_depth);
        for x in 0..config.map_width {
            for z in 0..config.map_depth {
                let position = origin + Vec3::new(x as f32 * config.tile_size, 0.0, z as f32 * config.tile_size);
                tiles.push(Tile::new(x, z, position));
            }
        }

        log::info!(
            "laid out {}x{} tiles of {}x{} vertices ({} noise, {} borders)",
            config.map_width,
            config.map_depth,
            config.tile_vertices,
            config.tile_vertices,
            config.noise.name(),
            config.border_policy.name()
        );

        Ok(Self {
            config,
            settings,
            waves,
            primitive,
            origin,
            tiles,
            passes: 0,
        })
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Wave field the next pass starts from; after a successful pass these
    /// are the seeds every tile was generated with.
    pub fn waves(&self) -> &WaveField {
        &self.waves
    }

    /// Replaces the wave field used by the next pass.
    ///
    /// The field is validated when that pass starts; an invalid field makes
    /// the pass fail without touching any tile.
    pub fn set_waves(&mut self, waves: WaveField) {
        self.waves = waves;
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, grid_x: usize, grid_z: usize) -> Option<&Tile> {
        if grid_x >= self.config.map_width || grid_z >= self.config.map_depth {
            return None;
        }
        self.tiles.get(grid_x * self.config.map_depth + grid_z)
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Regenerates every tile with the current seeds.
    pub fn generate(&mut self) -> Result<PassStats, TerrainError> {
        let waves = self.waves.clone();
        self.run_pass(waves)
    }

    /// Draws fresh seeds for every wave, then regenerates every tile.
    ///
    /// Seeds are fixed before any tile is dispatched and shared by all of
    /// them. If the pass fails, neither the seeds nor any tile change.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> Result<PassStats, TerrainError> {
        let mut waves = self.waves.clone();
        waves.randomize_seeds(rng);
        self.run_pass(waves)
    }

    fn run_pass(&mut self, waves: WaveField) -> Result<PassStats, TerrainError> {
        let vertex_count = self.config.vertex_count();
        let spacing = self.config.vertex_spacing();

        let assembler = TileAssembler::new(&self.settings, &waves, self.primitive.as_ref())?;

        // Build every tile before touching any of them.
        let generated: Vec<TileBuffers> = self
            .tiles
            .par_iter()
            .map(|tile| {
                let (x_offset, z_offset) = tile.sample_offsets(spacing);
                assembler.assemble(x_offset, z_offset, vertex_count)
            })
            .collect::<Result<_, _>>()?;

        let (min_height, max_height) = generated
            .iter()
            .map(TileBuffers::height_range)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));

        for (tile, buffers) in self.tiles.iter_mut().zip(generated) {
            tile.buffers = Some(buffers);
        }
        self.waves = waves;
        self.passes += 1;

        let stats = PassStats {
            pass: self.passes,
            tiles: self.tiles.len(),
            min_height,
            max_height,
        };
        log::info!(
            "pass {} generated {} tiles, height range [{:.3}, {:.3}]",
            stats.pass,
            stats.tiles,
            stats.min_height,
            stats.max_height
        );
        Ok(stats)
    }
}
