//! Per-tile assembly of heights, colors and normals.

use glam::Vec3;

use super::border::BorderPolicy;
use super::classify::{colorize, ColorBuffer, TerrainPalette};
use super::curve::HeightCurve;
use super::heightmap::{generate_for_policy, HeightMap};
use super::normals::reconstruct_normals;
use crate::error::TerrainError;
use crate::noise::{NoisePrimitive, WaveField};

/// Validated parameters shared by every tile of a level.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSettings {
    /// Noise zoom; larger values give smoother terrain.
    pub scale: f32,
    /// World-space height of a curve output of 1.0.
    pub max_height: f32,
    pub height_curve: HeightCurve,
    pub palette: TerrainPalette,
    pub border_policy: BorderPolicy,
    /// Vertical component of unnormalized normals.
    pub flatness: f32,
}

impl TerrainSettings {
    pub fn new(
        scale: f32,
        max_height: f32,
        height_curve: HeightCurve,
        palette: TerrainPalette,
        border_policy: BorderPolicy,
    ) -> Self {
        Self {
            scale,
            max_height,
            height_curve,
            palette,
            border_policy,
            flatness: border_policy.default_flatness(),
        }
    }

    pub fn with_flatness(mut self, flatness: f32) -> Self {
        self.flatness = flatness;
        self
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TerrainError::config(format!(
                "noise scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        if !self.max_height.is_finite() {
            return Err(TerrainError::config(format!(
                "max height must be finite, got {}",
                self.max_height
            )));
        }
        if !self.flatness.is_finite() || self.flatness <= 0.0 {
            return Err(TerrainError::config(format!(
                "normal flatness must be finite and > 0, got {}",
                self.flatness
            )));
        }
        Ok(())
    }
}

/// Everything a renderer needs to refresh one tile.
///
/// All three buffers are `side * side` long and share the same row-major
/// vertex order (z outer, x inner).
#[derive(Debug, Clone, PartialEq)]
pub struct TileBuffers {
    pub side: usize,
    /// Vertex Y coordinates after the height curve and `max_height`.
    pub heights: Vec<f32>,
    pub colors: ColorBuffer,
    pub normals: Vec<Vec3>,
}

impl TileBuffers {
    pub fn vertex_count(&self) -> usize {
        self.side * self.side
    }

    /// Full vertex positions relative to the tile's first vertex, on a
    /// regular grid `spacing` world units apart.
    ///
    /// Adding the tile's world position gives world coordinates; neighbors
    /// then share their edge vertices exactly.
    pub fn vertex_positions(&self, spacing: f32) -> Vec<Vec3> {
        self.heights
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let x = (i % self.side) as f32;
                let z = (i / self.side) as f32;
                Vec3::new(x * spacing, y, z * spacing)
            })
            .collect()
    }

    /// Min and max vertex height.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

/// Side length of a square vertex grid.
///
/// Fails unless `vertex_count` is a non-zero perfect square.
pub fn grid_side(vertex_count: usize) -> Result<usize, TerrainError> {
    let mismatch = || {
        TerrainError::shape(format!(
            "vertex count {} is not a non-empty square grid",
            vertex_count
        ))
    };
    if vertex_count == 0 {
        return Err(mismatch());
    }

    let square = |side: usize| side.checked_mul(side);
    let mut side = (vertex_count as f64).sqrt() as usize;
    // Correct float rounding on very large counts.
    while square(side).map_or(true, |sq| sq > vertex_count) {
        side -= 1;
    }
    while square(side + 1).is_some_and(|sq| sq <= vertex_count) {
        side += 1;
    }

    if square(side) != Some(vertex_count) {
        return Err(mismatch());
    }
    Ok(side)
}

/// Produces tile buffers from shared, read-only inputs.
///
/// Construction validates the settings and wave field once, so every
/// `assemble` call of a pass sees the same checked configuration.
pub struct TileAssembler<'a, P: NoisePrimitive + ?Sized> {
    settings: &'a TerrainSettings,
    waves: &'a WaveField,
    primitive: &'a P,
}

impl<'a, P: NoisePrimitive + ?Sized> TileAssembler<'a, P> {
    pub fn new(settings: &'a TerrainSettings, waves: &'a WaveField, primitive: &'a P) -> Result<Self, TerrainError> {
        settings.validate()?;
        waves.validate()?;
        Ok(Self {
            settings,
            waves,
            primitive,
        })
    }

    pub fn settings(&self) -> &TerrainSettings {
        self.settings
    }

    /// Generates the raw height map for a tile whose first vertex samples
    /// grid column `x_offset` and row `z_offset`.
    pub fn height_map(&self, side: usize, x_offset: f32, z_offset: f32) -> Result<HeightMap, TerrainError> {
        generate_for_policy(
            self.primitive,
            side,
            self.settings.scale,
            x_offset,
            z_offset,
            self.waves,
            self.settings.border_policy,
        )
    }

    /// Builds the buffers for a tile with `vertex_count` vertices.
    pub fn assemble(&self, x_offset: f32, z_offset: f32, vertex_count: usize) -> Result<TileBuffers, TerrainError> {
        let side = grid_side(vertex_count)?;
        let map = self.height_map(side, x_offset, z_offset)?;

        if map.interior_depth() != side || map.interior_width() != side {
            return Err(TerrainError::shape(format!(
                "height map interior {}x{} does not match {} vertices",
                map.interior_depth(),
                map.interior_width(),
                vertex_count
            )));
        }

        let curve = &self.settings.height_curve;
        let max_height = self.settings.max_height;
        let heights: Vec<f32> = map
            .interior_values()
            .map(|h| curve.evaluate(h) * max_height)
            .collect();

        let colors = colorize(&map, &self.settings.palette);
        let normals = reconstruct_normals(&map, self.settings.border_policy, self.settings.flatness)?;

        log::debug!(
            "assembled {}x{} tile at ({}, {}), height range {:?}",
            side,
            side,
            x_offset,
            z_offset,
            map.height_range()
        );

        Ok(TileBuffers {
            side,
            heights,
            colors,
            normals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{PerlinPrimitive, Wave};
    use crate::terrain::classify::TerrainType;
    use crate::terrain::normals::STRAIGHT_UP;

    fn settings(policy: BorderPolicy) -> TerrainSettings {
        TerrainSettings::new(
            8.0,
            10.0,
            HeightCurve::linear(),
            TerrainPalette::standard(),
            policy,
        )
    }

    #[test]
    fn test_grid_side() {
        assert_eq!(grid_side(1).unwrap(), 1);
        assert_eq!(grid_side(121).unwrap(), 11);
        assert_eq!(grid_side(256 * 256).unwrap(), 256);
        assert!(grid_side(0).unwrap_err().is_shape_mismatch());
        assert!(grid_side(120).unwrap_err().is_shape_mismatch());
        assert!(grid_side(122).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_grid_side_huge_counts() {
        assert!(grid_side(usize::MAX).unwrap_err().is_shape_mismatch());
        assert!(grid_side(usize::MAX - 1).unwrap_err().is_shape_mismatch());
        assert_eq!(grid_side(46_340 * 46_340).unwrap(), 46_340);
        assert!(grid_side(46_340 * 46_340 + 1).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_buffers_are_aligned() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        for policy in [BorderPolicy::Bordered, BorderPolicy::Clamped] {
            let s = settings(policy);
            let assembler = TileAssembler::new(&s, &waves, &p).unwrap();
            let tile = assembler.assemble(0.0, 0.0, 121).unwrap();

            assert_eq!(tile.side, 11);
            assert_eq!(tile.heights.len(), 121);
            assert_eq!(tile.normals.len(), 121);
            assert_eq!(tile.colors.pixels.len(), 121);
            assert_eq!(tile.colors.width, 11);
        }
    }

    #[test]
    fn test_heights_follow_curve_and_max_height() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        let s = settings(BorderPolicy::Bordered);
        let assembler = TileAssembler::new(&s, &waves, &p).unwrap();

        let map = assembler.height_map(5, 3.0, 4.0).unwrap();
        let tile = assembler.assemble(3.0, 4.0, 25).unwrap();

        for (raw, &y) in map.interior_values().zip(&tile.heights) {
            assert_eq!(y, raw * 10.0);
        }
    }

    #[test]
    fn test_constant_curve_flattens_everything() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        let curve = HeightCurve::new(vec![crate::terrain::CurveKey::new(0.0, 0.5)]).unwrap();
        let s = TerrainSettings::new(8.0, 4.0, curve, TerrainPalette::standard(), BorderPolicy::Bordered);
        let tile = TileAssembler::new(&s, &waves, &p).unwrap().assemble(0.0, 0.0, 16).unwrap();
        assert!(tile.heights.iter().all(|&h| h == 2.0));
        // Normals come from raw heights, not remapped ones.
        assert!(tile.normals.iter().any(|&n| n != STRAIGHT_UP));
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        let s = settings(BorderPolicy::Bordered);
        let assembler = TileAssembler::new(&s, &waves, &p).unwrap();
        let a = assembler.assemble(20.0, -10.0, 64).unwrap();
        let b = assembler.assemble(20.0, -10.0, 64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_configuration_rejected_up_front() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();

        let mut bad_scale = settings(BorderPolicy::Bordered);
        bad_scale.scale = 0.0;
        assert!(TileAssembler::new(&bad_scale, &waves, &p).is_err());

        let zero = WaveField::new(vec![Wave::new(0.0, 1.0, 0.0)]);
        let s = settings(BorderPolicy::Bordered);
        let err = TileAssembler::new(&s, &zero, &p).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_non_square_vertex_count() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        let s = settings(BorderPolicy::Clamped);
        let assembler = TileAssembler::new(&s, &waves, &p).unwrap();
        assert!(assembler.assemble(0.0, 0.0, 10).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_colors_use_palette() {
        let p = PerlinPrimitive::new();
        let waves = WaveField::rolling_hills();
        let palette = TerrainPalette::new(vec![TerrainType::new("all", 2.0, [9, 9, 9])]).unwrap();
        let s = TerrainSettings::new(8.0, 1.0, HeightCurve::linear(), palette, BorderPolicy::Bordered);
        let tile = TileAssembler::new(&s, &waves, &p).unwrap().assemble(0.0, 0.0, 9).unwrap();
        assert!(tile.colors.pixels.iter().all(|&c| c == [9, 9, 9]));
    }

    #[test]
    fn test_vertex_positions_start_at_first_vertex() {
        let buffers = TileBuffers {
            side: 3,
            heights: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            colors: ColorBuffer {
                width: 3,
                depth: 3,
                pixels: vec![[0, 0, 0]; 9],
            },
            normals: vec![STRAIGHT_UP; 9],
        };
        let positions = buffers.vertex_positions(5.0);
        assert_eq!(positions[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(positions[4], Vec3::new(5.0, 4.0, 5.0));
        assert_eq!(positions[5], Vec3::new(10.0, 5.0, 5.0));
        assert_eq!(positions[8], Vec3::new(10.0, 8.0, 10.0));
        assert_eq!(buffers.height_range(), (0.0, 8.0));
    }
}
