//! Height map storage and generation from the wave field.

use rayon::prelude::*;

use super::border::BorderPolicy;
use crate::error::TerrainError;
use crate::noise::{sample_waves, NoisePrimitive, WaveField};

/// Row-major grid of normalized heights, `depth` rows of `width` cells.
///
/// When `halo` is set the outermost ring exists only for neighbor lookups;
/// the interior is `(depth - 2) x (width - 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    depth: usize,
    width: usize,
    halo: bool,
    cells: Vec<f32>,
}

impl HeightMap {
    /// Wraps existing cell data, checking its length against the shape.
    pub fn from_cells(depth: usize, width: usize, halo: bool, cells: Vec<f32>) -> Result<Self, TerrainError> {
        if cells.len() != depth * width {
            return Err(TerrainError::shape(format!(
                "height map of {}x{} needs {} cells, got {}",
                depth,
                width,
                depth * width,
                cells.len()
            )));
        }
        let min_side = if halo { 3 } else { 1 };
        if depth < min_side || width < min_side {
            return Err(TerrainError::shape(format!(
                "height map of {}x{} is too small (halo: {})",
                depth, width, halo
            )));
        }
        Ok(Self {
            depth,
            width,
            halo,
            cells,
        })
    }

    /// A map with every cell set to `value`.
    pub fn flat(depth: usize, width: usize, halo: bool, value: f32) -> Result<Self, TerrainError> {
        Self::from_cells(depth, width, halo, vec![value; depth * width])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn has_halo(&self) -> bool {
        self.halo
    }

    fn halo_width(&self) -> usize {
        if self.halo {
            1
        } else {
            0
        }
    }

    pub fn interior_depth(&self) -> usize {
        self.depth - 2 * self.halo_width()
    }

    pub fn interior_width(&self) -> usize {
        self.width - 2 * self.halo_width()
    }

    /// Raw access including halo cells.
    #[inline]
    pub fn get(&self, z: usize, x: usize) -> f32 {
        debug_assert!(z < self.depth && x < self.width);
        self.cells[z * self.width + x]
    }

    /// Access in interior coordinates; `(0, 0)` is the first non-halo cell.
    #[inline]
    pub fn interior(&self, z: usize, x: usize) -> f32 {
        let h = self.halo_width();
        self.get(z + h, x + h)
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Interior cells in row-major order.
    pub fn interior_values(&self) -> impl Iterator<Item = f32> + '_ {
        let h = self.halo_width();
        let width = self.width;
        (h..self.depth - h).flat_map(move |z| {
            let row = &self.cells[z * width..(z + 1) * width];
            row[h..width - h].iter().copied()
        })
    }

    /// Min and max over interior cells.
    pub fn height_range(&self) -> (f32, f32) {
        self.interior_values()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

/// Samples the wave field over a `depth x width` grid.
///
/// Cell `(z, x)` is sampled at `((x + x_offset) / scale, (z + z_offset) / scale)`.
/// The generator does not interpret borders: it fills exactly the grid it is
/// asked for and returns it without a halo.
pub fn generate_height_map<P: NoisePrimitive + ?Sized>(
    primitive: &P,
    depth: usize,
    width: usize,
    scale: f32,
    x_offset: f32,
    z_offset: f32,
    waves: &WaveField,
) -> Result<HeightMap, TerrainError> {
    let cells = sample_grid(primitive, depth, width, scale, x_offset, z_offset, waves)?;
    HeightMap::from_cells(depth, width, false, cells)
}

/// Samples the `side x side` interior of a tile, plus the halo the policy
/// asks for.
///
/// A bordered request grows the grid by one cell on every side and shifts
/// both offsets by one, so interior cell `(0, 0)` still lands on
/// `(x_offset, z_offset)`.
pub fn generate_for_policy<P: NoisePrimitive + ?Sized>(
    primitive: &P,
    side: usize,
    scale: f32,
    x_offset: f32,
    z_offset: f32,
    waves: &WaveField,
    policy: BorderPolicy,
) -> Result<HeightMap, TerrainError> {
    let halo = policy.halo();
    let grid = side + 2 * halo;
    let shift = halo as f32;
    let cells = sample_grid(primitive, grid, grid, scale, x_offset - shift, z_offset - shift, waves)?;
    HeightMap::from_cells(grid, grid, policy.has_halo(), cells)
}

fn sample_grid<P: NoisePrimitive + ?Sized>(
    primitive: &P,
    depth: usize,
    width: usize,
    scale: f32,
    x_offset: f32,
    z_offset: f32,
    waves: &WaveField,
) -> Result<Vec<f32>, TerrainError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(TerrainError::config(format!(
            "noise scale must be finite and > 0, got {}",
            scale
        )));
    }
    waves.validate()?;
    if depth == 0 || width == 0 {
        return Err(TerrainError::shape(format!("cannot sample an empty {}x{} grid", depth, width)));
    }

    let mut cells = vec![0.0f32; depth * width];

    // Rows are independent; each sample depends only on its own coordinates.
    cells.par_chunks_mut(width).enumerate().for_each(|(z, row)| {
        let z_sample = (z as f32 + z_offset) / scale;
        for (x, cell) in row.iter_mut().enumerate() {
            let x_sample = (x as f32 + x_offset) / scale;
            *cell = sample_waves(primitive, x_sample, z_sample, waves);
        }
    });

    Ok(cells)
}
