//! Vertex normals from height map finite differences.

use glam::Vec3;
use rayon::prelude::*;

use super::border::BorderPolicy;
use super::heightmap::HeightMap;
use crate::error::TerrainError;

/// Normal assigned to flat cells and, under [`BorderPolicy::Clamped`], to
/// edge vertices.
pub const STRAIGHT_UP: Vec3 = Vec3::Y;

/// Turns central differences into a unit normal.
///
/// `flatness` is the vertical component before normalization; larger values
/// flatten the apparent slope.
#[inline]
fn normal_from_gradients(grad_z: f32, grad_x: f32, flatness: f32) -> Vec3 {
    if grad_z == 0.0 && grad_x == 0.0 {
        return STRAIGHT_UP;
    }
    Vec3::new(-grad_z, flatness, -grad_x)
        .try_normalize()
        .unwrap_or(STRAIGHT_UP)
}

#[inline]
fn central_difference_normal(map: &HeightMap, z: usize, x: usize, flatness: f32) -> Vec3 {
    let grad_z = map.get(z + 1, x) - map.get(z - 1, x);
    let grad_x = map.get(z, x + 1) - map.get(z, x - 1);
    normal_from_gradients(grad_z, grad_x, flatness)
}

/// Computes one normal per interior vertex, row-major like the color buffer.
///
/// The height map must carry a halo exactly when `policy` is
/// [`BorderPolicy::Bordered`]; anything else is a shape mismatch.
pub fn reconstruct_normals(
    height_map: &HeightMap,
    policy: BorderPolicy,
    flatness: f32,
) -> Result<Vec<Vec3>, TerrainError> {
    if !flatness.is_finite() || flatness <= 0.0 {
        return Err(TerrainError::config(format!(
            "normal flatness must be finite and > 0, got {}",
            flatness
        )));
    }
    if height_map.has_halo() != policy.has_halo() {
        return Err(TerrainError::shape(format!(
            "{} normals need a height map {} a halo",
            policy.name(),
            if policy.has_halo() { "with" } else { "without" }
        )));
    }

    let depth = height_map.interior_depth();
    let width = height_map.interior_width();
    let mut normals = vec![STRAIGHT_UP; depth * width];

    match policy {
        BorderPolicy::Bordered => {
            normals.par_chunks_mut(width).enumerate().for_each(|(z, row)| {
                for (x, n) in row.iter_mut().enumerate() {
                    *n = central_difference_normal(height_map, z + 1, x + 1, flatness);
                }
            });
        }
        BorderPolicy::Clamped => {
            normals.par_chunks_mut(width).enumerate().for_each(|(z, row)| {
                if z == 0 || z == depth - 1 {
                    return;
                }
                for (x, n) in row.iter_mut().enumerate() {
                    if x == 0 || x == width - 1 {
                        continue;
                    }
                    *n = central_difference_normal(height_map, z, x, flatness);
                }
            });
        }
    }

    Ok(normals)
}
