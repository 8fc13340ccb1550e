//! Coherent 2D noise primitives.
//!
//! A primitive maps a point on the noise plane to a value in [0, 1]. The wave
//! sampler only relies on that bound to keep its weighted average in range.

use noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

/// A coherent noise function over the plane.
pub trait NoisePrimitive: Send + Sync {
    /// Evaluates the noise at `(x, z)`. Implementations in this crate return
    /// values in [0, 1].
    fn sample(&self, x: f32, z: f32) -> f32;
}

impl<P: NoisePrimitive + ?Sized> NoisePrimitive for &P {
    fn sample(&self, x: f32, z: f32) -> f32 {
        (**self).sample(x, z)
    }
}

impl<P: NoisePrimitive + ?Sized> NoisePrimitive for Box<P> {
    fn sample(&self, x: f32, z: f32) -> f32 {
        (**self).sample(x, z)
    }
}

/// Classic gradient noise remapped to [0, 1].
///
/// The permutation table is fixed; variation between passes comes from the
/// wave seeds, which translate the sample point instead.
#[derive(Debug, Clone, Copy)]
pub struct PerlinPrimitive {
    perlin: Perlin,
}

impl PerlinPrimitive {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(0),
        }
    }
}

impl Default for PerlinPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl NoisePrimitive for PerlinPrimitive {
    fn sample(&self, x: f32, z: f32) -> f32 {
        let v = self.perlin.get([x as f64, z as f64]) as f32;
        (v * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// OpenSimplex noise remapped to [0, 1].
///
/// Unlike [`PerlinPrimitive`] the permutation table is seeded, so two
/// primitives with different seeds give unrelated terrain for the same waves.
#[derive(Debug, Clone)]
pub struct SimplexPrimitive {
    seed: u32,
    simplex: OpenSimplex,
}

impl SimplexPrimitive {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: OpenSimplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoisePrimitive for SimplexPrimitive {
    fn sample(&self, x: f32, z: f32) -> f32 {
        let v = self.simplex.get([x as f64, z as f64]) as f32;
        (v * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Serializable choice of primitive for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex {
        seed: u32,
    },
}

impl NoiseKind {
    /// Instantiates the configured primitive.
    pub fn build(self) -> Box<dyn NoisePrimitive> {
        match self {
            NoiseKind::Perlin => Box::new(PerlinPrimitive::new()),
            NoiseKind::Simplex { seed } => Box::new(SimplexPrimitive::new(seed)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::Perlin => "perlin",
            NoiseKind::Simplex { .. } => "simplex",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> impl Iterator<Item = (f32, f32)> {
        (0..40).flat_map(|i| (0..40).map(move |j| (i as f32 * 0.37 - 3.0, j as f32 * 0.53 + 100.0)))
    }

    #[test]
    fn test_perlin_bounded() {
        let p = PerlinPrimitive::new();
        for (x, z) in grid_points() {
            let v = p.sample(x, z);
            assert!((0.0..=1.0).contains(&v), "perlin {} at ({}, {})", v, x, z);
        }
    }

    #[test]
    fn test_perlin_is_coherent() {
        let p = PerlinPrimitive::new();
        let a = p.sample(10.25, 3.5);
        let b = p.sample(10.2501, 3.5);
        assert!((a - b).abs() < 1e-2);
    }

    #[test]
    fn test_perlin_varies() {
        let p = PerlinPrimitive::new();
        let values: Vec<f32> = grid_points().map(|(x, z)| p.sample(x, z)).collect();
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max - min > 0.1, "perlin output should vary, got [{}, {}]", min, max);
    }

    #[test]
    fn test_simplex_bounded_and_deterministic() {
        let p = SimplexPrimitive::new(1234);
        for (x, z) in grid_points().take(200) {
            let v = p.sample(x, z);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, p.sample(x, z));
        }
    }

    #[test]
    fn test_simplex_varies() {
        let p = SimplexPrimitive::new(1234);
        let values: Vec<f32> = grid_points().map(|(x, z)| p.sample(x, z)).collect();
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max - min > 0.1, "simplex output should vary, got [{}, {}]", min, max);
    }

    #[test]
    fn test_simplex_seed_changes_field() {
        let a = SimplexPrimitive::new(1);
        let b = SimplexPrimitive::new(2);
        assert!(grid_points().any(|(x, z)| a.sample(x, z) != b.sample(x, z)));
    }

    #[test]
    fn test_noise_kind_build() {
        let perlin = NoiseKind::Perlin.build();
        assert_eq!(perlin.sample(0.3, 0.7), PerlinPrimitive::new().sample(0.3, 0.7));

        let simplex = NoiseKind::Simplex { seed: 5 }.build();
        assert_eq!(simplex.sample(1.5, 2.5), SimplexPrimitive::new(5).sample(1.5, 2.5));
    }

    #[test]
    fn test_noise_kind_serde() {
        let json = serde_json::to_string(&NoiseKind::Simplex { seed: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"simplex","seed":3}"#);
        let back: NoiseKind = serde_json::from_str(r#"{"kind":"perlin"}"#).unwrap();
        assert_eq!(back, NoiseKind::Perlin);
    }
}
