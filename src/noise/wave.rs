//! Noise layers and the wave field they form.

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Range that regeneration draws fresh wave seeds from.
pub const SEED_RANGE: Range<f32> = 1.0..10_000.0;

/// A single noise layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Offset added to both sample coordinates; changing it moves the layer
    /// to an unrelated region of the noise plane.
    pub seed: f32,
    /// Coordinate multiplier (higher = busier layer).
    pub frequency: f32,
    /// Weight of this layer in the combined signal. Must be >= 0.
    pub amplitude: f32,
}

impl Wave {
    pub fn new(seed: f32, frequency: f32, amplitude: f32) -> Self {
        Self {
            seed,
            frequency,
            amplitude,
        }
    }
}

/// Ordered collection of noise layers shared by every tile of a pass.
///
/// The sum over layers is commutative, but iteration order is fixed so that
/// results are bit-for-bit reproducible for a given set of seeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveField {
    waves: Vec<Wave>,
}

impl WaveField {
    pub fn new(waves: Vec<Wave>) -> Self {
        Self { waves }
    }

    /// Three layers at doubling frequencies with convex weights.
    pub fn rolling_hills() -> Self {
        Self::new(vec![
            Wave::new(56.0, 0.5, 0.6),
            Wave::new(199.36, 1.0, 0.3),
            Wave::new(8012.5, 2.0, 0.1),
        ])
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Sum of all layer amplitudes; the sampler's normalization factor.
    pub fn total_amplitude(&self) -> f32 {
        self.waves.iter().map(|w| w.amplitude).sum()
    }

    /// Checks that the field can be sampled without dividing by zero.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.waves.is_empty() {
            return Err(TerrainError::config("wave field has no waves"));
        }
        for (i, wave) in self.waves.iter().enumerate() {
            if !wave.amplitude.is_finite() || wave.amplitude < 0.0 {
                return Err(TerrainError::config(format!(
                    "wave {} has invalid amplitude {} (must be finite and >= 0)",
                    i, wave.amplitude
                )));
            }
            if !wave.frequency.is_finite() || !wave.seed.is_finite() {
                return Err(TerrainError::config(format!(
                    "wave {} has non-finite frequency or seed",
                    i
                )));
            }
        }
        let total = self.total_amplitude();
        if total <= 0.0 {
            return Err(TerrainError::config(
                "total wave amplitude is zero; noise cannot be normalized",
            ));
        }
        Ok(())
    }

    /// Draws a new seed for every wave from [`SEED_RANGE`].
    ///
    /// Must complete before any tile of the pass is generated.
    pub fn randomize_seeds<R: Rng>(&mut self, rng: &mut R) {
        for wave in &mut self.waves {
            wave.seed = rng.random_range(SEED_RANGE);
        }
    }
}

impl From<Vec<Wave>> for WaveField {
    fn from(waves: Vec<Wave>) -> Self {
        Self::new(waves)
    }
}
