//! Layered coherent noise for terrain synthesis.
//!
//! A [`WaveField`] stacks several layers of a [`NoisePrimitive`]; the sampler
//! combines them into one normalized height value per world-space point.

mod primitive;
mod sampler;
mod wave;

pub use primitive::{NoiseKind, NoisePrimitive, PerlinPrimitive, SimplexPrimitive};
pub use sampler::sample_waves;
pub use wave::{Wave, WaveField, SEED_RANGE};
