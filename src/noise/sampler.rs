//! Weighted multi-wave sampling.

use super::primitive::NoisePrimitive;
use super::wave::WaveField;

/// Samples the wave field at a world-space point.
///
/// Each wave evaluates the primitive at `(x * frequency + seed, z * frequency + seed)`;
/// the results are combined as an amplitude-weighted average.
///
/// The field must have passed [`WaveField::validate`]: a zero amplitude sum
/// yields NaN here. The result is only guaranteed to lie in [0, 1] when the
/// primitive does and the amplitudes are non-negative.
pub fn sample_waves<P: NoisePrimitive + ?Sized>(primitive: &P, x: f32, z: f32, waves: &WaveField) -> f32 {
    let mut noise = 0.0f32;
    let mut normalization = 0.0f32;

    for wave in waves.waves() {
        noise += wave.amplitude
            * primitive.sample(x * wave.frequency + wave.seed, z * wave.frequency + wave.seed);
        normalization += wave.amplitude;
    }

    noise / normalization
}
