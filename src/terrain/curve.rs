//! Height remapping curve.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// One control point of a [`HeightCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear remap applied to raw noise heights before they are
/// scaled by the maximum height.
///
/// Evaluation clamps to the first and last key outside their time range.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Builds a curve from keys sorted by strictly increasing time.
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, TerrainError> {
        if keys.is_empty() {
            return Err(TerrainError::config("height curve has no keys"));
        }
        if keys.iter().any(|k| !k.time.is_finite() || !k.value.is_finite()) {
            return Err(TerrainError::config("height curve keys must be finite"));
        }
        if keys.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(TerrainError::config(
                "height curve key times must be strictly increasing",
            ));
        }
        Ok(Self { keys })
    }

    /// `f(t) = t` over [0, 1].
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// Flattens low ground into plains and exaggerates peaks.
    pub fn lowland() -> Self {
        Self {
            keys: vec![
                CurveKey::new(0.0, 0.0),
                CurveKey::new(0.3, 0.02),
                CurveKey::new(0.6, 0.3),
                CurveKey::new(1.0, 1.0),
            ],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// True when values never decrease with time.
    pub fn is_monotonic(&self) -> bool {
        self.keys.windows(2).all(|w| w[1].value >= w[0].value)
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; t lies in (keys[i-1].time, keys[i].time].
        let i = self.keys.partition_point(|k| k.time < t);
        let a = self.keys[i - 1];
        let b = self.keys[i];
        let f = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * f
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl TryFrom<Vec<CurveKey>> for HeightCurve {
    type Error = TerrainError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}
