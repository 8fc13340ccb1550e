//! Border handling shared by the height field generator and the normal
//! reconstructor.

use serde::{Deserialize, Serialize};

/// How tile edges obtain neighbor heights for gradient computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// The height map carries a one-cell halo sampled from the shared noise
    /// field, so edge normals agree with the neighboring tile.
    #[default]
    Bordered,
    /// No halo; edge vertices fall back to a straight-up normal.
    Clamped,
}

impl BorderPolicy {
    /// Width of the halo ring in cells.
    pub fn halo(self) -> usize {
        match self {
            BorderPolicy::Bordered => 1,
            BorderPolicy::Clamped => 0,
        }
    }

    pub fn has_halo(self) -> bool {
        self.halo() > 0
    }

    /// Flatness constant used by the two reconstruction variants when none is
    /// configured.
    pub fn default_flatness(self) -> f32 {
        match self {
            BorderPolicy::Bordered => 0.2,
            BorderPolicy::Clamped => 0.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BorderPolicy::Bordered => "bordered",
            BorderPolicy::Clamped => "clamped",
        }
    }
}
