//! Level configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TerrainError;
use crate::noise::{NoiseKind, WaveField};
use crate::terrain::{BorderPolicy, CurveKey, HeightCurve, TerrainPalette, TerrainSettings, TerrainType};

/// Errors that can occur while loading or saving a configuration file.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to lay out and generate a level.
///
/// This is the raw, serializable form; [`LevelConfig::settings`] performs
/// validation and produces the checked [`TerrainSettings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Number of tiles along x.
    pub map_width: usize,
    /// Number of tiles along z.
    pub map_depth: usize,
    /// Vertices along one side of a tile mesh.
    pub tile_vertices: usize,
    /// World-space edge length of a tile.
    pub tile_size: f32,
    /// Noise zoom (1-100 typical).
    pub resolution: f32,
    pub max_height: f32,
    pub height_curve: Vec<CurveKey>,
    pub terrain_types: Vec<TerrainType>,
    pub waves: WaveField,
    pub border_policy: BorderPolicy,
    /// Overrides the policy's default flatness constant.
    pub flatness: Option<f32>,
    pub noise: NoiseKind,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            map_width: 3,
            map_depth: 3,
            tile_vertices: 11,
            tile_size: 10.0,
            resolution: 10.0,
            max_height: 3.0,
            height_curve: HeightCurve::lowland().keys().to_vec(),
            terrain_types: TerrainPalette::standard().types().to_vec(),
            waves: WaveField::rolling_hills(),
            border_policy: BorderPolicy::Bordered,
            flatness: None,
            noise: NoiseKind::Perlin,
        }
    }
}

impl LevelConfig {
    /// Larger, smoother map with more water.
    pub fn islands() -> Self {
        Self {
            map_width: 6,
            map_depth: 6,
            tile_vertices: 33,
            tile_size: 32.0,
            resolution: 40.0,
            max_height: 12.0,
            terrain_types: vec![
                TerrainType::new("deep water", 0.35, [20, 60, 140]),
                TerrainType::new("shallow water", 0.5, [45, 110, 190]),
                TerrainType::new("beach", 0.55, [220, 205, 150]),
                TerrainType::new("forest", 0.75, [40, 110, 50]),
                TerrainType::new("peak", 1.0, [150, 140, 130]),
            ],
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json_file(&self, path: &Path) -> Result<(), ConfigLoadError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.tile_vertices * self.tile_vertices
    }

    /// World distance between adjacent vertices of a tile.
    pub fn vertex_spacing(&self) -> f32 {
        self.tile_size / (self.tile_vertices as f32 - 1.0)
    }

    /// Effective flatness constant.
    pub fn flatness(&self) -> f32 {
        self.flatness
            .unwrap_or_else(|| self.border_policy.default_flatness())
    }

    /// Checks the layout and builds the terrain settings.
    ///
    /// Returns the first configuration error found; nothing is generated
    /// from an invalid config.
    pub fn settings(&self) -> Result<TerrainSettings, TerrainError> {
        if self.map_width == 0 || self.map_depth == 0 {
            return Err(TerrainError::config(format!(
                "map must contain at least one tile, got {}x{}",
                self.map_width, self.map_depth
            )));
        }
        if self.tile_vertices < 2 {
            return Err(TerrainError::config(format!(
                "tiles need at least 2 vertices per side, got {}",
                self.tile_vertices
            )));
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(TerrainError::config(format!(
                "tile size must be finite and > 0, got {}",
                self.tile_size
            )));
        }
        self.waves.validate()?;

        let palette = TerrainPalette::new(self.terrain_types.clone())?;
        let curve = HeightCurve::new(self.height_curve.clone())?;
        if !curve.is_monotonic() {
            log::warn!("height curve is not monotonic; terrain bands may invert");
        }

        let total = self.waves.total_amplitude();
        if (total - 1.0).abs() > 1e-3 {
            log::debug!("wave amplitudes sum to {}; they are normalized during sampling", total);
        }

        let settings = TerrainSettings::new(self.resolution, self.max_height, curve, palette, self.border_policy)
            .with_flatness(self.flatness());
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::Wave;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = LevelConfig::default();
        let settings = config.settings().unwrap();
        assert_eq!(settings.border_policy, BorderPolicy::Bordered);
        assert_eq!(settings.flatness, 0.2);
        assert_eq!(config.vertex_spacing(), 1.0);
        assert_eq!(config.vertex_count(), 121);
    }

    #[test]
    fn test_islands_is_valid() {
        assert!(LevelConfig::islands().settings().is_ok());
    }

    #[test]
    fn test_flatness_override() {
        let config = LevelConfig {
            border_policy: BorderPolicy::Clamped,
            ..Default::default()
        };
        assert_eq!(config.flatness(), 0.5);

        let config = LevelConfig {
            flatness: Some(0.35),
            ..config
        };
        assert_eq!(config.settings().unwrap().flatness, 0.35);
    }

    #[test]
    fn test_configuration_errors() {
        let empty_types = LevelConfig {
            terrain_types: vec![],
            ..Default::default()
        };
        assert!(empty_types.settings().unwrap_err().is_configuration());

        let bad_scale = LevelConfig {
            resolution: -2.0,
            ..Default::default()
        };
        assert!(bad_scale.settings().unwrap_err().is_configuration());

        let silent = LevelConfig {
            waves: WaveField::new(vec![Wave::new(1.0, 1.0, 0.0)]),
            ..Default::default()
        };
        assert!(silent.settings().unwrap_err().is_configuration());

        let no_tiles = LevelConfig {
            map_width: 0,
            ..Default::default()
        };
        assert!(no_tiles.settings().is_err());

        let single_vertex = LevelConfig {
            tile_vertices: 1,
            ..Default::default()
        };
        assert!(single_vertex.settings().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LevelConfig::from_json_str(r#"{ "map_width": 5, "border_policy": "clamped" }"#).unwrap();
        assert_eq!(config.map_width, 5);
        assert_eq!(config.map_depth, 3);
        assert_eq!(config.border_policy, BorderPolicy::Clamped);
        assert_eq!(config.waves, WaveField::rolling_hills());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("level.json");

        let config = LevelConfig::islands();
        config.save_json_file(&path).unwrap();
        let loaded = LevelConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LevelConfig::from_json_str("{ not json"),
            Err(ConfigLoadError::Json(_))
        ));
        assert!(matches!(
            LevelConfig::from_json_file(Path::new("/nonexistent/level.json")),
            Err(ConfigLoadError::Io(_))
        ));
    }
}
