//! Height-threshold terrain classification and color buffers.

use serde::{Deserialize, Serialize};

use super::heightmap::HeightMap;
use crate::error::TerrainError;

/// A named height band with its preview color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainType {
    pub name: String,
    /// Exclusive upper bound of the band.
    pub height: f32,
    pub color: [u8; 3],
}

impl TerrainType {
    pub fn new(name: impl Into<String>, height: f32, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }
}

/// Non-empty list of terrain types in ascending threshold order.
///
/// The last entry doubles as the catch-all for heights at or above every
/// threshold, so classification never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainPalette {
    types: Vec<TerrainType>,
}

impl TerrainPalette {
    pub fn new(types: Vec<TerrainType>) -> Result<Self, TerrainError> {
        if types.is_empty() {
            return Err(TerrainError::config(
                "terrain type list is empty; classification has no catch-all",
            ));
        }
        if let Some(t) = types.iter().find(|t| t.height.is_nan()) {
            return Err(TerrainError::config(format!(
                "terrain type '{}' has a NaN threshold",
                t.name
            )));
        }
        if let Some(w) = types.windows(2).find(|w| w[1].height < w[0].height) {
            return Err(TerrainError::config(format!(
                "terrain types must be in ascending order: '{}' ({}) follows '{}' ({})",
                w[1].name, w[1].height, w[0].name, w[0].height
            )));
        }
        Ok(Self { types })
    }

    /// Water, sand, grass, rock and snow bands.
    pub fn standard() -> Self {
        Self {
            types: vec![
                TerrainType::new("water", 0.4, [42, 94, 170]),
                TerrainType::new("sand", 0.45, [214, 200, 140]),
                TerrainType::new("grass", 0.6, [74, 140, 60]),
                TerrainType::new("mountain", 0.75, [110, 96, 84]),
                TerrainType::new("snow", 1.0, [240, 244, 250]),
            ],
        }
    }

    pub fn types(&self) -> &[TerrainType] {
        &self.types
    }

    /// Returns the first type whose threshold is strictly above `height`,
    /// or the last type if there is none.
    pub fn classify(&self, height: f32) -> &TerrainType {
        self.types
            .iter()
            .find(|t| height < t.height)
            .unwrap_or(&self.types[self.types.len() - 1])
    }
}

impl TryFrom<Vec<TerrainType>> for TerrainPalette {
    type Error = TerrainError;

    fn try_from(types: Vec<TerrainType>) -> Result<Self, Self::Error> {
        Self::new(types)
    }
}

/// RGB8 pixels for a tile's interior, row-major, `depth` rows of `width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    pub width: usize,
    pub depth: usize,
    pub pixels: Vec<[u8; 3]>,
}

impl ColorBuffer {
    #[inline]
    pub fn get(&self, z: usize, x: usize) -> [u8; 3] {
        self.pixels[z * self.width + x]
    }

    /// Pixels flattened to `RGBRGB...` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_flattened()
    }
}

/// Classifies every interior cell of the height map.
///
/// Halo cells are skipped, so the buffer has the map's interior dimensions.
pub fn colorize(height_map: &HeightMap, palette: &TerrainPalette) -> ColorBuffer {
    let pixels = height_map
        .interior_values()
        .map(|h| palette.classify(h).color)
        .collect();

    ColorBuffer {
        width: height_map.interior_width(),
        depth: height_map.interior_depth(),
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_bands() -> TerrainPalette {
        TerrainPalette::new(vec![
            TerrainType::new("water", 0.3, [0, 0, 255]),
            TerrainType::new("grass", 0.6, [0, 255, 0]),
            TerrainType::new("rock", 1.0, [128, 128, 128]),
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let p = three_bands();
        assert_eq!(p.classify(0.0).name, "water");
        assert_eq!(p.classify(0.3).name, "grass");
        assert_eq!(p.classify(0.6).name, "rock");
        assert_eq!(p.classify(1.5).name, "rock");
    }

    #[test]
    fn test_classify_is_total() {
        let p = three_bands();
        for h in [-10.0, 0.29999, 0.9999, 1.0, 1e9, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let _ = p.classify(h);
        }
        assert_eq!(p.classify(f32::NAN).name, "rock");
        assert_eq!(p.classify(f32::NEG_INFINITY).name, "water");
    }

    #[test]
    fn test_single_type_catches_everything() {
        let p = TerrainPalette::new(vec![TerrainType::new("only", 0.5, [1, 2, 3])]).unwrap();
        assert_eq!(p.classify(0.1).name, "only");
        assert_eq!(p.classify(0.9).name, "only");
    }

    #[test]
    fn test_empty_palette_rejected() {
        let err = TerrainPalette::new(vec![]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_descending_palette_rejected() {
        let err = TerrainPalette::new(vec![
            TerrainType::new("high", 0.9, [0, 0, 0]),
            TerrainType::new("low", 0.1, [0, 0, 0]),
        ])
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_colorize_skips_halo() {
        // 4x4 with halo: interior is the 2x2 block in the middle.
        let cells = vec![
            0.9, 0.9, 0.9, 0.9, //
            0.9, 0.1, 0.4, 0.9, //
            0.9, 0.7, 0.2, 0.9, //
            0.9, 0.9, 0.9, 0.9,
        ];
        let map = HeightMap::from_cells(4, 4, true, cells).unwrap();
        let colors = colorize(&map, &three_bands());

        assert_eq!(colors.width, 2);
        assert_eq!(colors.depth, 2);
        assert_eq!(colors.get(0, 0), [0, 0, 255]);
        assert_eq!(colors.get(0, 1), [0, 255, 0]);
        assert_eq!(colors.get(1, 0), [128, 128, 128]);
        assert_eq!(colors.get(1, 1), [0, 0, 255]);
        assert_eq!(colors.as_bytes().len(), 12);
    }

    #[test]
    fn test_colorize_without_halo_covers_every_cell() {
        let map = HeightMap::flat(3, 5, false, 0.5).unwrap();
        let colors = colorize(&map, &three_bands());
        assert_eq!(colors.pixels.len(), 15);
        assert!(colors.pixels.iter().all(|&c| c == [0, 255, 0]));
    }
}
