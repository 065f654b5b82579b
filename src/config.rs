//! Editor configuration
//!
//! Stored as RON. Every field has a default, so a partial file only
//! overrides what it names. A missing or broken file never stops startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{limits, LayerKind, MapMetadata, TileId, TileRoles, TilesetRef, BOX_TILE, EMPTY_TILE, PLAYER_TILE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tile ids offered per layer, plus the ids with gameplay meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub terrain: Vec<TileId>,
    pub goals: Vec<TileId>,
    pub entities: Vec<TileId>,
    pub player: TileId,
    pub box_tile: TileId,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            terrain: vec![0, 85, 86, 87, 89, 90, 91, 92, 93, 98, 99, 100, 101],
            goals: vec![0, 102, 103, 104, 105, 106],
            entities: vec![EMPTY_TILE, BOX_TILE, PLAYER_TILE],
            player: PLAYER_TILE,
            box_tile: BOX_TILE,
        }
    }
}

impl PaletteConfig {
    pub fn tiles(&self, kind: LayerKind) -> &[TileId] {
        match kind {
            LayerKind::Terrain => &self.terrain,
            LayerKind::Goals => &self.goals,
            LayerKind::Entities => &self.entities,
        }
    }

    pub fn roles(&self) -> TileRoles {
        TileRoles {
            player: self.player,
            box_tile: self.box_tile,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in LayerKind::ALL {
            if self.tiles(kind).first() != Some(&EMPTY_TILE) {
                return Err(ConfigError::Invalid(format!(
                    "{} palette must start with the empty tile",
                    kind.label()
                )));
            }
        }
        if self.player == self.box_tile || self.player == EMPTY_TILE || self.box_tile == EMPTY_TILE {
            return Err(ConfigError::Invalid(
                "player and box tiles must be distinct non-empty ids".to_string(),
            ));
        }
        if !self.entities.contains(&self.player) || !self.entities.contains(&self.box_tile) {
            return Err(ConfigError::Invalid(
                "entities palette must contain the player and box tiles".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tileset image settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesetConfig {
    /// Image path; tiles draw as colored blocks when it cannot be loaded
    pub image: String,
    /// Tiles per row in the image
    pub columns: u32,
    /// Tile edge length in the image, in pixels
    pub source_tile_size: f32,
    /// `source` written into saved documents
    pub document_source: String,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            image: "assets/tileset.png".to_string(),
            columns: 16,
            source_tile_size: 32.0,
            document_source: TilesetRef::default().source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub map_width: usize,
    pub map_height: usize,
    /// Nominal on-screen tile size before scaling
    pub tile_size: f32,
    pub palette_cell: f32,
    pub palette_margin: f32,
    pub tileset: TilesetConfig,
    /// Overrides the platform data directory for saved levels
    pub data_dir: Option<PathBuf>,
    pub palettes: PaletteConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            map_width: 16,
            map_height: 12,
            tile_size: 32.0,
            palette_cell: 40.0,
            palette_margin: 4.0,
            tileset: TilesetConfig::default(),
            data_dir: None,
            palettes: PaletteConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and check a RON config
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from `path` (or the default location), falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = limits::MAX_MAP_SIZE;
        if self.map_width == 0 || self.map_height == 0 || self.map_width > max || self.map_height > max {
            return Err(ConfigError::Invalid(format!(
                "map size {}x{} outside 1..={}",
                self.map_width, self.map_height, max
            )));
        }
        if !(self.tile_size > 0.0 && self.palette_cell > 0.0 && self.palette_margin >= 0.0) {
            return Err(ConfigError::Invalid("tile and palette sizes must be positive".to_string()));
        }
        if self.tileset.columns == 0 {
            return Err(ConfigError::Invalid("tileset needs at least one column".to_string()));
        }
        self.palettes.validate()
    }

    pub fn roles(&self) -> TileRoles {
        self.palettes.roles()
    }

    /// Document metadata for maps saved with this config
    pub fn map_metadata(&self) -> MapMetadata {
        let size = self.tile_size.round().max(1.0) as u32;
        MapMetadata {
            tile_width: size,
            tile_height: size,
            tileset: TilesetRef {
                firstgid: 1,
                source: self.tileset.document_source.clone(),
            },
        }
    }
}

/// `<platform config dir>/pushbox/config.ron`
#[cfg(not(target_arch = "wasm32"))]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pushbox").join("config.ron"))
}

#[cfg(target_arch = "wasm32")]
pub fn default_config_path() -> Option<PathBuf> {
    None
}
