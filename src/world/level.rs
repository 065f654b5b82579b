//! Level document loading and saving
//!
//! Maps are stored in the Tiled JSON map format so they stay editable in
//! external tools. The document is a plain serde mirror of that schema;
//! `TileMap` is only built from it after validation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LayerKind, TileId, TileMap};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum grid dimension (width or height) in cells
    pub const MAX_MAP_SIZE: usize = 256;
    /// Maximum string length for names and tileset sources
    pub const MAX_STRING_LEN: usize = 256;
}

/// Tiled format version written into documents
pub const MAP_FORMAT_VERSION: &str = "1.10";
pub const ORIENTATION: &str = "orthogonal";
pub const RENDER_ORDER: &str = "right-down";
const MAP_TYPE: &str = "map";
const TILE_LAYER_TYPE: &str = "tilelayer";

/// Error type for level documents
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimension { width: usize, height: usize },
    #[error("map too large: {width}x{height} (max {max})")]
    TooLarge { width: usize, height: usize, max: usize },
    #[error("missing layer '{0}'")]
    MissingLayer(&'static str),
    #[error("layer '{name}' has {actual} cells, expected {expected}")]
    LayerSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("layer '{name}' is {width}x{height} but the map is {map_width}x{map_height}")]
    LayerDimensionMismatch {
        name: String,
        width: usize,
        height: usize,
        map_width: usize,
        map_height: usize,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference to an external tileset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetRef {
    pub firstgid: TileId,
    pub source: String,
}

impl Default for TilesetRef {
    fn default() -> Self {
        Self {
            firstgid: 1,
            source: "tileset.tsx".to_string(),
        }
    }
}

/// One tile layer in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<TileId>,
    pub opacity: f64,
    pub visible: bool,
    pub width: usize,
    pub height: usize,
    pub x: i32,
    pub y: i32,
}

/// A complete map document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub width: usize,
    pub height: usize,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub orientation: String,
    pub renderorder: String,
    #[serde(default)]
    pub infinite: bool,
    pub layers: Vec<LayerDocument>,
    pub tilesets: Vec<TilesetRef>,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
}

/// Document metadata that the grid itself does not carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMetadata {
    pub tile_width: u32,
    pub tile_height: u32,
    pub tileset: TilesetRef,
}

impl Default for MapMetadata {
    fn default() -> Self {
        Self {
            tile_width: 32,
            tile_height: 32,
            tileset: TilesetRef::default(),
        }
    }
}

impl MapDocument {
    /// Build the document form of a map
    pub fn from_map(map: &TileMap, meta: &MapMetadata) -> Self {
        let layers = map
            .layers()
            .iter()
            .map(|layer| LayerDocument {
                id: layer.kind.document_id(),
                name: layer.kind.document_name().to_string(),
                kind: TILE_LAYER_TYPE.to_string(),
                data: layer.data().to_vec(),
                opacity: 1.0,
                visible: true,
                width: map.width(),
                height: map.height(),
                x: 0,
                y: 0,
            })
            .collect();

        Self {
            width: map.width(),
            height: map.height(),
            tilewidth: meta.tile_width,
            tileheight: meta.tile_height,
            orientation: ORIENTATION.to_string(),
            renderorder: RENDER_ORDER.to_string(),
            infinite: false,
            layers,
            tilesets: vec![meta.tileset.clone()],
            kind: MAP_TYPE.to_string(),
            version: MAP_FORMAT_VERSION.to_string(),
        }
    }

    /// Validate the document and build the grid from it
    pub fn to_tile_map(&self) -> Result<TileMap, MapError> {
        validate_document(self)?;
        let data = LayerKind::ALL.map(|kind| {
            self.find_layer(kind)
                .map(|layer| layer.data.clone())
                .unwrap_or_default()
        });
        TileMap::from_layers(self.width, self.height, data)
    }

    fn find_layer(&self, kind: LayerKind) -> Option<&LayerDocument> {
        self.layers
            .iter()
            .find(|l| LayerKind::from_document_name(&l.name) == Some(kind))
    }
}

/// Validate a layer against the map dimensions
fn validate_layer(layer: &LayerDocument, doc: &MapDocument) -> Result<(), MapError> {
    if layer.name.len() > limits::MAX_STRING_LEN {
        return Err(MapError::Validation(format!(
            "layer name too long ({} > {})",
            layer.name.len(),
            limits::MAX_STRING_LEN
        )));
    }
    if layer.kind != TILE_LAYER_TYPE {
        return Err(MapError::Validation(format!(
            "layer '{}' has unsupported type '{}'",
            layer.name, layer.kind
        )));
    }
    if layer.width != doc.width || layer.height != doc.height {
        return Err(MapError::LayerDimensionMismatch {
            name: layer.name.clone(),
            width: layer.width,
            height: layer.height,
            map_width: doc.width,
            map_height: doc.height,
        });
    }
    let expected = doc.width * doc.height;
    if layer.data.len() != expected {
        return Err(MapError::LayerSizeMismatch {
            name: layer.name.clone(),
            expected,
            actual: layer.data.len(),
        });
    }
    Ok(())
}

/// Validate an entire document
pub fn validate_document(doc: &MapDocument) -> Result<(), MapError> {
    if doc.width == 0 || doc.height == 0 {
        return Err(MapError::InvalidDimension {
            width: doc.width,
            height: doc.height,
        });
    }
    if doc.width > limits::MAX_MAP_SIZE || doc.height > limits::MAX_MAP_SIZE {
        return Err(MapError::TooLarge {
            width: doc.width,
            height: doc.height,
            max: limits::MAX_MAP_SIZE,
        });
    }
    for tileset in &doc.tilesets {
        if tileset.source.len() > limits::MAX_STRING_LEN {
            return Err(MapError::Validation(format!(
                "tileset source too long ({} > {})",
                tileset.source.len(),
                limits::MAX_STRING_LEN
            )));
        }
    }

    // Every role must be present exactly once; extra layers are ignored
    for kind in LayerKind::ALL {
        let name = kind.document_name();
        let mut matching = doc
            .layers
            .iter()
            .filter(|l| LayerKind::from_document_name(&l.name) == Some(kind));
        let layer = matching.next().ok_or(MapError::MissingLayer(name))?;
        if matching.next().is_some() {
            return Err(MapError::Validation(format!("duplicate layer '{}'", name)));
        }
        validate_layer(layer, doc)?;
    }

    Ok(())
}

/// Parse a document from JSON text without building the grid
pub fn parse_document(s: &str) -> Result<MapDocument, MapError> {
    Ok(serde_json::from_str(s)?)
}

/// Load a map from JSON text
pub fn load_map_from_str(s: &str) -> Result<TileMap, MapError> {
    parse_document(s)?.to_tile_map()
}

/// Pretty-printed JSON text of a document
pub fn serialize_document(doc: &MapDocument) -> Result<String, MapError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Load a map from a JSON file
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<TileMap, MapError> {
    let contents = fs::read_to_string(path.as_ref())?;
    match load_map_from_str(&contents) {
        Ok(map) => Ok(map),
        Err(e) => {
            tracing::warn!(path = %path.as_ref().display(), error = %e, "failed to load map");
            Err(e)
        }
    }
}

/// Write a document to a JSON file
pub fn save_document<P: AsRef<Path>>(doc: &MapDocument, path: P) -> Result<(), MapError> {
    fs::write(path, serialize_document(doc)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BOX_TILE, PLAYER_TILE};
    use proptest::prelude::*;

    fn sample_map() -> TileMap {
        let mut map = TileMap::create_empty(6, 4).unwrap();
        map.set_tile(LayerKind::Terrain, 0, 0, 98);
        map.set_tile(LayerKind::Goals, 2, 2, 102);
        map.set_tile(LayerKind::Entities, 1, 1, PLAYER_TILE);
        map.set_tile(LayerKind::Entities, 2, 2, BOX_TILE);
        map
    }

    #[test]
    fn test_document_fields() {
        let doc = MapDocument::from_map(&sample_map(), &MapMetadata::default());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["width"], 6);
        assert_eq!(value["height"], 4);
        assert_eq!(value["orientation"], "orthogonal");
        assert_eq!(value["renderorder"], "right-down");
        assert_eq!(value["type"], "map");
        assert_eq!(value["tilewidth"], 32);
        assert_eq!(value["tilesets"][0]["firstgid"], 1);

        let layers = value["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 3);
        let names: Vec<_> = layers.iter().map(|l| l["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Maps", "Goals", "Blocks"]);
        assert_eq!(layers[2]["type"], "tilelayer");
        assert_eq!(layers[2]["visible"], true);
        assert_eq!(layers[2]["x"], 0);
        assert_eq!(layers[2]["data"][1 * 6 + 1], PLAYER_TILE);
    }

    #[test]
    fn test_load_round_trip() {
        let map = sample_map();
        let json = serialize_document(&MapDocument::from_map(&map, &MapMetadata::default())).unwrap();
        let loaded = load_map_from_str(&json).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_layers_matched_by_name() {
        let map = sample_map();
        let mut doc = MapDocument::from_map(&map, &MapMetadata::default());
        doc.layers.reverse();
        assert_eq!(doc.to_tile_map().unwrap(), map);
    }

    #[test]
    fn test_missing_layer_rejected() {
        let mut doc = MapDocument::from_map(&sample_map(), &MapMetadata::default());
        doc.layers.retain(|l| l.name != "Goals");
        assert!(matches!(doc.to_tile_map(), Err(MapError::MissingLayer("Goals"))));
    }

    #[test]
    fn test_short_layer_rejected() {
        let mut doc = MapDocument::from_map(&sample_map(), &MapMetadata::default());
        doc.layers[0].data.pop();
        assert!(matches!(
            doc.to_tile_map(),
            Err(MapError::LayerSizeMismatch { expected: 24, actual: 23, .. })
        ));
    }

    #[test]
    fn test_oversized_document_rejected() {
        let mut doc = MapDocument::from_map(&sample_map(), &MapMetadata::default());
        doc.width = limits::MAX_MAP_SIZE + 1;
        assert!(matches!(doc.to_tile_map(), Err(MapError::TooLarge { .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load_map_from_str("not json"), Err(MapError::Json(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("level.json");
        let map = sample_map();
        save_document(&MapDocument::from_map(&map, &MapMetadata::default()), &path).unwrap();
        assert_eq!(load_map(&path).unwrap(), map);
    }

    proptest! {
        #[test]
        fn prop_serialize_round_trip(
            width in 1usize..12,
            height in 1usize..12,
            edits in proptest::collection::vec((0usize..3, 0usize..12, 0usize..12, 0u32..120), 0..40),
        ) {
            let mut map = TileMap::create_empty(width, height).unwrap();
            for (layer, x, y, tile) in edits {
                map.set_tile(LayerKind::ALL[layer], x, y, tile);
            }

            let json = serialize_document(&MapDocument::from_map(&map, &MapMetadata::default())).unwrap();
            let doc = parse_document(&json).unwrap();
            let rewritten = serde_json::to_string_pretty(&doc).unwrap();
            prop_assert_eq!(&rewritten, &json);
            prop_assert_eq!(doc.to_tile_map().unwrap(), map);
        }
    }
}
