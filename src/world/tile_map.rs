//! Multi-layer tile grid
//!
//! A map is three same-sized planes of tile ids stored row-major.
//! Tile id 0 is empty on every layer.

use super::{limits, MapError};

/// Integer key into the shared tileset image (0 = empty)
pub type TileId = u32;

/// The empty / erase tile
pub const EMPTY_TILE: TileId = 0;
/// Default player marker on the Entities layer
pub const PLAYER_TILE: TileId = 88;
/// Default box marker on the Entities layer
pub const BOX_TILE: TileId = 94;

/// Fixed role of each map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Walls and floor
    Terrain,
    /// Goal markers
    Goals,
    /// Boxes and the single player marker
    Entities,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Terrain, LayerKind::Goals, LayerKind::Entities];

    /// Position of this layer in the map's layer list
    pub fn index(self) -> usize {
        match self {
            LayerKind::Terrain => 0,
            LayerKind::Goals => 1,
            LayerKind::Entities => 2,
        }
    }

    /// Layer name used in the interchange document
    pub fn document_name(self) -> &'static str {
        match self {
            LayerKind::Terrain => "Maps",
            LayerKind::Goals => "Goals",
            LayerKind::Entities => "Blocks",
        }
    }

    pub fn from_document_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.document_name() == name)
    }

    /// Layer id used in the interchange document (1-based)
    pub fn document_id(self) -> u32 {
        self.index() as u32 + 1
    }

    /// Human-readable label for the status bar
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Terrain => "Terrain",
            LayerKind::Goals => "Goals",
            LayerKind::Entities => "Entities",
        }
    }
}

/// Tile ids with gameplay meaning on the Entities layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRoles {
    pub player: TileId,
    pub box_tile: TileId,
}

impl Default for TileRoles {
    fn default() -> Self {
        Self {
            player: PLAYER_TILE,
            box_tile: BOX_TILE,
        }
    }
}

/// A grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One plane of tile ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub kind: LayerKind,
    data: Vec<TileId>,
}

impl Layer {
    fn empty(kind: LayerKind, len: usize) -> Self {
        Self {
            kind,
            data: vec![EMPTY_TILE; len],
        }
    }

    /// Row-major tile data
    pub fn data(&self) -> &[TileId] {
        &self.data
    }
}

/// The editable level grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    layers: [Layer; 3],
}

impl TileMap {
    /// Create a map with all three layers zero-filled
    pub fn create_empty(width: usize, height: usize) -> Result<Self, MapError> {
        check_dimensions(width, height)?;
        let len = width * height;
        Ok(Self {
            width,
            height,
            layers: LayerKind::ALL.map(|kind| Layer::empty(kind, len)),
        })
    }

    /// Build a map from raw layer data, ordered Terrain, Goals, Entities
    pub(crate) fn from_layers(
        width: usize,
        height: usize,
        data: [Vec<TileId>; 3],
    ) -> Result<Self, MapError> {
        check_dimensions(width, height)?;
        let expected = width * height;
        for (kind, layer) in LayerKind::ALL.iter().zip(data.iter()) {
            if layer.len() != expected {
                return Err(MapError::LayerSizeMismatch {
                    name: kind.document_name().to_string(),
                    expected,
                    actual: layer.len(),
                });
            }
        }
        let [terrain, goals, entities] = data;
        Ok(Self {
            width,
            height,
            layers: [
                Layer { kind: LayerKind::Terrain, data: terrain },
                Layer { kind: LayerKind::Goals, data: goals },
                Layer { kind: LayerKind::Entities, data: entities },
            ],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        &self.layers[kind.index()]
    }

    pub fn layers(&self) -> &[Layer; 3] {
        &self.layers
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn flat_index(&self, x: usize, y: usize) -> Option<usize> {
        self.in_bounds(x, y).then(|| y * self.width + x)
    }

    /// Write a tile. Returns true only if the cell actually changed.
    ///
    /// Out-of-bounds writes are absorbed and report no change.
    pub fn set_tile(&mut self, kind: LayerKind, x: usize, y: usize, tile: TileId) -> bool {
        let Some(idx) = self.flat_index(x, y) else {
            return false;
        };
        let slot = &mut self.layers[kind.index()].data[idx];
        if *slot == tile {
            return false;
        }
        *slot = tile;
        true
    }

    /// Read a tile, 0 for anything outside the grid
    pub fn get_tile(&self, kind: LayerKind, x: usize, y: usize) -> TileId {
        self.flat_index(x, y)
            .map(|idx| self.layers[kind.index()].data[idx])
            .unwrap_or(EMPTY_TILE)
    }

    /// First cell (row-major) holding `tile`
    pub fn find_unique(&self, kind: LayerKind, tile: TileId) -> Option<Cell> {
        self.layer(kind)
            .data
            .iter()
            .position(|&t| t == tile)
            .map(|idx| Cell::new(idx % self.width, idx / self.width))
    }

    /// Number of cells holding `tile`
    pub fn count(&self, kind: LayerKind, tile: TileId) -> usize {
        self.layer(kind).data.iter().filter(|&&t| t == tile).count()
    }

    pub fn count_non_empty(&self, kind: LayerKind) -> usize {
        self.layer(kind).data.iter().filter(|&&t| t != EMPTY_TILE).count()
    }

    /// Iterate the non-empty cells of a layer
    pub fn cells(&self, kind: LayerKind) -> impl Iterator<Item = (Cell, TileId)> + '_ {
        let width = self.width;
        self.layer(kind)
            .data
            .iter()
            .enumerate()
            .filter(|(_, &t)| t != EMPTY_TILE)
            .map(move |(idx, &t)| (Cell::new(idx % width, idx / width), t))
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), MapError> {
    if width == 0 || height == 0 {
        return Err(MapError::InvalidDimension { width, height });
    }
    if width > limits::MAX_MAP_SIZE || height > limits::MAX_MAP_SIZE {
        return Err(MapError::TooLarge {
            width,
            height,
            max: limits::MAX_MAP_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_empty() {
        let map = TileMap::create_empty(16, 12).unwrap();
        assert_eq!(map.width(), 16);
        assert_eq!(map.height(), 12);
        for layer in map.layers() {
            assert_eq!(layer.data().len(), 16 * 12);
            assert!(layer.data().iter().all(|&t| t == EMPTY_TILE));
        }
    }

    #[test]
    fn test_create_empty_rejects_zero() {
        assert!(matches!(
            TileMap::create_empty(0, 12),
            Err(MapError::InvalidDimension { width: 0, height: 12 })
        ));
        assert!(matches!(
            TileMap::create_empty(16, 0),
            Err(MapError::InvalidDimension { .. })
        ));
        assert!(matches!(
            TileMap::create_empty(limits::MAX_MAP_SIZE + 1, 4),
            Err(MapError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_set_tile_row_major() {
        let mut map = TileMap::create_empty(4, 3).unwrap();
        assert!(map.set_tile(LayerKind::Terrain, 3, 1, 7));
        assert_eq!(map.layer(LayerKind::Terrain).data()[1 * 4 + 3], 7);
        assert_eq!(map.get_tile(LayerKind::Terrain, 3, 1), 7);
        // Other layers untouched
        assert_eq!(map.get_tile(LayerKind::Goals, 3, 1), EMPTY_TILE);
    }

    #[test]
    fn test_set_same_value_reports_no_change() {
        let mut map = TileMap::create_empty(4, 3).unwrap();
        assert!(map.set_tile(LayerKind::Goals, 1, 1, 102));
        assert!(!map.set_tile(LayerKind::Goals, 1, 1, 102));
        assert!(!map.set_tile(LayerKind::Goals, 2, 2, EMPTY_TILE));
    }

    #[test]
    fn test_out_of_bounds_absorbed() {
        let mut map = TileMap::create_empty(4, 3).unwrap();
        assert!(!map.set_tile(LayerKind::Terrain, 4, 0, 5));
        assert!(!map.set_tile(LayerKind::Terrain, 0, 3, 5));
        assert_eq!(map.get_tile(LayerKind::Terrain, 100, 100), EMPTY_TILE);
        assert_eq!(map.count_non_empty(LayerKind::Terrain), 0);
    }

    #[test]
    fn test_find_unique_and_count() {
        let mut map = TileMap::create_empty(5, 5).unwrap();
        assert_eq!(map.find_unique(LayerKind::Entities, PLAYER_TILE), None);

        map.set_tile(LayerKind::Entities, 3, 2, PLAYER_TILE);
        map.set_tile(LayerKind::Entities, 1, 1, BOX_TILE);
        map.set_tile(LayerKind::Entities, 4, 4, BOX_TILE);

        assert_eq!(map.find_unique(LayerKind::Entities, PLAYER_TILE), Some(Cell::new(3, 2)));
        assert_eq!(map.count(LayerKind::Entities, BOX_TILE), 2);
        assert_eq!(map.count_non_empty(LayerKind::Entities), 3);

        let cells: Vec<_> = map.cells(LayerKind::Entities).collect();
        assert_eq!(cells[0], (Cell::new(1, 1), BOX_TILE));
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = TileMap::create_empty(3, 3).unwrap();
        let copy = map.clone();
        map.set_tile(LayerKind::Terrain, 0, 0, 1);
        assert_eq!(copy.get_tile(LayerKind::Terrain, 0, 0), EMPTY_TILE);
    }

    #[test]
    fn test_from_layers_checks_length() {
        let ok = TileMap::from_layers(2, 2, [vec![0; 4], vec![0; 4], vec![0; 4]]);
        assert!(ok.is_ok());

        let bad = TileMap::from_layers(2, 2, [vec![0; 4], vec![0; 3], vec![0; 4]]);
        assert!(matches!(bad, Err(MapError::LayerSizeMismatch { expected: 4, actual: 3, .. })));
    }

    #[test]
    fn test_layer_names() {
        for kind in LayerKind::ALL {
            assert_eq!(LayerKind::from_document_name(kind.document_name()), Some(kind));
        }
        assert_eq!(LayerKind::Entities.document_name(), "Blocks");
        assert_eq!(LayerKind::Terrain.document_id(), 1);
    }
}
