//! Tileset image and tile drawing
//!
//! Tile ids index a single sheet, 1-based, row-major. When the sheet is
//! missing tiles are drawn as flat blocks colored by layer.

use macroquad::prelude::*;

use crate::config::TilesetConfig;
use crate::ui::Rect;
use crate::world::{LayerKind, TileId, TileRoles, EMPTY_TILE};

/// Source rectangle of a tile in the sheet
///
/// Id 0 (and anything below the first tile) maps to the first tile.
pub fn tile_source_rect(id: TileId, columns: u32, size: f32) -> Rect {
    let index = id.saturating_sub(1);
    let columns = columns.max(1);
    Rect::new(
        (index % columns) as f32 * size,
        (index / columns) as f32 * size,
        size,
        size,
    )
}

/// Block color used when the sheet is unavailable
pub fn fallback_color(layer: LayerKind, id: TileId, roles: &TileRoles) -> Color {
    match layer {
        LayerKind::Terrain => {
            // Vary the shade a little per id so neighbouring tiles stay distinct
            let shade = 0.35 + (id % 5) as f32 * 0.06;
            Color::new(shade, shade * 0.9, shade * 0.8, 1.0)
        }
        LayerKind::Goals => Color::new(0.9, 0.75, 0.1, 0.8),
        LayerKind::Entities if id == roles.player => Color::new(0.2, 0.6, 1.0, 1.0),
        LayerKind::Entities if id == roles.box_tile => Color::new(0.7, 0.4, 0.15, 1.0),
        LayerKind::Entities => Color::new(0.8, 0.2, 0.8, 1.0),
    }
}

pub struct Tileset {
    texture: Option<Texture2D>,
    columns: u32,
    source_size: f32,
    roles: TileRoles,
}

impl Tileset {
    /// Load the sheet named in the config; failure leaves block drawing
    pub async fn load(config: &TilesetConfig, roles: TileRoles) -> Self {
        let texture = match load_texture(&config.image).await {
            Ok(tex) => {
                tex.set_filter(FilterMode::Nearest);
                tracing::info!(path = %config.image, "loaded tileset");
                Some(tex)
            }
            Err(e) => {
                tracing::warn!(path = %config.image, error = %e, "tileset unavailable, drawing blocks");
                None
            }
        };
        Self {
            texture,
            columns: config.columns,
            source_size: config.source_tile_size,
            roles,
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Draw one tile into `dest`. Empty tiles draw nothing.
    pub fn draw_tile(&self, layer: LayerKind, id: TileId, dest: Rect) {
        if id == EMPTY_TILE {
            return;
        }
        match &self.texture {
            Some(texture) => {
                let src = tile_source_rect(id, self.columns, self.source_size);
                draw_texture_ex(
                    texture,
                    dest.x,
                    dest.y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(dest.w, dest.h)),
                        source: Some(macroquad::math::Rect::new(src.x, src.y, src.w, src.h)),
                        ..Default::default()
                    },
                );
            }
            None => {
                let inset = match layer {
                    LayerKind::Terrain => 0.0,
                    LayerKind::Goals => dest.w * 0.3,
                    LayerKind::Entities => dest.w * 0.12,
                };
                let r = dest.pad(inset);
                draw_rectangle(r.x, r.y, r.w, r.h, fallback_color(layer, id, &self.roles));
            }
        }
    }
}
