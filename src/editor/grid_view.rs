//! Grid placement and pointer mapping
//!
//! The map is scaled to fit the space above the reserved bottom strip and
//! centered in it. Scale stays within `[MIN_SCALE, MAX_SCALE]`.

use crate::ui::Rect;
use crate::world::Cell;

/// Height of the bottom UI strip (palette + status), in pixels
pub const RESERVED_STRIP: f32 = 100.0;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 1.5;

/// Where the grid sits on screen this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub origin_x: f32,
    pub origin_y: f32,
    /// Nominal tile size before scaling
    pub tile_size: f32,
    pub scale: f32,
    pub map_width: usize,
    pub map_height: usize,
    pub viewport_w: f32,
    pub viewport_h: f32,
}

impl GridLayout {
    /// Fit a map into the viewport
    pub fn fit(map_width: usize, map_height: usize, tile_size: f32, viewport_w: f32, viewport_h: f32) -> Self {
        let avail_h = (viewport_h - RESERVED_STRIP).max(0.0);
        let extent_w = map_width as f32 * tile_size;
        let extent_h = map_height as f32 * tile_size;
        let scale = (viewport_w / extent_w).min(avail_h / extent_h);
        // clamp passes NaN through
        let scale = if scale.is_finite() { scale } else { MIN_SCALE };
        Self::with_scale(map_width, map_height, tile_size, scale, viewport_w, viewport_h)
    }

    /// Center a map at a given scale (clamped)
    pub fn with_scale(
        map_width: usize,
        map_height: usize,
        tile_size: f32,
        scale: f32,
        viewport_w: f32,
        viewport_h: f32,
    ) -> Self {
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let cell = tile_size * scale;
        let avail_h = (viewport_h - RESERVED_STRIP).max(0.0);
        let origin_x = ((viewport_w - map_width as f32 * cell) / 2.0).floor().max(0.0);
        let origin_y = ((avail_h - map_height as f32 * cell) / 2.0).floor().max(0.0);
        Self {
            origin_x,
            origin_y,
            tile_size,
            scale,
            map_width,
            map_height,
            viewport_w,
            viewport_h,
        }
    }

    /// On-screen edge length of one cell
    pub fn cell_size(&self) -> f32 {
        self.tile_size * self.scale
    }

    /// Screen area covered by the grid
    pub fn grid_rect(&self) -> Rect {
        let cell = self.cell_size();
        Rect::new(
            self.origin_x,
            self.origin_y,
            self.map_width as f32 * cell,
            self.map_height as f32 * cell,
        )
    }

    /// The reserved bottom strip
    pub fn strip_rect(&self) -> Rect {
        Rect::screen(self.viewport_w, self.viewport_h).slice_bottom(RESERVED_STRIP)
    }

    pub fn in_strip(&self, py: f32) -> bool {
        py >= self.viewport_h - RESERVED_STRIP
    }

    /// Cell under a screen point, if it lands on the grid
    pub fn to_cell(&self, px: f32, py: f32) -> Option<Cell> {
        if self.in_strip(py) {
            return None;
        }
        let cell = self.cell_size();
        let cx = span_index(px, self.origin_x, cell, self.map_width)?;
        let cy = span_index(py, self.origin_y, cell, self.map_height)?;
        Some(Cell::new(cx, cy))
    }

    /// Top-left screen corner of a cell
    pub fn to_screen(&self, cell: Cell) -> (f32, f32) {
        let size = self.cell_size();
        (
            self.origin_x + cell.x as f32 * size,
            self.origin_y + cell.y as f32 * size,
        )
    }
}

/// Which of `count` spans `[origin + i * size, origin + (i + 1) * size)`
/// holds `p`. Edges are computed the way `to_screen` computes them, so a
/// cell's corner always maps back to that cell.
fn span_index(p: f32, origin: f32, size: f32, count: usize) -> Option<usize> {
    if !(p >= origin) || !(size > 0.0) {
        return None;
    }
    let mut i = ((p - origin) / size).floor();
    if origin + (i + 1.0) * size <= p {
        i += 1.0;
    } else if origin + i * size > p {
        i -= 1.0;
    }
    if i < 0.0 {
        return None;
    }
    let i = i as usize;
    (i < count).then_some(i)
}
