//! Tile palette navigation and strip layout
//!
//! Each layer offers a fixed list of tile ids laid out as a wrapped grid in
//! the bottom strip. Arrow keys walk that grid; pointer presses pick a slot.

use crate::ui::Rect;
use crate::world::{TileId, EMPTY_TILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Slots per palette row for the given width, at least one
pub fn tiles_per_row(available_width: f32, cell: f32, margin: f32) -> usize {
    let per_row = (available_width / (cell + margin)).floor();
    if per_row.is_finite() && per_row >= 1.0 {
        per_row as usize
    } else {
        1
    }
}

/// Step through `palette` from `current`
///
/// A tile not in the palette selects the first slot. Moves that would leave
/// the palette are rejected and keep the current tile.
pub fn select_next(palette: &[TileId], tiles_per_row: usize, direction: Direction, current: TileId) -> TileId {
    let Some(&first) = palette.first() else {
        return EMPTY_TILE;
    };
    let Some(index) = palette.iter().position(|&t| t == current) else {
        return first;
    };
    let per_row = tiles_per_row.max(1);
    let (row, col) = (index / per_row, index % per_row);

    let target = match direction {
        Direction::Up => index.checked_sub(per_row),
        Direction::Down => Some(index + per_row),
        Direction::Left if col > 0 => Some(index - 1),
        // Wrap to the last column of the row above
        Direction::Left => row.checked_sub(1).map(|r| r * per_row + per_row - 1),
        Direction::Right if col + 1 < per_row => Some(index + 1),
        // Wrap to the first column of the row below
        Direction::Right => Some((row + 1) * per_row),
    };

    match target {
        Some(i) if i < palette.len() => palette[i],
        _ => current,
    }
}

/// Palette slots placed in a screen area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteLayout {
    pub area: Rect,
    pub cell: f32,
    pub margin: f32,
    pub tiles_per_row: usize,
    pub len: usize,
}

impl PaletteLayout {
    /// Lay `len` slots out in `area`
    ///
    /// When the rows would run past the bottom of the area, the palette
    /// gets more columns and slots shrink below `cell` to keep every slot
    /// inside.
    pub fn new(area: Rect, cell: f32, margin: f32, len: usize) -> Self {
        let per_row_fit = tiles_per_row(area.w, cell, margin);
        let rows_fit = tiles_per_row(area.h, cell, margin);
        let per_row = if len.div_ceil(per_row_fit) > rows_fit {
            len.div_ceil(rows_fit)
        } else {
            per_row_fit
        };
        let rows = len.div_ceil(per_row).max(1);
        let cell = cell
            .min(area.w / per_row as f32 - margin)
            .min(area.h / rows as f32 - margin)
            .max(1.0);
        Self {
            area,
            cell,
            margin,
            tiles_per_row: per_row,
            len,
        }
    }

    fn pitch(&self) -> f32 {
        self.cell + self.margin
    }

    /// Top-left corner of slot `i`
    pub fn slot_origin(&self, i: usize) -> (f32, f32) {
        let col = i % self.tiles_per_row;
        let row = i / self.tiles_per_row;
        (
            self.area.x + col as f32 * self.pitch(),
            self.area.y + row as f32 * self.pitch(),
        )
    }

    pub fn slot_rect(&self, i: usize) -> Rect {
        let (x, y) = self.slot_origin(i);
        Rect::new(x, y, self.cell, self.cell)
    }

    /// Slot under a screen point. Margins between slots hit nothing.
    pub fn slot_at(&self, px: f32, py: f32) -> Option<usize> {
        if !self.area.contains(px, py) {
            return None;
        }
        let rx = px - self.area.x;
        let ry = py - self.area.y;
        let col = (rx / self.pitch()).floor() as usize;
        let row = (ry / self.pitch()).floor() as usize;
        if col >= self.tiles_per_row {
            return None;
        }
        if rx - col as f32 * self.pitch() >= self.cell || ry - row as f32 * self.pitch() >= self.cell {
            return None;
        }
        let index = row * self.tiles_per_row + col;
        (index < self.len).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PALETTE: [TileId; 7] = [0, 10, 11, 12, 13, 14, 15];

    #[test]
    fn test_tiles_per_row() {
        assert_eq!(tiles_per_row(440.0, 40.0, 4.0), 10);
        assert_eq!(tiles_per_row(439.0, 40.0, 4.0), 9);
        assert_eq!(tiles_per_row(10.0, 40.0, 4.0), 1);
        assert_eq!(tiles_per_row(0.0, 40.0, 4.0), 1);
    }

    #[test]
    fn test_unknown_tile_selects_first() {
        assert_eq!(select_next(&PALETTE, 3, Direction::Right, 99), 0);
        assert_eq!(select_next(&PALETTE, 3, Direction::Up, 99), 0);
        assert_eq!(select_next(&[], 3, Direction::Up, 5), EMPTY_TILE);
    }

    #[test]
    fn test_right_wraps_to_next_row() {
        // Rows: [0 10 11] [12 13 14] [15]
        assert_eq!(select_next(&PALETTE, 3, Direction::Right, 11), 12);
        assert_eq!(select_next(&PALETTE, 3, Direction::Right, 14), 15);
        // Last slot has nowhere to go
        assert_eq!(select_next(&PALETTE, 3, Direction::Right, 15), 15);
    }

    #[test]
    fn test_left_wraps_to_previous_row() {
        assert_eq!(select_next(&PALETTE, 3, Direction::Left, 12), 11);
        assert_eq!(select_next(&PALETTE, 3, Direction::Left, 13), 12);
        assert_eq!(select_next(&PALETTE, 3, Direction::Left, 0), 0);
    }

    #[test]
    fn test_vertical_moves() {
        assert_eq!(select_next(&PALETTE, 3, Direction::Down, 10), 13);
        assert_eq!(select_next(&PALETTE, 3, Direction::Up, 13), 10);
        assert_eq!(select_next(&PALETTE, 3, Direction::Up, 11), 11);
        // Down from 13 would land past the end
        assert_eq!(select_next(&PALETTE, 3, Direction::Down, 13), 13);
        assert_eq!(select_next(&PALETTE, 3, Direction::Down, 12), 15);
    }

    #[test]
    fn test_slot_hit_testing() {
        let layout = PaletteLayout::new(Rect::new(10.0, 500.0, 132.0, 88.0), 40.0, 4.0, 5);
        assert_eq!(layout.tiles_per_row, 3);
        assert_eq!(layout.slot_origin(4), (54.0, 544.0));
        assert_eq!(layout.slot_at(11.0, 501.0), Some(0));
        assert_eq!(layout.slot_at(55.0, 545.0), Some(4));
        // Margin between slots
        assert_eq!(layout.slot_at(52.0, 510.0), None);
        // Past the last slot
        assert_eq!(layout.slot_at(100.0, 545.0), None);
        // Outside the area
        assert_eq!(layout.slot_at(5.0, 510.0), None);
    }

    #[test]
    fn test_short_area_adds_columns() {
        // Room for 5 columns and 2 rows of 40px slots, but 13 tiles
        let area = Rect::new(4.0, 504.0, 235.2, 92.0);
        let layout = PaletteLayout::new(area, 40.0, 4.0, 13);
        assert_eq!(layout.tiles_per_row, 7);
        assert!((layout.cell - 29.6).abs() < 1e-3);
        for i in 0..13 {
            let slot = layout.slot_rect(i);
            assert!(slot.bottom() <= area.bottom(), "slot {} at {:?}", i, slot);
            assert!(slot.right() <= area.right(), "slot {} at {:?}", i, slot);
        }
        let (x, y) = layout.slot_origin(12);
        assert_eq!(layout.slot_at(x + 1.0, y + 1.0), Some(12));
    }

    #[test]
    fn test_roomy_area_keeps_cell_size() {
        let layout = PaletteLayout::new(Rect::new(0.0, 0.0, 500.0, 100.0), 40.0, 4.0, 13);
        assert_eq!(layout.tiles_per_row, 11);
        assert_eq!(layout.cell, 40.0);
    }

    proptest! {
        #[test]
        fn prop_slots_stay_inside_area(
            w in 200.0f32..600.0,
            h in 60.0f32..200.0,
            cell in 8.0f32..64.0,
            margin in 0.0f32..6.0,
            len in 0usize..30,
        ) {
            let area = Rect::new(10.0, 300.0, w, h);
            let layout = PaletteLayout::new(area, cell, margin, len);
            prop_assert!(layout.cell <= cell);
            // Below 1px there is no room left to shrink into
            prop_assume!(layout.cell > 1.0);
            // Slack for float rounding at the far edges
            for i in 0..len {
                let slot = layout.slot_rect(i);
                prop_assert!(slot.x >= area.x && slot.y >= area.y);
                prop_assert!(slot.right() <= area.right() + 1e-3, "slot {} {:?} in {:?}", i, slot, area);
                prop_assert!(slot.bottom() <= area.bottom() + 1e-3, "slot {} {:?} in {:?}", i, slot, area);
            }
        }

        #[test]
        fn prop_select_next_stays_in_palette(
            len in 1usize..30,
            per_row in 1usize..10,
            start in 0usize..30,
            moves in proptest::collection::vec(0u8..4, 0..50),
        ) {
            let palette: Vec<TileId> = (0..len as TileId).map(|i| i * 3).collect();
            let mut current = palette[start % len];
            for m in moves {
                let direction = match m {
                    0 => Direction::Up,
                    1 => Direction::Down,
                    2 => Direction::Left,
                    _ => Direction::Right,
                };
                current = select_next(&palette, per_row, direction, current);
                prop_assert!(palette.contains(&current));
            }
        }

        #[test]
        fn prop_right_from_last_column(per_row in 1usize..8, rows in 2usize..5, row in 0usize..4) {
            let len = per_row * rows;
            let palette: Vec<TileId> = (0..len as TileId).collect();
            let row = row % (rows - 1);
            let last_col = row * per_row + per_row - 1;
            let next = select_next(&palette, per_row, Direction::Right, palette[last_col]);
            prop_assert_eq!(next, palette[(row + 1) * per_row]);
        }
    }
}
