//! Editor drawing
//!
//! Grid on top, palette and status in the reserved bottom strip, prompts
//! as a centered dialog over everything.

use macroquad::prelude::*;

use super::actions::HELP_CATEGORIES;
use super::state::{ActiveEditor, EditorSession, Modal, StatusKind};
use crate::tileset::Tileset;
use crate::ui::{draw_text_input, Rect};
use crate::world::{LayerKind, EMPTY_TILE};

const BG: Color = Color::new(0.08, 0.08, 0.1, 1.0);
const GRID_BG: Color = Color::new(0.14, 0.14, 0.17, 1.0);
const GRID_LINE: Color = Color::new(1.0, 1.0, 1.0, 0.12);
const STRIP_BG: Color = Color::new(0.16, 0.16, 0.18, 1.0);
const SLOT_BG: Color = Color::new(0.1, 0.1, 0.12, 1.0);
const SELECTED: Color = Color::new(0.0, 0.75, 0.9, 1.0);
const TEXT: Color = Color::new(0.8, 0.8, 0.85, 1.0);
const TEXT_DIM: Color = Color::new(0.5, 0.5, 0.55, 1.0);
const WARN: Color = Color::new(1.0, 0.75, 0.2, 1.0);
const ERROR: Color = Color::new(1.0, 0.35, 0.3, 1.0);

/// Draw the whole editor for this frame
pub fn draw_editor(session: &EditorSession, tileset: &Tileset, time: f64) {
    let Some(editor) = session.active() else {
        return;
    };
    clear_background(BG);
    draw_map(editor, tileset);
    draw_strip(session, editor, tileset);
    if let Some(modal) = editor.modal() {
        draw_modal(modal, time);
    }
}

fn draw_map(editor: &ActiveEditor, tileset: &Tileset) {
    let grid = editor.grid();
    let area = grid.grid_rect();
    draw_rectangle(area.x, area.y, area.w, area.h, GRID_BG);

    let size = grid.cell_size();
    for kind in LayerKind::ALL {
        for (cell, tile) in editor.map().cells(kind) {
            let (x, y) = grid.to_screen(cell);
            tileset.draw_tile(kind, tile, Rect::new(x, y, size, size));
        }
    }

    if editor.show_grid() {
        for col in 0..=grid.map_width {
            let x = (area.x + col as f32 * size).floor();
            draw_line(x, area.y, x, area.bottom(), 1.0, GRID_LINE);
        }
        for row in 0..=grid.map_height {
            let y = (area.y + row as f32 * size).floor();
            draw_line(area.x, y, area.right(), y, 1.0, GRID_LINE);
        }
    }
}

fn draw_strip(session: &EditorSession, editor: &ActiveEditor, tileset: &Tileset) {
    let strip = editor.grid().strip_rect();
    draw_rectangle(strip.x, strip.y, strip.w, strip.h, STRIP_BG);

    let palette = editor.palette();
    let tiles = session.config().palettes.tiles(editor.layer());
    for (i, &tile) in tiles.iter().enumerate() {
        let slot = palette.slot_rect(i);
        draw_rectangle(slot.x, slot.y, slot.w, slot.h, SLOT_BG);
        if tile == EMPTY_TILE {
            // Eraser
            draw_line(slot.x + 8.0, slot.y + 8.0, slot.right() - 8.0, slot.bottom() - 8.0, 2.0, TEXT_DIM);
            draw_line(slot.right() - 8.0, slot.y + 8.0, slot.x + 8.0, slot.bottom() - 8.0, 2.0, TEXT_DIM);
        } else {
            tileset.draw_tile(editor.layer(), tile, slot.pad(2.0));
        }
        if tile == editor.tile() {
            draw_rectangle_lines(slot.x, slot.y, slot.w, slot.h, 2.0, SELECTED);
        }
    }

    let info = Rect::new(palette.area.right() + 8.0, strip.y, strip.right() - palette.area.right() - 8.0, strip.h);
    let title = format!(
        "{}{}  |  Layer: {}  |  Tile: {}",
        editor.level_name().unwrap_or("Untitled"),
        if editor.is_dirty() { " *" } else { "" },
        editor.layer().label(),
        editor.tile()
    );
    draw_text(&title, info.x, (info.y + 20.0).floor(), 16.0, TEXT);

    if let Some(status) = editor.status() {
        let color = match status.kind {
            StatusKind::Info => TEXT,
            StatusKind::Warning => WARN,
            StatusKind::Error => ERROR,
        };
        draw_text(&status.text, info.x, (info.y + 42.0).floor(), 16.0, color);
    }

    let ctx = session.action_context();
    let mut y = info.y + 64.0;
    for category in HELP_CATEGORIES {
        let hints: Vec<String> = session
            .actions()
            .actions_in_category(category)
            .iter()
            .map(|a| {
                let mut hint = a.hint();
                if a.is_checked(&ctx) {
                    hint.push_str(" [on]");
                }
                hint
            })
            .collect();
        draw_text(&hints.join("  "), info.x, y.floor(), 13.0, TEXT_DIM);
        y += 14.0;
    }
}

fn draw_modal(modal: &Modal, time: f64) {
    let screen = Rect::screen(screen_width(), screen_height());
    draw_rectangle(screen.x, screen.y, screen.w, screen.h, Color::new(0.0, 0.0, 0.0, 0.6));

    let dialog = screen.centered(420.0_f32.min(screen.w - 20.0), 180.0);
    draw_rectangle(dialog.x, dialog.y, dialog.w, dialog.h, STRIP_BG);
    draw_rectangle_lines(dialog.x, dialog.y, dialog.w, dialog.h, 1.0, SELECTED);
    let body = dialog.pad(16.0);

    let (title, hint) = match modal {
        Modal::SaveName(_) => ("Level name", "Enter to continue, Esc to cancel"),
        Modal::SaveAuthor { .. } => ("Author", "Enter to save, Esc to cancel"),
        Modal::Confirm(command) => (command.question(), "Y / Enter to confirm, N / Esc to cancel"),
        Modal::OpenLevel { .. } => ("Open level", "Up/Down to choose, Enter to open, Esc to cancel"),
    };
    draw_text(title, body.x, (body.y + 16.0).floor(), 18.0, TEXT);
    draw_text(hint, body.x, (body.bottom() - 4.0).floor(), 13.0, TEXT_DIM);

    match modal {
        Modal::SaveName(input) | Modal::SaveAuthor { input, .. } => {
            let field = Rect::new(body.x, body.y + 40.0, body.w, 32.0);
            draw_text_input(field, input, 16.0, time);
        }
        Modal::Confirm(_) => {}
        Modal::OpenLevel { levels, selected } => {
            // Keep the selection in a window of a few rows
            let rows = 5;
            let first = selected.saturating_sub(rows - 1);
            for (row, (i, level)) in levels.iter().enumerate().skip(first).take(rows).enumerate() {
                let y = body.y + 40.0 + row as f32 * 18.0;
                let color = if i == *selected { SELECTED } else { TEXT };
                let line = format!("{}  by {}  ({})", level.level_name, level.author_name, level.created_label());
                draw_text(&line, body.x, y.floor(), 15.0, color);
            }
        }
    }
}
