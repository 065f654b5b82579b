//! Editor command table
//!
//! Every keyboard command the editor understands, keyed by action id.

use macroquad::prelude::KeyCode;

use crate::ui::{Action, ActionContext, ActionRegistry, Shortcut};

pub mod ids {
    pub const LAYER_TERRAIN: &str = "layer.terrain";
    pub const LAYER_GOALS: &str = "layer.goals";
    pub const LAYER_ENTITIES: &str = "layer.entities";
    pub const PALETTE_UP: &str = "palette.up";
    pub const PALETTE_DOWN: &str = "palette.down";
    pub const PALETTE_LEFT: &str = "palette.left";
    pub const PALETTE_RIGHT: &str = "palette.right";
    pub const TOGGLE_GRID: &str = "view.toggle_grid";
    pub const TEST_LEVEL: &str = "level.test";
    pub const SAVE: &str = "file.save";
    pub const NEW: &str = "file.new";
    pub const OPEN: &str = "file.open";
    pub const EXIT: &str = "editor.exit";
}

/// Build the editor's action registry
pub fn create_editor_actions() -> ActionRegistry {
    let mut registry = ActionRegistry::new();

    // === Layers ===
    registry.register(
        Action::new(ids::LAYER_TERRAIN)
            .label("Terrain")
            .shortcut(Shortcut::key(KeyCode::Key1))
            .category("Layer"),
    );
    registry.register(
        Action::new(ids::LAYER_GOALS)
            .label("Goals")
            .shortcut(Shortcut::key(KeyCode::Key2))
            .category("Layer"),
    );
    registry.register(
        Action::new(ids::LAYER_ENTITIES)
            .label("Entities")
            .shortcut(Shortcut::key(KeyCode::Key3))
            .category("Layer"),
    );

    // === Palette ===
    for (id, label, key) in [
        (ids::PALETTE_UP, "Tile up", KeyCode::Up),
        (ids::PALETTE_DOWN, "Tile down", KeyCode::Down),
        (ids::PALETTE_LEFT, "Previous tile", KeyCode::Left),
        (ids::PALETTE_RIGHT, "Next tile", KeyCode::Right),
    ] {
        registry.register(
            Action::new(id)
                .label(label)
                .shortcut(Shortcut::key(key))
                .category("Palette"),
        );
    }

    // === View ===
    registry.register(
        Action::new(ids::TOGGLE_GRID)
            .label("Grid")
            .shortcut(Shortcut::key(KeyCode::G))
            .category("View")
            .checked_when(|ctx: &ActionContext| ctx.grid_visible),
    );

    // === Level ===
    registry.register(
        Action::new(ids::TEST_LEVEL)
            .label("Test")
            .shortcut(Shortcut::key(KeyCode::T))
            .category("Level"),
    );
    registry.register(
        Action::new(ids::SAVE)
            .label("Save")
            .shortcut(Shortcut::key(KeyCode::S))
            .category("Level"),
    );
    registry.register(
        Action::new(ids::NEW)
            .label("New")
            .shortcut(Shortcut::key(KeyCode::N))
            .category("Level"),
    );
    registry.register(
        Action::new(ids::OPEN)
            .label("Open")
            .shortcut(Shortcut::key(KeyCode::O))
            .category("Level"),
    );
    registry.register(
        Action::new(ids::EXIT)
            .label("Exit")
            .shortcut(Shortcut::key(KeyCode::Escape))
            .category("Level"),
    );

    registry
}

/// Categories shown in the help bar, in display order
pub const HELP_CATEGORIES: [&str; 3] = ["Layer", "View", "Level"];
