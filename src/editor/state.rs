//! Editor session state
//!
//! The session is `Inactive` until `show()`. While active it owns exactly
//! one map plus everything needed to edit it; leaving drops all of it.
//! Input arrives as discrete events from the host loop, and prompts
//! (save name, author, confirmations, level list) take the keyboard while open.

use macroquad::prelude::KeyCode;

use super::actions::{create_editor_actions, ids};
use super::grid_view::GridLayout;
use super::palette::{select_next, Direction, PaletteLayout};
use crate::config::EditorConfig;
use crate::storage::levels::{LevelStore, PersistedLevel};
use crate::storage::KeyValueStore;
use crate::ui::{
    ActionContext, ActionRegistry, Modifiers, PointerEvent, PointerGate, PointerKind, TextInputState,
};
use crate::world::{self, Cell, LayerKind, MapError, TileId, TileMap, EMPTY_TILE};

/// Seconds a status message stays visible
pub const STATUS_SECS: f64 = 3.0;
/// Longest level or author name accepted by the prompts
pub const MAX_NAME_CHARS: usize = 40;
/// Share of the bottom strip used by the palette; the rest shows status text
const PALETTE_SHARE: f32 = 0.6;

/// What the editor needs from the surrounding application
pub trait EditorHost {
    /// Start a trial run of a playable map (an independent copy)
    fn test_custom_level(&mut self, level: TileMap);
    /// The editor has closed
    fn return_from_editor(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: f64,
}

/// Command waiting on a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    New,
    Exit,
    Open,
}

impl PendingCommand {
    pub fn question(self) -> &'static str {
        match self {
            PendingCommand::New => "Discard unsaved changes and start a new map?",
            PendingCommand::Exit => "Discard unsaved changes and leave the editor?",
            PendingCommand::Open => "Discard unsaved changes and open another level?",
        }
    }
}

/// Prompts that take over the keyboard
#[derive(Debug, Clone)]
pub enum Modal {
    SaveName(TextInputState),
    SaveAuthor { name: String, input: TextInputState },
    Confirm(PendingCommand),
    OpenLevel { levels: Vec<PersistedLevel>, selected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    Grid,
    Palette,
}

/// Whether the session stays open after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Exit,
}

/// Everything that exists only while the editor is open
#[derive(Debug)]
pub struct ActiveEditor {
    map: TileMap,
    layer: LayerKind,
    tile: TileId,
    dirty: bool,
    show_grid: bool,
    modal: Option<Modal>,
    grid: GridLayout,
    palette: PaletteLayout,
    gate: PointerGate,
    drag: Option<DragTarget>,
    last_cell: Option<Cell>,
    status: Option<StatusMessage>,
    /// Name of the level last saved or opened, to prefill the save prompt
    level_name: Option<String>,
}

impl ActiveEditor {
    fn new(map: TileMap, config: &EditorConfig, viewport: (f32, f32)) -> Self {
        let grid = GridLayout::fit(map.width(), map.height(), config.tile_size, viewport.0, viewport.1);
        let mut editor = Self {
            map,
            layer: LayerKind::Terrain,
            tile: EMPTY_TILE,
            dirty: false,
            show_grid: true,
            modal: None,
            grid,
            palette: PaletteLayout::new(Default::default(), config.palette_cell, config.palette_margin, 0),
            gate: PointerGate::default(),
            drag: None,
            last_cell: None,
            status: None,
            level_name: None,
        };
        editor.relayout(config, viewport);
        editor
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn palette(&self) -> &PaletteLayout {
        &self.palette
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level_name.as_deref()
    }

    fn action_context(&self) -> ActionContext {
        ActionContext {
            modal_open: self.modal.is_some(),
            grid_visible: self.show_grid,
        }
    }

    fn relayout(&mut self, config: &EditorConfig, viewport: (f32, f32)) {
        let (w, h) = viewport;
        self.grid = GridLayout::fit(self.map.width(), self.map.height(), config.tile_size, w, h);
        let (palette_area, _) = self.grid.strip_rect().pad(config.palette_margin).split_h(PALETTE_SHARE);
        self.palette = PaletteLayout::new(
            palette_area,
            config.palette_cell,
            config.palette_margin,
            config.palettes.tiles(self.layer).len(),
        );
    }

    fn set_status(&mut self, now: f64, kind: StatusKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            StatusKind::Info => tracing::info!("{}", text),
            StatusKind::Warning => tracing::warn!("{}", text),
            StatusKind::Error => tracing::warn!(error = true, "{}", text),
        }
        self.status = Some(StatusMessage {
            text,
            kind,
            expires_at: now + STATUS_SECS,
        });
    }

    /// Swap in a different map; the session is clean afterwards
    fn replace_map(&mut self, map: TileMap, name: Option<String>, config: &EditorConfig, viewport: (f32, f32)) {
        self.map = map;
        self.dirty = false;
        self.level_name = name;
        self.drag = None;
        self.last_cell = None;
        self.gate.reset();
        self.relayout(config, viewport);
    }

    /// Write the current tile into a cell, keeping a single player
    fn paint(&mut self, cell: Cell, config: &EditorConfig, now: f64) {
        self.last_cell = Some(cell);
        let roles = config.roles();
        let under = self.map.get_tile(self.layer, cell.x, cell.y);
        let mut changed = false;

        if self.layer == LayerKind::Entities {
            if self.tile == roles.player {
                // Loaded maps may carry more than one
                while let Some(other) = self.map.find_unique(LayerKind::Entities, roles.player) {
                    self.map.set_tile(LayerKind::Entities, other.x, other.y, EMPTY_TILE);
                    changed |= other != cell;
                }
                if under == roles.box_tile {
                    self.set_status(
                        now,
                        StatusKind::Warning,
                        format!("Player placed over a box at ({}, {})", cell.x, cell.y),
                    );
                }
            } else if self.tile == roles.box_tile && under == roles.player {
                self.set_status(
                    now,
                    StatusKind::Warning,
                    format!("Box placed over the player at ({}, {})", cell.x, cell.y),
                );
            }
        }

        let written = self.map.set_tile(self.layer, cell.x, cell.y, self.tile);
        changed |= written && under != self.tile;
        if changed {
            self.dirty = true;
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent, config: &EditorConfig, now: f64) {
        if !self.gate.accept(event) || self.modal.is_some() {
            return;
        }

        match event.kind {
            PointerKind::Down => {
                if let Some(slot) = self.palette.slot_at(event.x, event.y) {
                    if let Some(&tile) = config.palettes.tiles(self.layer).get(slot) {
                        self.tile = tile;
                    }
                    self.drag = Some(DragTarget::Palette);
                } else if let Some(cell) = self.grid.to_cell(event.x, event.y) {
                    self.drag = Some(DragTarget::Grid);
                    self.paint(cell, config, now);
                } else {
                    self.drag = None;
                }
            }
            PointerKind::Move => {
                if self.drag != Some(DragTarget::Grid) || !self.gate.is_pressed() {
                    return;
                }
                if let Some(cell) = self.grid.to_cell(event.x, event.y) {
                    if self.last_cell != Some(cell) {
                        self.paint(cell, config, now);
                    }
                }
            }
            PointerKind::Up => {
                self.drag = None;
                self.last_cell = None;
            }
        }
    }
}

/// Editor lifecycle
#[derive(Debug)]
pub enum SessionState {
    Inactive,
    Active(Box<ActiveEditor>),
}

/// Shared pieces handlers need alongside the active editor
struct Env<'a> {
    config: &'a EditorConfig,
    store: &'a mut LevelStore<Box<dyn KeyValueStore>>,
    viewport: (f32, f32),
    now: f64,
}

/// The level editor
pub struct EditorSession {
    config: EditorConfig,
    actions: ActionRegistry,
    store: LevelStore<Box<dyn KeyValueStore>>,
    state: SessionState,
    viewport: (f32, f32),
    now: f64,
}

impl EditorSession {
    pub fn new(config: EditorConfig, storage: Box<dyn KeyValueStore>) -> Self {
        let store = LevelStore::new(storage, config.roles(), config.map_metadata());
        Self {
            config,
            actions: create_editor_actions(),
            store,
            state: SessionState::Inactive,
            viewport: (800.0, 600.0),
            now: 0.0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveEditor> {
        match &self.state {
            SessionState::Active(editor) => Some(&**editor),
            SessionState::Inactive => None,
        }
    }

    /// Action context for help bar state
    pub fn action_context(&self) -> ActionContext {
        self.active().map(ActiveEditor::action_context).unwrap_or_default()
    }

    /// Open the editor on a fresh empty map
    pub fn show(&mut self) -> Result<(), MapError> {
        if self.is_active() {
            return Ok(());
        }
        let map = TileMap::create_empty(self.config.map_width, self.config.map_height)?;
        tracing::info!(width = map.width(), height = map.height(), "editor opened");
        self.state = SessionState::Active(Box::new(ActiveEditor::new(map, &self.config, self.viewport)));
        Ok(())
    }

    /// Close the editor, discarding any unsaved changes
    pub fn hide(&mut self) {
        if let SessionState::Active(editor) = &self.state {
            if editor.dirty {
                tracing::info!("editor closed with unsaved changes discarded");
            }
        }
        self.state = SessionState::Inactive;
    }

    /// Viewport size changed (or first frame)
    pub fn update_layout(&mut self, width: f32, height: f32) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        if let SessionState::Active(editor) = &mut self.state {
            editor.relayout(&self.config, self.viewport);
        }
    }

    /// Advance the clock used for status expiry
    pub fn tick(&mut self, now: f64) {
        self.now = now;
        if let SessionState::Active(editor) = &mut self.state {
            if editor.status.as_ref().map_or(false, |s| now >= s.expires_at) {
                editor.status = None;
            }
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if let SessionState::Active(editor) = &mut self.state {
            editor.handle_pointer(&event, &self.config, self.now);
        }
    }

    /// Typed text for open prompts
    pub fn handle_char(&mut self, ch: char) {
        let SessionState::Active(editor) = &mut self.state else {
            return;
        };
        match &mut editor.modal {
            Some(Modal::SaveName(input)) | Some(Modal::SaveAuthor { input, .. }) => {
                input.insert_char(ch);
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, mods: Modifiers, host: &mut dyn EditorHost) {
        let SessionState::Active(editor) = &mut self.state else {
            return;
        };
        let mut env = Env {
            config: &self.config,
            store: &mut self.store,
            viewport: self.viewport,
            now: self.now,
        };

        let flow = if editor.modal.is_some() {
            modal_key(editor, key, &mut env)
        } else {
            match self.actions.resolve(key, mods, &editor.action_context()) {
                Some(id) => run_action(editor, id, &mut env, host),
                None => Flow::Stay,
            }
        };

        if flow == Flow::Exit {
            self.hide();
            tracing::info!("editor closed");
            host.return_from_editor();
        }
    }
}

fn run_action(editor: &mut ActiveEditor, id: &str, env: &mut Env, host: &mut dyn EditorHost) -> Flow {
    match id {
        ids::LAYER_TERRAIN => select_layer(editor, LayerKind::Terrain, env),
        ids::LAYER_GOALS => select_layer(editor, LayerKind::Goals, env),
        ids::LAYER_ENTITIES => select_layer(editor, LayerKind::Entities, env),
        ids::PALETTE_UP => step_palette(editor, Direction::Up, env),
        ids::PALETTE_DOWN => step_palette(editor, Direction::Down, env),
        ids::PALETTE_LEFT => step_palette(editor, Direction::Left, env),
        ids::PALETTE_RIGHT => step_palette(editor, Direction::Right, env),
        ids::TOGGLE_GRID => editor.show_grid = !editor.show_grid,
        ids::TEST_LEVEL => match world::validate(&editor.map, &env.config.roles()) {
            Ok(()) => {
                editor.set_status(env.now, StatusKind::Info, "Testing level");
                host.test_custom_level(editor.map.clone());
            }
            Err(e) => editor.set_status(env.now, StatusKind::Error, format!("Can't test: {}", e)),
        },
        ids::SAVE => match world::validate(&editor.map, &env.config.roles()) {
            Ok(()) => {
                let prefill = editor.level_name.clone().unwrap_or_default();
                editor.modal = Some(Modal::SaveName(TextInputState::new(prefill, MAX_NAME_CHARS)));
            }
            Err(e) => editor.set_status(env.now, StatusKind::Error, format!("Can't save: {}", e)),
        },
        ids::NEW => {
            if editor.dirty {
                editor.modal = Some(Modal::Confirm(PendingCommand::New));
            } else {
                new_map(editor, env);
            }
        }
        ids::OPEN => {
            if editor.dirty {
                editor.modal = Some(Modal::Confirm(PendingCommand::Open));
            } else {
                open_level_list(editor, env);
            }
        }
        ids::EXIT => {
            if editor.dirty {
                editor.modal = Some(Modal::Confirm(PendingCommand::Exit));
            } else {
                return Flow::Exit;
            }
        }
        other => tracing::debug!(action = other, "unhandled action"),
    }
    Flow::Stay
}

fn select_layer(editor: &mut ActiveEditor, layer: LayerKind, env: &Env) {
    editor.layer = layer;
    editor.tile = EMPTY_TILE;
    editor.relayout(env.config, env.viewport);
    editor.set_status(env.now, StatusKind::Info, format!("Layer: {}", layer.label()));
}

fn step_palette(editor: &mut ActiveEditor, direction: Direction, env: &Env) {
    let palette = env.config.palettes.tiles(editor.layer);
    editor.tile = select_next(palette, editor.palette.tiles_per_row, direction, editor.tile);
}

fn new_map(editor: &mut ActiveEditor, env: &mut Env) {
    match TileMap::create_empty(env.config.map_width, env.config.map_height) {
        Ok(map) => {
            editor.replace_map(map, None, env.config, env.viewport);
            editor.set_status(env.now, StatusKind::Info, "New map");
        }
        Err(e) => editor.set_status(env.now, StatusKind::Error, e.to_string()),
    }
}

fn open_level_list(editor: &mut ActiveEditor, env: &mut Env) {
    let levels = env.store.load_all();
    if levels.is_empty() {
        editor.set_status(env.now, StatusKind::Info, "No saved levels");
        return;
    }
    let selected = levels.len() - 1;
    editor.modal = Some(Modal::OpenLevel { levels, selected });
}

fn modal_key(editor: &mut ActiveEditor, key: KeyCode, env: &mut Env) -> Flow {
    let Some(modal) = editor.modal.take() else {
        return Flow::Stay;
    };

    if key == KeyCode::Escape {
        editor.set_status(env.now, StatusKind::Info, "Cancelled");
        return Flow::Stay;
    }

    match modal {
        Modal::SaveName(mut input) => {
            if key != KeyCode::Enter {
                input.handle_key(key);
                editor.modal = Some(Modal::SaveName(input));
                return Flow::Stay;
            }
            let name = input.value().trim().to_string();
            if name.is_empty() {
                editor.set_status(env.now, StatusKind::Error, "Level name is empty");
                return Flow::Stay;
            }
            let author = env.store.remembered_author().unwrap_or_default();
            editor.modal = Some(Modal::SaveAuthor {
                name,
                input: TextInputState::new(author, MAX_NAME_CHARS),
            });
        }
        Modal::SaveAuthor { name, mut input } => {
            if key != KeyCode::Enter {
                input.handle_key(key);
                editor.modal = Some(Modal::SaveAuthor { name, input });
                return Flow::Stay;
            }
            save_level(editor, &name, input.value(), env);
        }
        Modal::Confirm(command) => match key {
            KeyCode::Y | KeyCode::Enter => match command {
                PendingCommand::New => new_map(editor, env),
                PendingCommand::Open => open_level_list(editor, env),
                PendingCommand::Exit => return Flow::Exit,
            },
            KeyCode::N => editor.set_status(env.now, StatusKind::Info, "Cancelled"),
            _ => editor.modal = Some(Modal::Confirm(command)),
        },
        Modal::OpenLevel { levels, selected } => match key {
            KeyCode::Up => {
                let selected = selected.saturating_sub(1);
                editor.modal = Some(Modal::OpenLevel { levels, selected });
            }
            KeyCode::Down => {
                let selected = (selected + 1).min(levels.len().saturating_sub(1));
                editor.modal = Some(Modal::OpenLevel { levels, selected });
            }
            KeyCode::Enter => {
                if let Some(level) = levels.get(selected) {
                    load_level(editor, level, env);
                }
            }
            _ => editor.modal = Some(Modal::OpenLevel { levels, selected }),
        },
    }
    Flow::Stay
}

fn save_level(editor: &mut ActiveEditor, name: &str, author: &str, env: &mut Env) {
    match env.store.save(&editor.map, name, author) {
        Ok(level) => {
            editor.dirty = false;
            editor.level_name = Some(level.level_name.clone());
            if !author.trim().is_empty() {
                if let Err(e) = env.store.remember_author(author) {
                    tracing::warn!(error = %e, "could not remember author name");
                }
            }
            editor.set_status(env.now, StatusKind::Info, format!("Saved '{}'", level.level_name));
        }
        Err(e) => editor.set_status(env.now, StatusKind::Error, format!("Save failed: {}", e)),
    }
}

fn load_level(editor: &mut ActiveEditor, level: &PersistedLevel, env: &mut Env) {
    match level.to_tile_map() {
        Ok(map) => {
            editor.replace_map(map, Some(level.level_name.clone()), env.config, env.viewport);
            editor.set_status(env.now, StatusKind::Info, format!("Opened '{}'", level.level_name));
        }
        Err(e) => editor.set_status(
            env.now,
            StatusKind::Error,
            format!("Can't open '{}': {}", level.level_name, e),
        ),
    }
}
