//! Application shell
//!
//! Owns the editor session and the screens around it. The editor hands
//! control back through [`EditorHost`], which the shell implements on a
//! struct kept separate from the session so both can be borrowed at once.

use macroquad::prelude::*;

use crate::editor::{draw_editor, EditorHost, EditorSession};
use crate::tileset::Tileset;
use crate::ui::{Modifiers, PointerPoller, Rect};
use crate::world::{self, LayerKind, TileMap, TileRoles};

const BG: Color = Color::new(0.08, 0.08, 0.1, 1.0);
const TEXT: Color = Color::new(0.8, 0.8, 0.85, 1.0);
const TEXT_DIM: Color = Color::new(0.5, 0.5, 0.55, 1.0);
const ACCENT: Color = Color::new(0.0, 0.75, 0.9, 1.0);
const ERROR: Color = Color::new(1.0, 0.35, 0.3, 1.0);

/// Which screen receives input and draws this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Editor,
    Trial,
}

/// Everything outside the editor session
#[derive(Debug)]
pub struct Shell {
    screen: Screen,
    trial: Option<TileMap>,
    /// Last failure to open the editor, shown on the title screen
    notice: Option<String>,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            screen: Screen::Title,
            trial: None,
            notice: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn trial(&self) -> Option<&TileMap> {
        self.trial.as_ref()
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for Shell {
    fn test_custom_level(&mut self, level: TileMap) {
        tracing::info!(width = level.width(), height = level.height(), "testing custom level");
        self.trial = Some(level);
        self.screen = Screen::Trial;
    }

    fn return_from_editor(&mut self) {
        self.trial = None;
        self.screen = Screen::Title;
    }
}

pub struct AppState {
    pub shell: Shell,
    pub session: EditorSession,
    poller: PointerPoller,
}

impl AppState {
    pub fn new(session: EditorSession) -> Self {
        Self {
            shell: Shell::new(),
            session,
            poller: PointerPoller::default(),
        }
    }

    /// Open the editor from the title screen
    pub fn open_editor(&mut self) {
        match self.session.show() {
            Ok(()) => {
                self.shell.notice = None;
                self.shell.screen = Screen::Editor;
            }
            Err(e) => {
                tracing::error!(error = %e, "could not open editor");
                self.shell.notice = Some(e.to_string());
            }
        }
    }

    /// Route one key press to the current screen
    pub fn handle_key(&mut self, key: KeyCode, mods: Modifiers) {
        match self.shell.screen {
            Screen::Title => {
                if matches!(key, KeyCode::Enter | KeyCode::KpEnter | KeyCode::E) {
                    self.open_editor();
                }
            }
            Screen::Editor => self.session.handle_key(key, mods, &mut self.shell),
            Screen::Trial => {
                if key == KeyCode::Escape {
                    self.shell.trial = None;
                    self.shell.screen = Screen::Editor;
                }
            }
        }
    }

    /// Poll input for this frame and update the session
    ///
    /// Characters go first so the key that opens a prompt never types
    /// into it.
    pub fn update(&mut self) {
        self.session.update_layout(screen_width(), screen_height());
        self.session.tick(get_time());

        let mut chars = Vec::new();
        while let Some(ch) = get_char_pressed() {
            chars.push(ch);
        }
        let pointer = self.poller.poll();

        if self.shell.screen == Screen::Editor {
            for ch in chars {
                self.session.handle_char(ch);
            }
        }

        let mods = Modifiers::current();
        for key in get_keys_pressed() {
            let before = self.shell.screen;
            self.handle_key(key, mods);
            if self.shell.screen != before {
                break;
            }
        }

        if self.shell.screen == Screen::Editor {
            for event in pointer {
                self.session.handle_pointer(event);
            }
        }
    }

    pub fn draw(&self, tileset: &Tileset) {
        match self.shell.screen {
            Screen::Title => draw_title(self.shell.notice.as_deref()),
            Screen::Editor => draw_editor(&self.session, tileset, get_time()),
            Screen::Trial => {
                if let Some(map) = &self.shell.trial {
                    draw_trial(map, tileset, &self.session.config().roles());
                }
            }
        }
    }
}

fn draw_title(notice: Option<&str>) {
    clear_background(BG);
    let screen = Rect::screen(screen_width(), screen_height());
    let body = screen.centered(360.0_f32.min(screen.w), 140.0);
    draw_text("PUSHBOX", body.x, body.y + 40.0, 48.0, ACCENT);
    draw_text("Level editor", body.x, body.y + 70.0, 20.0, TEXT);
    draw_text("Enter / E to start editing", body.x, body.y + 110.0, 16.0, TEXT_DIM);
    if let Some(notice) = notice {
        draw_text(notice, body.x, body.y + 134.0, 16.0, ERROR);
    }
}

/// Read-only preview of the level handed over for testing
fn draw_trial(map: &TileMap, tileset: &Tileset, roles: &TileRoles) {
    clear_background(BG);
    let screen = Rect::screen(screen_width(), screen_height());
    let (top, footer) = (screen.remaining_after_bottom(48.0), screen.slice_bottom(48.0));

    let size = (top.w / map.width() as f32)
        .min(top.h / map.height() as f32)
        .floor()
        .max(1.0);
    let area = top.centered(size * map.width() as f32, size * map.height() as f32);
    for kind in LayerKind::ALL {
        for (cell, tile) in map.cells(kind) {
            let dest = Rect::new(area.x + cell.x as f32 * size, area.y + cell.y as f32 * size, size, size);
            tileset.draw_tile(kind, tile, dest);
        }
    }

    let verdict = match world::validate(map, roles) {
        Ok(()) => "Level is valid".to_string(),
        Err(e) => e.to_string(),
    };
    let line = format!(
        "Testing  |  {} boxes  |  {}  |  Esc to return to the editor",
        map.count(LayerKind::Entities, roles.box_tile),
        verdict
    );
    draw_text(&line, footer.x + 12.0, footer.y + 28.0, 16.0, TEXT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_starts_on_title() {
        let shell = Shell::default();
        assert_eq!(shell.screen(), Screen::Title);
        assert!(shell.trial().is_none());
    }

    #[test]
    fn test_host_handoff() {
        let mut shell = Shell::new();
        let map = TileMap::create_empty(4, 3).unwrap();
        shell.test_custom_level(map.clone());
        assert_eq!(shell.screen(), Screen::Trial);
        assert_eq!(shell.trial(), Some(&map));

        shell.return_from_editor();
        assert_eq!(shell.screen(), Screen::Title);
        assert!(shell.trial().is_none());
    }
}
