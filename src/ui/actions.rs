//! Keyboard command table
//!
//! Commands are registered once with an id, a label and a key. A key press
//! resolves to the id of the first matching command, unless a prompt has
//! the keyboard.
//!
//! ```ignore
//! let mut registry = ActionRegistry::new();
//! registry.register(Action::new("file.save").label("Save").shortcut(Shortcut::key(KeyCode::S)));
//! if let Some(id) = registry.resolve(key, mods, &ctx) {
//!     dispatch(id);
//! }
//! ```

use macroquad::prelude::KeyCode;

use super::Modifiers;

/// Key plus optional Ctrl (Cmd on Mac)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key: KeyCode,
    pub ctrl: bool,
}

impl Shortcut {
    pub const fn key(key: KeyCode) -> Self {
        Self { key, ctrl: false }
    }

    /// Shift is ignored so caps-lock style input still triggers commands
    pub fn matches(&self, key: KeyCode, mods: Modifiers) -> bool {
        self.key == key && self.ctrl == mods.ctrl && !mods.alt
    }

    pub fn display(&self) -> String {
        let prefix = match (self.ctrl, cfg!(target_os = "macos")) {
            (false, _) => "",
            (true, true) => "⌘",
            (true, false) => "Ctrl+",
        };
        format!("{}{}", prefix, key_name(self.key))
    }
}

fn key_name(key: KeyCode) -> &'static str {
    match key {
        KeyCode::G => "G",
        KeyCode::N => "N",
        KeyCode::O => "O",
        KeyCode::S => "S",
        KeyCode::T => "T",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Escape => "Esc",
        KeyCode::Enter => "Enter",
        KeyCode::Up => "↑",
        KeyCode::Down => "↓",
        KeyCode::Left => "←",
        KeyCode::Right => "→",
        _ => "?",
    }
}

/// Editor flags commands are evaluated against
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionContext {
    /// A prompt or confirmation has keyboard focus
    pub modal_open: bool,
    pub grid_visible: bool,
}

type Predicate = fn(&ActionContext) -> bool;

#[derive(Clone)]
pub struct Action {
    pub id: &'static str,
    pub label: &'static str,
    pub shortcut: Option<Shortcut>,
    /// Help bar group
    pub category: &'static str,
    checked: Option<Predicate>,
}

impl Action {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            label: id,
            shortcut: None,
            category: "General",
            checked: None,
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    /// Mark as a toggle whose state `f` reports
    pub fn checked_when(mut self, f: Predicate) -> Self {
        self.checked = Some(f);
        self
    }

    pub fn is_checked(&self, ctx: &ActionContext) -> bool {
        self.checked.map_or(false, |f| f(ctx))
    }

    /// Help bar entry, e.g. "S Save"
    pub fn hint(&self) -> String {
        match self.shortcut {
            Some(shortcut) => format!("{} {}", shortcut.display(), self.label),
            None => self.label.to_string(),
        }
    }
}

/// Commands in registration order
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command, replacing any with the same id. A shortcut already
    /// bound elsewhere is logged and left to the earlier command.
    pub fn register(&mut self, action: Action) {
        if let Some(shortcut) = action.shortcut {
            if let Some(owner) = self
                .actions
                .iter()
                .find(|a| a.id != action.id && a.shortcut == Some(shortcut))
            {
                tracing::warn!(
                    shortcut = %shortcut.display(),
                    owner = owner.id,
                    action = action.id,
                    "shortcut already bound"
                );
            }
        }
        match self.actions.iter_mut().find(|a| a.id == action.id) {
            Some(slot) => *slot = action,
            None => self.actions.push(action),
        }
    }

    /// Command bound to this key press, if the keyboard is free
    pub fn resolve(&self, key: KeyCode, mods: Modifiers, ctx: &ActionContext) -> Option<&'static str> {
        if ctx.modal_open {
            return None;
        }
        self.actions
            .iter()
            .find(|a| a.shortcut.map_or(false, |s| s.matches(key, mods)))
            .map(|a| a.id)
    }

    pub fn actions_in_category(&self, category: &str) -> Vec<&Action> {
        self.actions.iter().filter(|a| a.category == category).collect()
    }
}
