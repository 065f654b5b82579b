//! Pointer and modifier input
//!
//! Mouse and touch arrive as the same `PointerEvent` stream. A gesture
//! belongs to whichever source pressed first; the other source is ignored
//! until that gesture ends.

use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    pub source: PointerSource,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32, source: PointerSource) -> Self {
        Self { kind, x, y, source }
    }

    pub fn mouse(kind: PointerKind, x: f32, y: f32) -> Self {
        Self::new(kind, x, y, PointerSource::Mouse)
    }

    pub fn touch(kind: PointerKind, x: f32, y: f32) -> Self {
        Self::new(kind, x, y, PointerSource::Touch)
    }
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool, // Cmd on Mac
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    /// Read the modifiers held this frame
    pub fn current() -> Self {
        Self {
            ctrl: is_key_down(KeyCode::LeftControl)
                || is_key_down(KeyCode::RightControl)
                || is_key_down(KeyCode::LeftSuper)
                || is_key_down(KeyCode::RightSuper),
            shift: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
            alt: is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt),
        }
    }
}

/// Tracks which source owns the current gesture
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerGate {
    owner: Option<PointerSource>,
}

impl PointerGate {
    /// Whether `event` should be handled. Updates ownership.
    pub fn accept(&mut self, event: &PointerEvent) -> bool {
        match (event.kind, self.owner) {
            (PointerKind::Down, None) => {
                self.owner = Some(event.source);
                true
            }
            (PointerKind::Up, Some(owner)) if owner == event.source => {
                self.owner = None;
                true
            }
            (_, Some(owner)) => owner == event.source && event.kind == PointerKind::Move,
            (_, None) => event.kind == PointerKind::Move,
        }
    }

    /// True while a press is held
    pub fn is_pressed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn reset(&mut self) {
        self.owner = None;
    }
}

/// Tracks raw macroquad mouse and touch state between frames
#[derive(Debug, Default)]
pub struct PointerPoller {
    mouse_down: bool,
    last_mouse: (f32, f32),
}

impl PointerPoller {
    /// Collect this frame's pointer events
    pub fn poll(&mut self) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        for touch in touches() {
            let kind = match touch.phase {
                TouchPhase::Started => PointerKind::Down,
                TouchPhase::Moved | TouchPhase::Stationary => PointerKind::Move,
                TouchPhase::Ended | TouchPhase::Cancelled => PointerKind::Up,
            };
            events.push(PointerEvent::touch(kind, touch.position.x, touch.position.y));
        }

        let (mx, my) = mouse_position();
        let down = is_mouse_button_down(MouseButton::Left);
        if down && !self.mouse_down {
            events.push(PointerEvent::mouse(PointerKind::Down, mx, my));
        } else if !down && self.mouse_down {
            events.push(PointerEvent::mouse(PointerKind::Up, mx, my));
        } else if (mx, my) != self.last_mouse {
            events.push(PointerEvent::mouse(PointerKind::Move, mx, my));
        }
        self.mouse_down = down;
        self.last_mouse = (mx, my);

        events
    }
}
