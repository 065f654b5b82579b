//! Single-line text field with cursor editing
//!
//! The state is fed key codes and characters by its owner, so prompts
//! can be driven without a window.

use macroquad::prelude::*;
use super::Rect;

/// State for a text input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputState {
    pub text: String,
    /// Cursor position (byte index)
    pub cursor: usize,
    /// Maximum length in characters
    max_chars: usize,
}

impl TextInputState {
    pub fn new(text: impl Into<String>, max_chars: usize) -> Self {
        let text: String = text.into().chars().take(max_chars).collect();
        let cursor = text.len();
        Self {
            text,
            cursor,
            max_chars,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.text.len())
    }

    /// Insert a printable character at the cursor
    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.text.chars().count() >= self.max_chars {
            return false;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        true
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    /// Delete character after cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        let next = self.next_boundary();
        self.text.drain(self.cursor..next);
        true
    }

    /// Apply an editing key. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Delete => {
                self.delete();
            }
            _ => return false,
        }
        true
    }

    pub fn value(&self) -> &str {
        &self.text
    }
}

const INPUT_BG: Color = Color::new(0.12, 0.12, 0.14, 1.0);
const INPUT_BORDER: Color = Color::new(0.0, 0.75, 0.9, 1.0);
const INPUT_TEXT: Color = Color::new(0.8, 0.8, 0.85, 1.0);
const INPUT_CURSOR: Color = Color::new(0.9, 0.9, 0.95, 1.0);

/// Draw a text field with a blinking cursor
pub fn draw_text_input(rect: Rect, state: &TextInputState, font_size: f32, time: f64) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, INPUT_BG);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, INPUT_BORDER);

    let padding = 8.0;
    let text_x = rect.x + padding;
    let text_y = rect.y + (rect.h + font_size * 0.7) / 2.0;
    draw_text(&state.text, text_x, text_y, font_size, INPUT_TEXT);

    if time.fract() < 0.5 {
        let before = &state.text[..state.cursor];
        let cursor_x = text_x + measure_text(before, None, font_size as u16, 1.0).width;
        draw_line(cursor_x, rect.y + 6.0, cursor_x, rect.y + rect.h - 6.0, 1.5, INPUT_CURSOR);
    }
}
