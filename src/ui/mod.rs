//! UI building blocks shared by the editor and the host screens

mod actions;
mod input;
mod rect;
mod text_input;

pub use actions::*;
pub use input::*;
pub use rect::*;
pub use text_input::*;
