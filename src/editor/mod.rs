//! Level editor
//!
//! - `state`: the session state machine and its event handlers
//! - `grid_view`: grid placement and pointer-to-cell mapping
//! - `palette`: per-layer tile palettes and keyboard navigation
//! - `actions`: keyboard command table
//! - `layout`: drawing

mod actions;
mod grid_view;
mod layout;
mod palette;
mod state;

pub use layout::draw_editor;
pub use state::{EditorHost, EditorSession};
