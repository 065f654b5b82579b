//! World module - level grid, document format and playability rules
//!
//! - `tile_map`: the three-layer grid the editor mutates
//! - `level`: Tiled JSON documents and file IO
//! - `validate`: the playability check run before saving or testing

mod level;
mod tile_map;
mod validate;

pub use level::*;
pub use tile_map::*;
pub use validate::*;
