//! PUSHBOX: a box-pushing puzzle shell with a built-in level editor
//!
//! Levels are three-layer tile grids (terrain, goals, entities) saved as
//! Tiled-style JSON documents into a small key-value store.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod editor;
mod storage;
mod tileset;
mod ui;
mod world;

use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

use app::AppState;
use config::EditorConfig;
use editor::EditorSession;
use storage::levels::LevelStore;
use storage::KeyValueStore;
use tileset::Tileset;

#[derive(Parser, Debug)]
#[command(name = "pushbox", version, about = "Box-pushing puzzle level editor")]
struct Args {
    /// Config file (RON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding saved levels
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Width of new maps, in cells
    #[arg(long)]
    width: Option<usize>,

    /// Height of new maps, in cells
    #[arg(long)]
    height: Option<usize>,

    /// Print the effective config as RON and exit
    #[arg(long)]
    print_config: bool,

    /// Write every saved level as a standalone map file into this directory and exit
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Append map files to the saved levels and exit
    #[arg(long, num_args = 1.., value_name = "FILE")]
    import: Vec<PathBuf>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("PUSHBOX v{}", VERSION),
        window_width: 1024,
        window_height: 768,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Config file plus command-line overrides
fn load_config(args: &Args) -> EditorConfig {
    let mut config = EditorConfig::load_or_default(args.config.as_deref());
    if let Some(width) = args.width {
        config.map_width = width;
    }
    if let Some(height) = args.height {
        config.map_height = height;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "invalid config, using defaults");
        let data_dir = config.data_dir.take();
        config = EditorConfig {
            data_dir,
            ..EditorConfig::default()
        };
    }
    config
}

#[cfg(not(target_arch = "wasm32"))]
fn open_storage(config: &EditorConfig) -> Box<dyn KeyValueStore> {
    let store = match &config.data_dir {
        Some(dir) => storage::LocalStorage::with_base_dir(dir.clone()),
        None => storage::LocalStorage::new(),
    };
    tracing::info!(dir = %store.base_dir().display(), "level storage");
    Box::new(store)
}

#[cfg(target_arch = "wasm32")]
fn open_storage(_config: &EditorConfig) -> Box<dyn KeyValueStore> {
    Box::new(storage::MemoryStorage::new())
}

fn open_levels(config: &EditorConfig) -> LevelStore<Box<dyn KeyValueStore>> {
    LevelStore::new(open_storage(config), config.roles(), config.map_metadata())
}

/// `--export-dir`: dump saved levels and report
fn export(config: &EditorConfig, dir: &Path) -> bool {
    let store = open_levels(config);
    let levels = store.load_all();
    match storage::levels::export_levels(&levels, dir) {
        Ok(paths) => {
            tracing::info!(count = paths.len(), dir = %dir.display(), "exported levels");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, dir = %dir.display(), "export failed");
            false
        }
    }
}

/// `--import`: append each file; one failure doesn't stop the rest
fn import(config: &EditorConfig, files: &[PathBuf]) -> bool {
    let mut store = open_levels(config);
    let mut ok = true;
    for file in files {
        match store.import_file(file) {
            Ok(level) => tracing::info!(file = %file.display(), name = %level.level_name, "imported level"),
            Err(e) => {
                tracing::error!(file = %file.display(), error = %e, "import failed");
                ok = false;
            }
        }
    }
    ok
}

/// Command-line work runs before any window exists
fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    init_logging();
    let args = Args::parse();
    let config = load_config(&args);

    if args.print_config {
        match config.to_ron_string() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                tracing::error!(error = %e, "could not serialize config");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(dir) = &args.export_dir {
        let ok = export(&config, dir);
        std::process::exit(if ok { 0 } else { 1 });
    }

    if !args.import.is_empty() {
        let ok = import(&config, &args.import);
        std::process::exit(if ok { 0 } else { 1 });
    }

    macroquad::Window::from_config(window_conf(), run(config));
}

async fn run(config: EditorConfig) {
    // Touches arrive as their own pointer events
    simulate_mouse_with_touch(false);

    let tileset = Tileset::load(&config.tileset, config.roles()).await;
    let storage = open_storage(&config);
    let mut app = AppState::new(EditorSession::new(config, storage));

    tracing::info!(version = VERSION, textured = tileset.has_texture(), "=== PUSHBOX ===");

    loop {
        app.update();
        app.draw(&tileset);
        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_without_window() {
        let args = Args::try_parse_from(["pushbox", "--width", "12", "--print-config"]).unwrap();
        assert_eq!(args.width, Some(12));
        assert!(args.print_config);
        assert!(args.import.is_empty());

        let args = Args::try_parse_from(["pushbox", "--import", "a.json", "b.json"]).unwrap();
        assert_eq!(args.import, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);

        assert!(Args::try_parse_from(["pushbox", "--bogus"]).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("none.ron");
        let missing = missing.to_str().unwrap();
        let args = Args::try_parse_from(["pushbox", "--config", missing, "--height", "9"]).unwrap();
        let config = load_config(&args);
        assert_eq!(config.map_height, 9);
    }

    #[test]
    fn test_import_failure_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EditorConfig {
            data_dir: Some(dir.path().join("data")),
            ..EditorConfig::default()
        };
        assert!(!import(&config, &[dir.path().join("missing.json")]));
        assert!(open_levels(&config).load_all().is_empty());
        assert!(export(&config, &dir.path().join("out")));
    }
}
