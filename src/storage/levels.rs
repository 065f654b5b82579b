//! Saved level list
//!
//! All custom levels live in one append-only JSON array under a single key.
//! Entries are never rewritten or removed here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{KeyValueStore, StorageError};
use crate::world::{self, MapDocument, MapError, MapMetadata, TileMap, TileRoles, ValidationError};

/// Key holding the JSON array of saved levels
pub const LEVELS_KEY: &str = "pushbox.customLevels";
/// Key holding the last author name used
pub const AUTHOR_KEY: &str = "pushbox.authorName";
/// Author recorded when none is given
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// A map document plus the level's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLevel {
    #[serde(flatten)]
    pub document: MapDocument,
    pub level_name: String,
    pub author_name: String,
    /// RFC 3339 timestamp
    pub created_date: String,
}

impl PersistedLevel {
    pub fn to_tile_map(&self) -> Result<TileMap, MapError> {
        self.document.to_tile_map()
    }

    /// Creation date as `YYYY-MM-DD`, or the raw text if it doesn't parse
    pub fn created_label(&self) -> String {
        DateTime::parse_from_rfc3339(&self.created_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.created_date.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("level name is empty")]
    EmptyName,
    #[error("level is not playable: {0}")]
    ValidationFailed(#[from] ValidationError),
    #[error("could not write levels: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read map: {0}")]
    Map(#[from] MapError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// The saved-level list over a key-value backend
pub struct LevelStore<S> {
    storage: S,
    roles: TileRoles,
    meta: MapMetadata,
}

impl<S: KeyValueStore> LevelStore<S> {
    pub fn new(storage: S, roles: TileRoles, meta: MapMetadata) -> Self {
        Self {
            storage,
            roles,
            meta,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate and append a level to the stored list
    pub fn save(&mut self, map: &TileMap, name: &str, author: &str) -> Result<PersistedLevel, SaveError> {
        world::validate(map, &self.roles)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(SaveError::EmptyName);
        }
        let author = match author.trim() {
            "" => DEFAULT_AUTHOR,
            a => a,
        };

        let mut levels = self.read_for_append()?;
        let level = PersistedLevel {
            document: MapDocument::from_map(map, &self.meta),
            level_name: name.to_string(),
            author_name: author.to_string(),
            created_date: Utc::now().to_rfc3339(),
        };
        levels.push(level.clone());

        let json = serde_json::to_string(&levels).map_err(StorageError::from)?;
        self.storage.write(LEVELS_KEY, &json)?;
        tracing::info!(name, author, total = levels.len(), "level saved");
        Ok(level)
    }

    /// Append a standalone map file as a new level
    ///
    /// The level is named after the file, minus the `NNN-` prefix that
    /// [`export_levels`] adds, and credited to the remembered author.
    pub fn import_file(&mut self, path: &Path) -> Result<PersistedLevel, ImportError> {
        let map = world::load_map(path)?;
        let name = level_name_for(path);
        let author = self.remembered_author().unwrap_or_default();
        Ok(self.save(&map, &name, &author)?)
    }

    /// All stored levels, oldest first. Absent or unreadable storage reads as empty.
    pub fn load_all(&self) -> Vec<PersistedLevel> {
        match self.storage.read(LEVELS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(levels) => levels,
                Err(e) => {
                    tracing::warn!(error = %e, "stored level list is corrupt, reading as empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored levels");
                Vec::new()
            }
        }
    }

    /// Current list for appending. A corrupt list is copied aside before
    /// it gets replaced; a failed read aborts so nothing is overwritten.
    fn read_for_append(&mut self) -> Result<Vec<PersistedLevel>, StorageError> {
        let Some(raw) = self.storage.read(LEVELS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(levels) => Ok(levels),
            Err(e) => {
                let backup = self.free_backup_key(LEVELS_KEY)?;
                tracing::warn!(error = %e, backup = %backup, "backing up corrupt level list");
                self.storage.write(&backup, &raw)?;
                Ok(Vec::new())
            }
        }
    }

    /// First backup slot for `key` that holds nothing yet
    fn free_backup_key(&self, key: &str) -> Result<String, StorageError> {
        let mut n = 1;
        loop {
            let candidate = corrupt_key(key, n);
            if self.storage.read(&candidate)?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Last author name used, if any
    pub fn remembered_author(&self) -> Option<String> {
        let raw = match self.storage.read(AUTHOR_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "could not read author name");
                return None;
            }
        };
        let name = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn remember_author(&mut self, name: &str) -> Result<(), StorageError> {
        let json = serde_json::to_string(name.trim())?;
        self.storage.write(AUTHOR_KEY, &json)
    }
}

/// Key of the `n`th backup of an unreadable value, counting from 1
pub fn corrupt_key(key: &str, n: u32) -> String {
    if n <= 1 {
        format!("{}.corrupt", key)
    } else {
        format!("{}.corrupt.{}", key, n)
    }
}

/// Write each level as a standalone map document in `dir`
///
/// Returns the written paths in list order.
pub fn export_levels(levels: &[PersistedLevel], dir: &Path) -> Result<Vec<PathBuf>, MapError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(levels.len());
    for (i, level) in levels.iter().enumerate() {
        let path = dir.join(format!("{:03}-{}.json", i + 1, file_stem(&level.level_name)));
        world::save_document(&level.document, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Level name for an imported file: its stem without an export index
fn level_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.split_once('-') {
        Some((index, rest)) if !index.is_empty() && !rest.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
            rest.to_string()
        }
        _ => stem,
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if stem.is_empty() {
        "level".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::world::{LayerKind, BOX_TILE, PLAYER_TILE};

    fn playable_map() -> TileMap {
        let mut map = TileMap::create_empty(8, 6).unwrap();
        map.set_tile(LayerKind::Terrain, 0, 0, 98);
        map.set_tile(LayerKind::Entities, 1, 1, PLAYER_TILE);
        map.set_tile(LayerKind::Entities, 3, 3, BOX_TILE);
        map.set_tile(LayerKind::Goals, 4, 3, 102);
        map
    }

    fn memory_store() -> LevelStore<MemoryStorage> {
        LevelStore::new(MemoryStorage::new(), TileRoles::default(), MapMetadata::default())
    }

    /// Backend whose writes always fail
    struct ReadOnlyStore(MemoryStorage);

    impl KeyValueStore for ReadOnlyStore {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.read(key)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::IoError("disk full".to_string()))
        }
    }

    #[test]
    fn test_save_appends() {
        let mut store = memory_store();
        assert!(store.load_all().is_empty());

        store.save(&playable_map(), "First", "Ada").unwrap();
        store.save(&playable_map(), "Second", "Ada").unwrap();

        let levels = store.load_all();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level_name, "First");
        assert_eq!(levels[1].level_name, "Second");
        assert_eq!(levels[0].to_tile_map().unwrap(), playable_map());
    }

    #[test]
    fn test_duplicate_names_kept() {
        let mut store = memory_store();
        store.save(&playable_map(), "Same", "").unwrap();
        store.save(&playable_map(), "Same", "").unwrap();
        assert_eq!(store.load_all().len(), 2);
    }

    #[test]
    fn test_persisted_fields() {
        let mut store = memory_store();
        store.save(&playable_map(), "Level", "Ada").unwrap();

        let raw = store.storage().read(LEVELS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value[0];
        assert_eq!(entry["levelName"], "Level");
        assert_eq!(entry["authorName"], "Ada");
        assert_eq!(entry["type"], "map");
        assert_eq!(entry["layers"].as_array().unwrap().len(), 3);
        let created = entry["createdDate"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn test_blank_author_defaults() {
        let mut store = memory_store();
        let level = store.save(&playable_map(), "Level", "   ").unwrap();
        assert_eq!(level.author_name, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = memory_store();
        assert_eq!(store.save(&playable_map(), "  ", "Ada"), Err(SaveError::EmptyName));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_unplayable_rejected() {
        let mut store = memory_store();
        let map = TileMap::create_empty(8, 6).unwrap();
        assert_eq!(
            store.save(&map, "Level", "Ada"),
            Err(SaveError::ValidationFailed(ValidationError::MissingPlayer { found: 0 }))
        );
        assert_eq!(store.storage().read(LEVELS_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_list_reads_empty_and_is_backed_up() {
        let mut backend = MemoryStorage::new();
        backend.write(LEVELS_KEY, "{ not a list").unwrap();
        let mut store = LevelStore::new(backend, TileRoles::default(), MapMetadata::default());

        assert!(store.load_all().is_empty());

        store.save(&playable_map(), "Fresh", "Ada").unwrap();
        assert_eq!(store.load_all().len(), 1);
        let backup = store.storage().read(&corrupt_key(LEVELS_KEY, 1)).unwrap();
        assert_eq!(backup.as_deref(), Some("{ not a list"));
    }

    #[test]
    fn test_second_corruption_keeps_first_backup() {
        let mut store = memory_store();
        store.storage.write(LEVELS_KEY, "first garbage").unwrap();
        store.save(&playable_map(), "One", "Ada").unwrap();

        store.storage.write(LEVELS_KEY, "second garbage").unwrap();
        store.save(&playable_map(), "Two", "Ada").unwrap();

        let read = |n| store.storage().read(&corrupt_key(LEVELS_KEY, n)).unwrap();
        assert_eq!(read(1).as_deref(), Some("first garbage"));
        assert_eq!(read(2).as_deref(), Some("second garbage"));
        assert_eq!(read(3), None);
        assert_eq!(store.load_all().len(), 1);
        assert_eq!(store.load_all()[0].level_name, "Two");
    }

    #[test]
    fn test_corrupt_key_numbering() {
        assert_eq!(corrupt_key("k", 1), "k.corrupt");
        assert_eq!(corrupt_key("k", 2), "k.corrupt.2");
    }

    /// Backend that can't be read; counts attempted writes
    #[derive(Default)]
    struct FailingReadStore {
        writes: usize,
    }

    impl KeyValueStore for FailingReadStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::IoError("permission denied".to_string()))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_read_failure_loads_empty_and_blocks_save() {
        let mut store = LevelStore::new(FailingReadStore::default(), TileRoles::default(), MapMetadata::default());
        assert!(store.load_all().is_empty());
        assert_eq!(store.remembered_author(), None);

        let result = store.save(&playable_map(), "Level", "Ada");
        assert!(matches!(result, Err(SaveError::Storage(_))));
        assert_eq!(store.storage().writes, 0);
    }

    #[test]
    fn test_write_failure_leaves_list_untouched() {
        let mut backend = MemoryStorage::new();
        let mut seeded = LevelStore::new(&mut backend, TileRoles::default(), MapMetadata::default());
        seeded.save(&playable_map(), "Kept", "Ada").unwrap();
        let before = backend.read(LEVELS_KEY).unwrap();

        let mut store = LevelStore::new(ReadOnlyStore(backend), TileRoles::default(), MapMetadata::default());
        let result = store.save(&playable_map(), "Lost", "Ada");
        assert!(matches!(result, Err(SaveError::Storage(_))));
        assert_eq!(store.storage().0.read(LEVELS_KEY).unwrap(), before);
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn test_author_memory() {
        let mut store = memory_store();
        assert_eq!(store.remembered_author(), None);
        store.remember_author("  Grace ").unwrap();
        assert_eq!(store.remembered_author().as_deref(), Some("Grace"));
    }

    #[test]
    fn test_author_plain_text_accepted() {
        let mut backend = MemoryStorage::new();
        backend.write(AUTHOR_KEY, "Linus").unwrap();
        let store = LevelStore::new(backend, TileRoles::default(), MapMetadata::default());
        assert_eq!(store.remembered_author().as_deref(), Some("Linus"));
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = crate::storage::LocalStorage::with_base_dir(dir.path());
        let mut store = LevelStore::new(backend, TileRoles::default(), MapMetadata::default());
        store.save(&playable_map(), "On disk", "Ada").unwrap();

        let reopened = LevelStore::new(
            crate::storage::LocalStorage::with_base_dir(dir.path()),
            TileRoles::default(),
            MapMetadata::default(),
        );
        assert_eq!(reopened.load_all()[0].level_name, "On disk");
    }

    #[test]
    fn test_export_levels() {
        let mut store = memory_store();
        store.save(&playable_map(), "Box Room!", "Ada").unwrap();
        store.save(&playable_map(), "Second", "Ada").unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let paths = export_levels(&store.load_all(), dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("001-box_room_.json"));
        assert_eq!(world::load_map(&paths[1]).unwrap(), playable_map());
    }

    #[test]
    fn test_import_exported_file() {
        let mut source = memory_store();
        source.save(&playable_map(), "Box Room", "Ada").unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let paths = export_levels(&source.load_all(), dir.path()).unwrap();

        let mut target = memory_store();
        target.remember_author("Grace").unwrap();
        let level = target.import_file(&paths[0]).unwrap();
        assert_eq!(level.level_name, "box_room");
        assert_eq!(level.author_name, "Grace");
        assert_eq!(target.load_all()[0].to_tile_map().unwrap(), playable_map());
    }

    #[test]
    fn test_import_rejects_bad_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = memory_store();

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(store.import_file(&garbage), Err(ImportError::Map(_))));

        let empty = dir.path().join("empty.json");
        let doc = MapDocument::from_map(&TileMap::create_empty(4, 4).unwrap(), &MapMetadata::default());
        world::save_document(&doc, &empty).unwrap();
        assert!(matches!(
            store.import_file(&empty),
            Err(ImportError::Save(SaveError::ValidationFailed(_)))
        ));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_level_name_for() {
        assert_eq!(level_name_for(Path::new("out/007-castle.json")), "castle");
        assert_eq!(level_name_for(Path::new("my-level.json")), "my-level");
        assert_eq!(level_name_for(Path::new("12-.json")), "12-");
        assert_eq!(level_name_for(Path::new("plain.json")), "plain");
    }
}
