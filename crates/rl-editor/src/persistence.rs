//! Saving and reading room layouts through a string key-value store.

use crate::error::{EditorError, StoreError};
use crate::registry::ItemRegistry;
use rl_core::config::EditorConfig;
use rl_core::model::{Color, RoomAppearance};
use rl_core::snapshot::{LayoutSnapshot, SnapshotItem, StoredLayout};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// Durable string storage.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        // Temp file plus rename: readers see the old or the new value, never half.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }
}

/// Snapshot, save and read layouts under the configured keys.
#[derive(Debug, Clone)]
pub struct LayoutPersistence<K> {
    store: K,
    layout_key: String,
    floor_color_key: String,
    wall_color_key: String,
}

impl<K: KvStore> LayoutPersistence<K> {
    pub fn new(store: K, config: &EditorConfig) -> Self {
        Self {
            store,
            layout_key: config.layout_key.clone(),
            floor_color_key: config.floor_color_key.clone(),
            wall_color_key: config.wall_color_key.clone(),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    pub fn layout_key(&self) -> &str {
        &self.layout_key
    }

    /// The current layout as a record, items in registry order.
    pub fn snapshot<H>(registry: &ItemRegistry<H>, appearance: &RoomAppearance) -> LayoutSnapshot
    where
        H: Copy + Eq + Hash + Debug,
    {
        LayoutSnapshot {
            items: registry
                .list()
                .iter()
                .map(|item| SnapshotItem::new(item.provenance(), &item.transform, Some(&item.label)))
                .collect(),
            floor_color: Some(appearance.floor),
            wall_color: Some(appearance.wall),
        }
    }

    /// Serialize first, then write once; a failed serialization never
    /// touches the stored layout.
    pub fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), EditorError> {
        let json = snapshot.to_json()?;
        self.store.put(&self.layout_key, &json)?;
        log::info!("saved {} items under {:?}", snapshot.items.len(), self.layout_key);
        Ok(())
    }

    /// The stored layout, or `None` if nothing was ever saved.
    pub fn read(&self) -> Result<Option<LayoutSnapshot>, EditorError> {
        let Some(text) = self.store.get(&self.layout_key)? else {
            return Ok(None);
        };
        let stored = StoredLayout::parse(&text)?;
        if !stored.is_legacy() {
            return Ok(Some(stored.into_snapshot(None, None)));
        }
        log::debug!("reading layout in array format");
        let floor = self.legacy_color(&self.floor_color_key)?;
        let wall = self.legacy_color(&self.wall_color_key)?;
        Ok(Some(stored.into_snapshot(floor, wall)))
    }

    fn legacy_color(&self, key: &str) -> Result<Option<Color>, StoreError> {
        let value = self.store.get(key)?;
        Ok(value.and_then(|text| {
            let color = Color::from_hex(text.trim().trim_matches('"'));
            if color.is_none() {
                log::warn!("ignoring unreadable color {text:?} under {key:?}");
            }
            color
        }))
    }
}
