use crate::model::{FavoriteSet, Mirror};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::RuntimeFlavor;
use tracing::{error, warn};

pub const KEY_VOLUME: &str = "volume";
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_MIRROR: &str = "server_name";

/// String key-value persistence. Writes are expected to be durable when
/// `set` returns.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Key-value store kept as a flat JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(path: &Path) -> HashMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[prefs] ignoring unreadable {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    /// Writes through to disk. On a multi-threaded runtime the worker is
    /// handed off first so the file I/O doesn't stall other tasks.
    fn write_entries(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.write_file(entries))
            }
            _ => self.write_file(entries),
        }
    }

    fn write_file(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("prefs store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

/// In-process store, used when nothing should touch the disk.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the persisted volume, favorites and mirror.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
    toggle_lock: Arc<Mutex<()>>,
    default_volume: u8,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            toggle_lock: Arc::new(Mutex::new(())),
            default_volume: 100,
        }
    }

    pub fn with_default_volume(mut self, volume: u8) -> Self {
        self.default_volume = volume.min(100);
        self
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn load_volume(&self) -> u8 {
        self.store
            .get(KEY_VOLUME)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|v| v.min(100) as u8)
            .unwrap_or(self.default_volume)
    }

    pub fn save_volume(&self, volume: u8) -> anyhow::Result<()> {
        self.store.set(KEY_VOLUME, &volume.min(100).to_string())
    }

    /// Persisted favorites. A corrupt value reads as no favorites.
    pub fn favorites(&self) -> FavoriteSet {
        let Some(raw) = self.store.get(KEY_FAVORITES) else {
            return FavoriteSet::default();
        };
        match serde_json::from_str::<FavoriteSet>(&raw) {
            Ok(set) => set,
            Err(e) => {
                error!("[prefs] favorites value is not a JSON string array: {}", e);
                FavoriteSet::default()
            }
        }
    }

    pub fn save_favorites(&self, favorites: &FavoriteSet) -> anyhow::Result<()> {
        let json = serde_json::to_string(favorites)?;
        self.store.set(KEY_FAVORITES, &json)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites().contains(id)
    }

    /// Flips membership of `id` and persists the result. Returns whether
    /// `id` is a favorite afterwards.
    pub fn toggle_favorite(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self
            .toggle_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites lock poisoned"))?;
        let mut favorites = self.favorites();
        let now_favorite = favorites.toggle(id);
        self.save_favorites(&favorites)?;
        Ok(now_favorite)
    }

    pub fn load_mirror(&self) -> Option<Mirror> {
        self.store
            .get(KEY_MIRROR)
            .filter(|name| !name.trim().is_empty())
            .map(Mirror::new)
    }

    pub fn save_mirror(&self, mirror: &Mirror) -> anyhow::Result<()> {
        self.store.set(KEY_MIRROR, mirror.hostname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_persisted_content() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_FAVORITES, r#"["a"]"#).unwrap();
        let prefs = Preferences::new(store.clone());

        assert!(prefs.toggle_favorite("b").unwrap());
        assert!(prefs.is_favorite("b"));
        assert_eq!(store.get(KEY_FAVORITES).as_deref(), Some(r#"["a","b"]"#));

        assert!(!prefs.toggle_favorite("b").unwrap());
        assert!(!prefs.is_favorite("b"));
        assert_eq!(store.get(KEY_FAVORITES).as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn test_corrupt_favorites_read_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_FAVORITES, "{not json").unwrap();
        let prefs = Preferences::new(store);
        assert!(prefs.favorites().is_empty());
        assert!(prefs.toggle_favorite("x").unwrap());
        assert_eq!(prefs.favorites().ids(), ["x".to_string()]);
    }

    #[test]
    fn test_volume_defaults_and_clamps() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone()).with_default_volume(80);
        assert_eq!(prefs.load_volume(), 80);

        store.set(KEY_VOLUME, "250").unwrap();
        assert_eq!(prefs.load_volume(), 100);

        store.set(KEY_VOLUME, "loud").unwrap();
        assert_eq!(prefs.load_volume(), 80);

        prefs.save_volume(35).unwrap();
        assert_eq!(store.get(KEY_VOLUME).as_deref(), Some("35"));
        assert_eq!(prefs.load_volume(), 35);
    }

    #[test]
    fn test_blank_mirror_is_not_a_mirror() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        assert_eq!(prefs.load_mirror(), None);
        store.set(KEY_MIRROR, "  ").unwrap();
        assert_eq!(prefs.load_mirror(), None);
        prefs.save_mirror(&Mirror::new("a.example")).unwrap();
        assert_eq!(prefs.load_mirror(), Some(Mirror::new("a.example")));
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let prefs = Preferences::new(Arc::new(JsonFileStore::open(&path)));
        prefs.save_volume(42).unwrap();
        prefs.toggle_favorite("station-1").unwrap();
        prefs.save_mirror(&Mirror::new("nl1.api.radio-browser.info")).unwrap();

        let reopened = Preferences::new(Arc::new(JsonFileStore::open(&path)));
        assert_eq!(reopened.load_volume(), 42);
        assert!(reopened.is_favorite("station-1"));
        assert_eq!(
            reopened.load_mirror().map(|m| m.hostname().to_string()),
            Some("nl1.api.radio-browser.info".to_string())
        );

        let raw: HashMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("favorites").map(String::as_str), Some(r#"["station-1"]"#));
    }

    #[test]
    fn test_json_file_store_ignores_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(KEY_VOLUME), None);
        store.set(KEY_VOLUME, "10").unwrap();
        assert_eq!(JsonFileStore::open(&path).get(KEY_VOLUME).as_deref(), Some("10"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_json_file_store_writes_from_runtime_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let prefs = Preferences::new(Arc::new(JsonFileStore::open(&path)));

        let writer = prefs.clone();
        tokio::spawn(async move {
            for volume in [10, 20, 30] {
                writer.save_volume(volume).unwrap();
            }
            writer.toggle_favorite("s1").unwrap();
        })
        .await
        .unwrap();

        let reopened = Preferences::new(Arc::new(JsonFileStore::open(&path)));
        assert_eq!(reopened.load_volume(), 30);
        assert!(reopened.is_favorite("s1"));
    }
}
