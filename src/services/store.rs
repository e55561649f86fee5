use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A durable string-keyed store with prefix enumeration.
///
/// Writes are plain overwrites: the last `set` to land wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name, reported by the debug endpoint.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

fn matching_keys<'a>(keys: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<String> {
    let mut matched: Vec<String> = keys.filter(|key| key.starts_with(prefix)).cloned().collect();
    matched.sort();
    matched
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(matching_keys(entries.keys(), prefix))
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The whole map is kept in memory and rewritten to a temporary file, then
/// renamed over the old one, after every `set`. The rewrite runs on the
/// blocking pool with the map locked, so writes land on disk in lock order.
pub struct FileStore {
    path: PathBuf,
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl FileStore {
    /// Open the store at `path`, creating the file (and its parent directory)
    /// if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let file = File::open(&path)?;
            let entries: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))?;
            info!(
                "Loaded {} store entries from {}",
                entries.len(),
                path.display()
            );
            entries
        } else {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            info!("Creating new store file at {}", path.display());
            let entries = HashMap::new();
            Self::write_file(&path, &entries)?;
            entries
        };

        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(path: &Path, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, entries)?;
            std::io::Write::flush(&mut writer)?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let entries = Arc::clone(&self.entries);
        let path = self.path.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            let mut entries = entries.lock().map_err(|_| StoreError::Poisoned)?;
            let previous = entries.insert(key.clone(), value);

            if let Err(e) = Self::write_file(&path, &entries) {
                // Keep memory consistent with what is on disk
                match previous {
                    Some(old) => entries.insert(key, old),
                    None => entries.remove(&key),
                };
                return Err(e);
            }

            debug!("Persisted key {} to {}", key, path.display());
            Ok(())
        })
        .await?
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(matching_keys(entries.keys(), prefix))
    }
}
