use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::services::store::{FileStore, KeyValueStore, MemoryStore, StoreError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORE_PATH: &str = "data/meetings.json";

/// Which key-value backend the service writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    /// No store: reads are always absent and writes do not persist.
    Disabled,
}

impl StoreBackend {
    pub fn open(&self) -> Result<Option<Arc<dyn KeyValueStore>>, StoreError> {
        let store: Arc<dyn KeyValueStore> = match self {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File(path) => Arc::new(FileStore::open(path)?),
            StoreBackend::Disabled => return Ok(None),
        };
        Ok(Some(store))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub track_access: bool,
    pub is_production: bool,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .and_then(|raw| match raw.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!("Invalid BIND_ADDR '{}': {}, using default", raw, e);
                    None
                }
            })
            .unwrap_or_else(|| {
                DEFAULT_BIND_ADDR
                    .parse()
                    .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000)))
            });

        let store = match lookup("STORE_BACKEND")
            .map(|val| val.to_lowercase())
            .as_deref()
        {
            None | Some("memory") => StoreBackend::Memory,
            Some("file") => StoreBackend::File(PathBuf::from(
                lookup("STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            )),
            Some("none") | Some("disabled") => StoreBackend::Disabled,
            Some(other) => {
                warn!("Unknown STORE_BACKEND '{}', store disabled", other);
                StoreBackend::Disabled
            }
        };

        let track_access = lookup("TRACK_ACCESS")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);

        let is_production = lookup("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        info!(
            "Configuration: bind={}, store={:?}, track_access={}, production={}",
            bind_addr, store, track_access, is_production
        );

        Self {
            bind_addr,
            store,
            track_access,
            is_production,
        }
    }
}
