// scoutshare-service/src/config.rs
use crate::models::ServiceError;
use crate::utils::blob_store::{BlobStore, FileBlobStore, MemoryBlobStore};
use crate::utils::document_store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
use log::{error, info};
use std::env;
use std::sync::Arc;

const DEFAULT_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_STORAGE_DIR: &str = "./storage";
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:9090";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    pub storage_dir: String,
    pub public_url: String,
    pub store: StoreKind,
}

impl AppConfig {
    // Reads SCOUTSHARE_* variables, falling back to local defaults
    pub fn from_env() -> Result<Self, ServiceError> {
        let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());

        let store = match var("SCOUTSHARE_STORE", "file").to_lowercase().as_str() {
            "file" => StoreKind::File,
            "memory" => StoreKind::Memory,
            other => {
                return Err(ServiceError::Validation(format!(
                    "SCOUTSHARE_STORE must be 'file' or 'memory', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            address: var("SCOUTSHARE_ADDRESS", DEFAULT_ADDRESS),
            storage_dir: var("SCOUTSHARE_STORAGE_DIR", DEFAULT_STORAGE_DIR),
            public_url: var("SCOUTSHARE_PUBLIC_URL", DEFAULT_PUBLIC_URL),
            store,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            store: StoreKind::Memory,
        }
    }
}

// Shared handles passed to every handler through web::Data
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>, config: AppConfig) -> Self {
        Self {
            store,
            blobs,
            config,
        }
    }

    pub fn from_config(config: AppConfig) -> std::io::Result<Self> {
        let (store, blobs): (Arc<dyn DocumentStore>, Arc<dyn BlobStore>) = match config.store {
            StoreKind::File => {
                info!("Using file storage at {}", config.storage_dir);
                let store = FileDocumentStore::new(&config.storage_dir).map_err(|e| {
                    error!("❌ Failed to open document storage: {:?}", e);
                    e
                })?;
                let blobs = FileBlobStore::new(&config.storage_dir, config.public_url.clone())?;
                (Arc::new(store), Arc::new(blobs))
            }
            StoreKind::Memory => {
                info!("Using in-memory storage, data is lost on exit");
                (
                    Arc::new(MemoryDocumentStore::new()),
                    Arc::new(MemoryBlobStore::new(config.public_url.clone())),
                )
            }
        };
        Ok(Self::new(store, blobs, config))
    }
}
