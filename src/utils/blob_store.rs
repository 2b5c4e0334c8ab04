// scoutshare-service/src/utils/blob_store.rs
use crate::utils::document_store::StoreError;
use async_trait::async_trait;
use log::{debug, error, info};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

// Object storage collaborator for pit-scout photos
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bucket: &str, id: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    /// `Ok(None)` when nothing is stored under the id.
    async fn read(&self, bucket: &str, file_id: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), StoreError>;

    fn view_url(&self, bucket: &str, file_id: &str) -> String;
}

pub struct MemoryBlobStore {
    base_url: String,
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, bucket: &str, file_id: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(&(bucket.to_string(), file_id.to_string())))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bucket: &str, id: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| StoreError::new(format!("Lock error: {:?}", e)))?;
        blobs.insert((bucket.to_string(), id.to_string()), bytes);
        Ok(id.to_string())
    }

    async fn read(&self, bucket: &str, file_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| StoreError::new(format!("Lock error: {:?}", e)))?;
        Ok(blobs.get(&(bucket.to_string(), file_id.to_string())).cloned())
    }

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), StoreError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| StoreError::new(format!("Lock error: {:?}", e)))?;
        match blobs.remove(&(bucket.to_string(), file_id.to_string())) {
            Some(_) => Ok(()),
            None => Err(StoreError::new(format!("Blob {}/{} not found", bucket, file_id))),
        }
    }

    fn view_url(&self, bucket: &str, file_id: &str) -> String {
        format!("{}/blobs/{}/{}", self.base_url.trim_end_matches('/'), bucket, file_id)
    }
}

// Blobs on disk at <root>/blobs/<bucket>/<file_id>
pub struct FileBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> io::Result<Self> {
        let root = root.into().join("blobs");
        if !root.exists() {
            info!("Creating blob storage directory: {:?}", root);
            fs::create_dir_all(&root)?;
        }
        Ok(Self {
            root,
            base_url: base_url.into(),
        })
    }

    fn blob_path(&self, bucket: &str, file_id: &str) -> Result<PathBuf, StoreError> {
        for segment in [bucket, file_id] {
            if segment.is_empty() || segment.contains(&['/', '\\'][..]) || segment == ".." {
                return Err(StoreError::new(format!("Invalid blob path segment: {:?}", segment)));
            }
        }
        Ok(self.root.join(bucket).join(file_id))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn upload(&self, bucket: &str, id: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let path = self.blob_path(bucket, id)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create bucket directory {:?}: {:?}", dir, e);
                StoreError::new(format!("Failed to create bucket: {}", e))
            })?;
        }
        fs::write(&path, bytes).map_err(|e| {
            error!("Failed to write blob {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to write blob: {}", e))
        })?;
        debug!("Stored blob {}/{}", bucket, id);
        Ok(id.to_string())
    }

    async fn read(&self, bucket: &str, file_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.blob_path(bucket, file_id)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read(&path).map(Some).map_err(|e| {
            error!("Failed to read blob {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to read blob: {}", e))
        })
    }

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), StoreError> {
        let path = self.blob_path(bucket, file_id)?;
        if !path.exists() {
            return Err(StoreError::new(format!("Blob {}/{} not found", bucket, file_id)));
        }
        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete blob {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to delete blob: {}", e))
        })
    }

    fn view_url(&self, bucket: &str, file_id: &str) -> String {
        format!("{}/blobs/{}/{}", self.base_url.trim_end_matches('/'), bucket, file_id)
    }
}
