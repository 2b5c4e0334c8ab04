// scoutshare-service/src/utils/document_store.rs
//! Document store collaborator: the hosted database is reached only through
//! [`DocumentStore`]. Two adapters live here, an in-memory one used by tests
//! and local runs, and one that keeps a JSON file per document on disk.

use crate::models::ServiceError;
use async_trait::async_trait;
use derive_more::Display;
use log::{debug, error, info};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

pub type Document = Map<String, Value>;

#[derive(Debug, Display, Clone, PartialEq)]
#[display(fmt = "{}", message)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Store(err.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    ArrayContains(String, Value),
}

impl Filter {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::ArrayContains(field, value) => match doc.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    pub fn array_contains(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::ArrayContains(field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(doc))
    }

    /// Filters, orders and truncates a candidate set the way a hosted
    /// store would answer the same query.
    pub fn apply(&self, docs: impl IntoIterator<Item = StoredDocument>) -> Vec<StoredDocument> {
        let mut selected: Vec<StoredDocument> =
            docs.into_iter().filter(|doc| self.matches(&doc.fields)).collect();

        if let Some((field, direction)) = &self.order_by {
            selected.sort_by(|a, b| {
                let ordering = compare_values(a.fields.get(field), b.fields.get(field));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

// Missing fields sort after present ones
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<StoredDocument>, StoreError>;

    /// Shallow merge: top-level fields in `fields` replace the stored ones.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

// In-memory store
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent create/update/delete fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Makes every subsequent get/list fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::new("write rejected by store"));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::new("read rejected by store"));
        }
        Ok(())
    }

    fn with_collections<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, BTreeMap<String, Document>>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|e| StoreError::new(format!("Lock error: {:?}", e)))?;
        f(&mut collections)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError> {
        self.check_writes()?;
        self.with_collections(|collections| {
            let docs = collections.entry(collection.to_string()).or_default();
            if docs.contains_key(id) {
                return Err(StoreError::new(format!(
                    "Document {}/{} already exists",
                    collection, id
                )));
            }
            docs.insert(id.to_string(), fields.clone());
            Ok(StoredDocument {
                id: id.to_string(),
                fields,
            })
        })
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.check_reads()?;
        self.with_collections(|collections| {
            Ok(collections
                .get(collection)
                .and_then(|docs| docs.get(id))
                .map(|fields| StoredDocument {
                    id: id.to_string(),
                    fields: fields.clone(),
                }))
        })
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        self.check_reads()?;
        self.with_collections(|collections| {
            let docs = match collections.get(collection) {
                Some(docs) => docs,
                None => return Ok(Vec::new()),
            };
            Ok(query.apply(docs.iter().map(|(id, fields)| StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            })))
        })
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError> {
        self.check_writes()?;
        self.with_collections(|collections| {
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::new(format!("Document {}/{} not found", collection, id)))?;
            for (key, value) in fields {
                existing.insert(key, value);
            }
            Ok(StoredDocument {
                id: id.to_string(),
                fields: existing.clone(),
            })
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_writes()?;
        self.with_collections(|collections| {
            let removed = collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id));
            match removed {
                Some(_) => Ok(()),
                None => Err(StoreError::new(format!(
                    "Document {}/{} not found",
                    collection, id
                ))),
            }
        })
    }
}

// One pretty-printed JSON file per document: <root>/<collection>/<id>.json
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if !root.exists() {
            info!("Creating document storage directory: {:?}", root);
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        check_segment(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        check_segment(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    fn read_document(path: &Path) -> Result<Document, StoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read document {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to read document: {}", e))
        })?;
        serde_json::from_str::<Document>(&content).map_err(|e| {
            error!("Failed to parse document {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to parse document: {}", e))
        })
    }

    fn write_document(path: &Path, fields: &Document) -> Result<(), StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create collection directory {:?}: {:?}", dir, e);
                StoreError::new(format!("Failed to create collection: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(fields)
            .map_err(|e| StoreError::new(format!("Failed to serialize document: {}", e)))?;
        fs::write(path, json).map_err(|e| {
            error!("Failed to write document {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to write document: {}", e))
        })
    }
}

// Ids and collection names become path segments
fn check_segment(segment: &str) -> Result<(), StoreError> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(&['/', '\\'][..]);
    if valid {
        Ok(())
    } else {
        Err(StoreError::new(format!("Invalid document path segment: {:?}", segment)))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError> {
        let path = self.document_path(collection, id)?;
        if path.exists() {
            return Err(StoreError::new(format!(
                "Document {}/{} already exists",
                collection, id
            )));
        }
        Self::write_document(&path, &fields)?;
        debug!("Created document {}/{}", collection, id);
        Ok(StoredDocument {
            id: id.to_string(),
            fields,
        })
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let path = self.document_path(collection, id)?;
        if !path.exists() {
            return Ok(None);
        }
        let fields = Self::read_document(&path)?;
        Ok(Some(StoredDocument {
            id: id.to_string(),
            fields,
        }))
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        let dir = self.collection_dir(collection)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            error!("Failed to read collection directory {:?}: {:?}", dir, e);
            StoreError::new(format!("Failed to read collection: {}", e))
        })?;

        let mut docs = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StoreError::new(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let id = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let fields = Self::read_document(&path)?;
            docs.push(StoredDocument { id, fields });
        }
        // read_dir order is platform dependent
        docs.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(query.apply(docs))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<StoredDocument, StoreError> {
        let path = self.document_path(collection, id)?;
        if !path.exists() {
            return Err(StoreError::new(format!(
                "Document {}/{} not found",
                collection, id
            )));
        }
        let mut existing = Self::read_document(&path)?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Self::write_document(&path, &existing)?;
        debug!("Updated document {}/{}", collection, id);
        Ok(StoredDocument {
            id: id.to_string(),
            fields: existing,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.document_path(collection, id)?;
        if !path.exists() {
            return Err(StoreError::new(format!(
                "Document {}/{} not found",
                collection, id
            )));
        }
        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete document {:?}: {:?}", path, e);
            StoreError::new(format!("Failed to delete document: {}", e))
        })?;
        debug!("Deleted document {}/{}", collection, id);
        Ok(())
    }
}
