use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document storage abstraction so the engine can run against the real
/// file system or an in-memory table in tests.
pub trait DocumentStore: Send + Sync {
    /// Read the full text of a document
    fn read(&self, path: &Path) -> Result<String, StoreError>;

    /// Replace the full text of a document
    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError>;

    /// Check if a document exists
    fn exists(&self, path: &Path) -> bool;
}

/// Real file system implementation
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(std::fs::write(path, text)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory store for testing
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_document(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), text.into());
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(path)
    }
}
