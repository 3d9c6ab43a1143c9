use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{matches_filter, sort_records, DocumentStore};
use crate::{errors::ServiceError, record::{Document, Record}};

type Collections = HashMap<String, HashMap<Uuid, Document>>;

/// JSON file-backed document store.
///
/// Keeps every collection in memory as `collection -> id -> fields` and, when
/// opened with a path, rewrites the whole file after each mutation. Intended
/// for local runs and tests where a database is overkill.
#[derive(Clone)]
pub struct JsonDocumentStore {
    inner: Arc<RwLock<Collections>>,
    file_path: Option<PathBuf>,
}

impl JsonDocumentStore {
    /// Initialize the store from a path. Creates the file with no collections if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        let collections: Collections = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collections::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Storage(format!("corrupt data file {}: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Collections::new();
                write_file(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };
        debug!(path = %file_path.display(), collections = collections.len(), "json document store opened");

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(collections)), file_path: Some(file_path) }))
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(Collections::new())), file_path: None })
    }

    /// Number of records in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let map = self.inner.read().await;
        map.get(collection).map_or(0, HashMap::len)
    }

    // Called with the write guard held so concurrent saves cannot reorder.
    async fn save(&self, collections: &Collections) -> Result<(), ServiceError> {
        match &self.file_path {
            Some(path) => write_file(path, collections).await,
            None => Ok(()),
        }
    }
}

async fn write_file(path: &Path, collections: &Collections) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(collections).map_err(|e| ServiceError::Storage(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to replace data file");
        ServiceError::Storage(e.to_string())
    })
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn find(&self, collection: &str, filter: &Document, sort: &[&str]) -> Result<Vec<Record>, ServiceError> {
        let map = self.inner.read().await;
        let mut records: Vec<Record> = map
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|(_, fields)| matches_filter(fields, filter))
            .map(|(id, fields)| Record::new(*id, fields.clone()))
            .collect();
        drop(map);
        sort_records(&mut records, sort);
        Ok(records)
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(collection).and_then(|c| c.get(&id)).map(|fields| Record::new(id, fields.clone())))
    }

    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, ServiceError> {
        let id = Uuid::new_v4();
        let mut map = self.inner.write().await;
        map.entry(collection.to_string()).or_default().insert(id, fields.clone());
        if let Err(e) = self.save(&map).await {
            if let Some(c) = map.get_mut(collection) {
                c.remove(&id);
            }
            return Err(e);
        }
        Ok(Record::new(id, fields))
    }

    async fn set_fields(&self, collection: &str, id: Uuid, fields: Document) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(stored) = map.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
            return Ok(false);
        };
        let previous = stored.clone();
        stored.extend(fields);
        if let Err(e) = self.save(&map).await {
            if let Some(stored) = map.get_mut(collection).and_then(|c| c.get_mut(&id)) {
                *stored = previous;
            }
            return Err(e);
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<u64, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(removed) = map.get_mut(collection).and_then(|c| c.remove(&id)) else {
            return Ok(0);
        };
        if let Err(e) = self.save(&map).await {
            map.entry(collection.to_string()).or_default().insert(id, removed);
            return Err(e);
        }
        Ok(1)
    }
}
