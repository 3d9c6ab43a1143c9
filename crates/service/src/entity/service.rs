use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::merge::MergePolicy;
use crate::{
    errors::ServiceError,
    record::{Document, Record},
    schema::EntitySchema,
    storage::DocumentStore,
};

/// CRUD business service for one entity kind, independent of the web framework.
pub struct EntityService<S: DocumentStore + ?Sized> {
    schema: &'static EntitySchema,
    store: Arc<S>,
    merge: MergePolicy,
}

impl<S: DocumentStore + ?Sized> Clone for EntityService<S> {
    fn clone(&self) -> Self {
        Self { schema: self.schema, store: self.store.clone(), merge: self.merge }
    }
}

/// Parse a path identifier; anything that is not a UUID is an `InvalidArgument`.
pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::invalid_id(raw))
}

impl<S: DocumentStore + ?Sized> EntityService<S> {
    pub fn new(schema: &'static EntitySchema, store: Arc<S>) -> Self {
        Self { schema, store, merge: MergePolicy::default() }
    }

    pub fn with_merge_policy(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }

    pub fn schema(&self) -> &'static EntitySchema { self.schema }

    pub fn merge_policy(&self) -> MergePolicy { self.merge }

    /// All records whose fields equal every filter entry, ascending by the schema's sort keys.
    #[instrument(skip(self, filter), fields(entity = self.schema.kind, filters = filter.len()))]
    pub async fn search(&self, filter: &Document) -> Result<Vec<Record>, ServiceError> {
        let filter: Document = filter
            .iter()
            .map(|(k, v)| match self.schema.field(k) {
                Some(f) => (k.clone(), f.normalize(v.clone())),
                None => (k.clone(), v.clone()),
            })
            .collect();
        let records = self.store.find(self.schema.collection, &filter, &self.schema.sort_keys).await?;
        debug!(count = records.len(), "search done");
        Ok(records)
    }

    /// Persist a new record built from the declared fields of `input`.
    #[instrument(skip(self, input), fields(entity = self.schema.kind))]
    pub async fn create(&self, input: Document) -> Result<Record, ServiceError> {
        let fields = self.schema.build(&input);
        let record = self.store.insert(self.schema.collection, fields).await?;
        info!(id = %record.id, "record_created");
        Ok(record)
    }

    #[instrument(skip(self), fields(entity = self.schema.kind))]
    pub async fn read(&self, id: &str) -> Result<Option<Record>, ServiceError> {
        let id = parse_id(id)?;
        self.store.find_by_id(self.schema.collection, id).await
    }

    /// Merge `patch` into an existing record; `None` when there is no such record.
    #[instrument(skip(self, patch), fields(entity = self.schema.kind, merge = ?self.merge))]
    pub async fn update(&self, id: &str, patch: &Document) -> Result<Option<Record>, ServiceError> {
        let id = parse_id(id)?;
        let Some(existing) = self.store.find_by_id(self.schema.collection, id).await? else {
            return Ok(None);
        };

        let changes = self.merge.select(self.schema, patch);
        if changes.is_empty() {
            debug!(%id, "nothing to apply");
            return Ok(Some(existing));
        }

        if !self.store.set_fields(self.schema.collection, id, changes).await? {
            // deleted between read and write
            return Ok(None);
        }
        info!(%id, "record_updated");
        self.store.find_by_id(self.schema.collection, id).await
    }

    /// Hard delete; 0 when the record did not exist.
    #[instrument(skip(self), fields(entity = self.schema.kind))]
    pub async fn delete(&self, id: &str) -> Result<u64, ServiceError> {
        let id = parse_id(id)?;
        let removed = self.store.delete(self.schema.collection, id).await?;
        info!(%id, removed, "record_deleted");
        Ok(removed)
    }

    /// Apply the merge policy without touching storage; used for strict validation of patches.
    pub fn effective_patch(&self, patch: &Document) -> Document {
        self.merge.select(self.schema, patch)
    }
}
