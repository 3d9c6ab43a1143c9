//! Generic HTTP controller: one instance per entity kind, mounted under the
//! schema's canonical path and its aliases.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use service::{DocumentStore, Document, EntitySchema, EntityService};
use tracing::debug;

use crate::{errors::JsonApiError, hateoas::Resource};

#[derive(Clone)]
pub struct EntityController {
    service: EntityService<dyn DocumentStore>,
    strict_validation: bool,
}

impl EntityController {
    pub fn new(service: EntityService<dyn DocumentStore>, strict_validation: bool) -> Self {
        Self { service, strict_validation }
    }

    pub fn schema(&self) -> &'static EntitySchema { self.service.schema() }

    fn resource(&self, record: service::Record) -> Resource {
        Resource::new(self.schema().path, record)
    }
}

/// An empty body is an empty record; anything but a JSON object is rejected.
pub fn parse_body(body: &[u8]) -> Result<Document, JsonApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JsonApiError::invalid_content("request body must be a JSON object")),
        Err(e) => Err(JsonApiError::invalid_content(format!("malformed JSON body: {e}"))),
    }
}

async fn search(
    State(ctl): State<EntityController>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Resource>>, JsonApiError> {
    let filter = ctl.schema().filter_from_query(&query);
    let records = ctl.service.search(&filter).await?;
    Ok(Json(records.into_iter().map(|r| ctl.resource(r)).collect()))
}

async fn create(State(ctl): State<EntityController>, body: Bytes) -> Result<impl IntoResponse, JsonApiError> {
    let input = parse_body(&body)?;
    if ctl.strict_validation {
        ctl.schema().validate_record(&ctl.schema().build(&input))?;
    }
    let record = ctl.service.create(input).await?;
    let location = format!("{}/{}", ctl.schema().path, record.id);
    debug!(%location, "created");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(ctl.resource(record))))
}

async fn read(State(ctl): State<EntityController>, Path(id): Path<String>) -> Result<Json<Resource>, JsonApiError> {
    match ctl.service.read(&id).await? {
        Some(record) => Ok(Json(ctl.resource(record))),
        None => Err(JsonApiError::not_found(ctl.schema().not_found_message)),
    }
}

/// PUT and PATCH share this handler: both merge the body into the stored record.
async fn update(
    State(ctl): State<EntityController>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Resource>, JsonApiError> {
    let patch = parse_body(&body)?;
    if ctl.strict_validation {
        ctl.schema().validate_patch(&ctl.service.effective_patch(&patch))?;
    }
    match ctl.service.update(&id, &patch).await? {
        Some(record) => Ok(Json(ctl.resource(record))),
        None => Err(JsonApiError::not_found(ctl.schema().not_found_message)),
    }
}

async fn remove(State(ctl): State<EntityController>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    ctl.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes of one entity kind under its path and every alias.
pub fn router(controller: EntityController) -> Router {
    let schema = controller.schema();
    let mut router = Router::new();
    for prefix in std::iter::once(schema.path).chain(schema.aliases.iter().copied()) {
        router = router
            .route(prefix, get(search).post(create))
            .route(&format!("{prefix}/:id"), get(read).put(update).patch(update).delete(remove));
    }
    router.with_state(controller)
}
