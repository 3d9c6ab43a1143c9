//! OpenAPI document. Static parts come from the derive; entity paths and
//! record schemas are generated from the registered [`EntitySchema`]s.

use service::{schema::FieldKind, EntitySchema};
use utoipa::openapi::{
    content::Content,
    path::{OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathItemBuilder, PathItemType},
    request_body::RequestBodyBuilder,
    response::{Response, ResponseBuilder},
    schema::{ArrayBuilder, KnownFormat, ObjectBuilder, Schema, SchemaFormat, SchemaType},
    ComponentsBuilder, Ref, RefOr, Required,
};
use utoipa::{OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse {
    /// `NotFound`, `InvalidArgument`, `InvalidContent` or `Internal`.
    pub code: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::health),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            crate::hateoas::Link,
            crate::hateoas::Links,
        )
    ),
    tags((name = "health"))
)]
pub struct ApiDoc;

fn object(builder: ObjectBuilder) -> RefOr<Schema> {
    RefOr::T(Schema::Object(builder.build()))
}

fn reference(name: &str) -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(name))
}

fn field_schema(kind: FieldKind) -> RefOr<Schema> {
    match kind {
        FieldKind::Text => object(ObjectBuilder::new().schema_type(SchemaType::String)),
        FieldKind::Integer => object(ObjectBuilder::new().schema_type(SchemaType::Integer)),
        FieldKind::Enum(values) => object(
            ObjectBuilder::new()
                .schema_type(SchemaType::String)
                .enum_values(Some(values.iter().copied())),
        ),
    }
}

/// Stored record: `_id`, every declared field and `_links`.
fn record_schema(schema: &EntitySchema) -> RefOr<Schema> {
    let mut builder = ObjectBuilder::new()
        .schema_type(SchemaType::Object)
        .property(
            "_id",
            object(
                ObjectBuilder::new()
                    .schema_type(SchemaType::String)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
            ),
        )
        .required("_id");
    for field in schema.fields {
        builder = builder.property(field.name, field_schema(field.kind)).required(field.name);
    }
    object(builder.property("_links", reference("Links")).required("_links"))
}

/// Request body: any subset of the declared fields.
fn input_schema(schema: &EntitySchema) -> RefOr<Schema> {
    let builder = schema
        .fields
        .iter()
        .fold(ObjectBuilder::new().schema_type(SchemaType::Object), |b, f| b.property(f.name, field_schema(f.kind)));
    object(builder)
}

fn json_content(schema: RefOr<Schema>) -> Content {
    Content::new(schema)
}

fn response(description: &str, schema: Option<RefOr<Schema>>) -> RefOr<Response> {
    let builder = ResponseBuilder::new().description(description);
    let builder = match schema {
        Some(s) => builder.content("application/json", json_content(s)),
        None => builder,
    };
    RefOr::T(builder.build())
}

fn error_response(description: &str) -> RefOr<Response> {
    response(description, Some(reference("ErrorResponse")))
}

fn entity_paths(schema: &EntitySchema) -> [(String, PathItem); 2] {
    let tag = schema.path.trim_start_matches('/');
    let record = reference(schema.kind);
    let input_name = format!("{}Input", schema.kind);
    let body = || {
        Some(
            RequestBodyBuilder::new()
                .content("application/json", json_content(reference(&input_name)))
                .build(),
        )
    };
    let id_param = || {
        ParameterBuilder::new()
            .name("id")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .schema(Some(object(
                ObjectBuilder::new()
                    .schema_type(SchemaType::String)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
            )))
            .build()
    };
    let list = RefOr::T(Schema::Array(ArrayBuilder::new().items(record.clone()).build()));

    let search = OperationBuilder::new()
        .tag(tag)
        .operation_id(Some(format!("search_{tag}")))
        .summary(Some(format!("List {} records; query parameters filter by exact field value", schema.kind)))
        .response("200", response("OK", Some(list)))
        .response("500", error_response("Storage failure"))
        .build();
    let create = OperationBuilder::new()
        .tag(tag)
        .operation_id(Some(format!("create_{tag}")))
        .request_body(body())
        .response("201", response("Created", Some(record.clone())))
        .response("400", error_response("Body is not a JSON object"))
        .build();
    let read = OperationBuilder::new()
        .tag(tag)
        .operation_id(Some(format!("read_{tag}")))
        .parameter(id_param())
        .response("200", response("OK", Some(record.clone())))
        .response("400", error_response("Malformed id"))
        .response("404", error_response(schema.not_found_message))
        .build();
    let update = |method: &str| {
        OperationBuilder::new()
            .tag(tag)
            .operation_id(Some(format!("{method}_{tag}")))
            .parameter(id_param())
            .request_body(body())
            .response("200", response("Merged record", Some(record.clone())))
            .response("400", error_response("Malformed id or body"))
            .response("404", error_response(schema.not_found_message))
            .build()
    };
    let delete = OperationBuilder::new()
        .tag(tag)
        .operation_id(Some(format!("delete_{tag}")))
        .parameter(id_param())
        .response("204", response("Deleted, or never existed", None))
        .response("400", error_response("Malformed id"))
        .build();

    let collection = PathItemBuilder::new()
        .operation(PathItemType::Get, search)
        .operation(PathItemType::Post, create)
        .build();
    let item = PathItemBuilder::new()
        .operation(PathItemType::Get, read)
        .operation(PathItemType::Put, update("update"))
        .operation(PathItemType::Patch, update("patch"))
        .operation(PathItemType::Delete, delete)
        .build();
    [(schema.path.to_string(), collection), (format!("{}/{{id}}", schema.path), item)]
}

/// Complete document for the given entity kinds.
pub fn document(schemas: &[&'static EntitySchema]) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "univerwaltung".to_string();
    let components = doc.components.get_or_insert_with(|| ComponentsBuilder::new().build());
    for schema in schemas {
        components.schemas.insert(schema.kind.to_string(), record_schema(schema));
        components.schemas.insert(format!("{}Input", schema.kind), input_schema(schema));
        for (path, item) in entity_paths(schema) {
            doc.paths.paths.insert(path, item);
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn document_lists_every_entity_path_and_schema() {
        let doc = document(&service::schema::all());
        let v: Value = serde_json::to_value(&doc).unwrap();
        for path in ["/health", "/dozent", "/dozent/{id}", "/kurs", "/kurs/{id}", "/studierender", "/studierender/{id}"] {
            assert!(v["paths"].get(path).is_some(), "missing {path}");
        }
        let status = &v["components"]["schemas"]["Dozent"]["properties"]["status"]["enum"];
        assert_eq!(status, &serde_json::json!(["intern", "extern"]));
        assert_eq!(v["components"]["schemas"]["Kurs"]["properties"]["ects"]["type"], "integer");
        assert!(v["paths"]["/kurs/{id}"].get("patch").is_some());
    }
}
