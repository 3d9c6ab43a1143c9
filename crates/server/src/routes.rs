use std::path::PathBuf;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

pub mod entities;

pub use entities::EntityController;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: entity collections, health, OpenAPI
/// document and, when configured, the static frontend as fallback.
pub fn build_router(controllers: Vec<EntityController>, static_dir: Option<PathBuf>, cors: CorsLayer) -> Router {
    let schemas: Vec<_> = controllers.iter().map(EntityController::schema).collect();
    let api_doc = crate::openapi::document(&schemas);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(move || async move { Json(api_doc) }));
    for controller in controllers {
        app = app.merge(entities::router(controller));
    }

    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
