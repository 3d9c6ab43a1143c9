use std::{net::SocketAddr, path::{Path, PathBuf}, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend};
use migration::MigratorTrait;
use service::{
    schema,
    storage::{json_document_store::JsonDocumentStore, seaorm::SeaOrmDocumentStore},
    DocumentStore, EntityService, MergePolicy,
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, EntityController};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured storage backend. For PostgreSQL the schema is migrated first.
pub async fn build_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match cfg.storage.backend {
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None).await?;
            info!(backend = "postgres", "document store ready");
            Arc::new(SeaOrmDocumentStore::new(db))
        }
        StorageBackend::File => {
            let store = JsonDocumentStore::open(&cfg.storage.data_file).await?;
            info!(backend = "file", data_file = %cfg.storage.data_file, "document store ready");
            store
        }
        StorageBackend::Memory => {
            warn!(backend = "memory", "records are lost on shutdown");
            JsonDocumentStore::in_memory()
        }
    };
    Ok(store)
}

/// Wire one controller per entity kind onto the shared store and build the router.
pub fn build_app(store: Arc<dyn DocumentStore>, cfg: &AppConfig) -> Router {
    let merge = MergePolicy::from(cfg.api.merge_policy);
    let controllers = schema::all()
        .into_iter()
        .map(|s| {
            let svc = EntityService::new(s, Arc::clone(&store)).with_merge_policy(merge);
            EntityController::new(svc, cfg.api.strict_validation)
        })
        .collect();
    let static_dir = cfg.server.static_dir.as_ref().map(PathBuf::from);
    routes::build_router(controllers, static_dir, build_cors())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutting down");
}

/// Public entry: build the app and run the HTTP server until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let data_file = (cfg.storage.backend == StorageBackend::File).then(|| Path::new(&cfg.storage.data_file));
    common::env::ensure_env(cfg.server.static_dir.as_deref().map(Path::new), data_file).await?;

    let store = build_store(&cfg).await?;
    let app = build_app(store, &cfg);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
