//! MusicMind HTTP server
//!
//! actix-web transport around the song search service

mod error;
mod routes;
mod state;
mod types;

use actix_web::{web, App, HttpServer};
use musicmind_common::{AppConfig, Result};
use musicmind_embed::{build_embedder, Embedder};
use musicmind_search::SearchService;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use routes::configure;
pub use state::AppState;
pub use types::{ErrorResponse, HealthResponse, SearchRequest, SearchResponse};

/// Build the search service and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let embedder = build_embedder(&config)?;
    check_embedder(embedder.as_ref()).await;

    let search = SearchService::new(&config.catalog_path, embedder);

    if config.preload_catalog {
        let index = search.ensure_loaded().await?;
        info!(
            "Catalog preloaded from {} - {} songs",
            search.catalog_path().display(),
            index.len()
        );
    }

    let bind_address = config.server_bind_address();
    let state = web::Data::new(Arc::new(AppState::new(config, search)));

    info!("Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Warn early when the model server is not reachable; searches fail until it is
async fn check_embedder(embedder: &dyn Embedder) {
    match embedder.check_connection().await {
        Ok(true) => info!("Embedding model {} reachable", embedder.model_name()),
        Ok(false) => warn!("Model server for {} answered with an error status", embedder.model_name()),
        Err(e) => warn!("Model server not reachable: {}", e),
    }
}
