use actix_web::{get, post, web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{SearchRequest, SearchResponse};

#[post("/search")]
pub async fn search(
    body: web::Json<SearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let SearchRequest { query, top_k } = body.into_inner();
    let top_k = top_k.unwrap_or(state.config.default_top_k);

    info!("Search request: {:?} (top_k={})", query, top_k);

    let results = state.search.search(&query, top_k).await?;

    Ok(HttpResponse::Ok().json(SearchResponse { query, results }))
}

#[get("/search/stats")]
pub async fn search_stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(state.search.stats())
}
