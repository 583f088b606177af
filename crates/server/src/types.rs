use musicmind_search::SearchResult;
use serde::{Deserialize, Serialize};

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Search query text
    pub query: String,

    /// Number of results (server default when omitted)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Search response body
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Query as received
    pub query: String,

    /// Best matches, highest score first
    pub results: Vec<SearchResult>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
