use musicmind_common::AppConfig;
use musicmind_search::SearchService;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Catalog search service
    pub search: SearchService,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, search: SearchService) -> Self {
        Self { config, search }
    }
}
