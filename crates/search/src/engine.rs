use musicmind_common::{MusicMindError, Result};
use musicmind_embed::Embedder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::similarity::cosine_similarity;
use crate::types::{CatalogIndex, CatalogStats, SearchResult};

/// Semantic song search over a static catalog
///
/// The catalog is read and embedded on the first call to [`ensure_loaded`]
/// (or the first search) and cached for the lifetime of the service. A failed
/// load is cached as well: every later call reports the same error.
///
/// [`ensure_loaded`]: SearchService::ensure_loaded
pub struct SearchService {
    catalog_path: PathBuf,
    embedder: Arc<dyn Embedder>,
    index: OnceCell<std::result::Result<CatalogIndex, String>>,
}

impl SearchService {
    /// Create new search service; nothing is loaded until first use
    pub fn new(catalog_path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            embedder,
            index: OnceCell::new(),
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    /// Load and embed the catalog once; later calls return the cached outcome
    pub async fn ensure_loaded(&self) -> Result<&CatalogIndex> {
        let outcome = self
            .index
            .get_or_init(|| async {
                info!("Loading song catalog from {}", self.catalog_path.display());
                CatalogIndex::load(&self.catalog_path, self.embedder.as_ref())
                    .await
                    .map_err(|e| {
                        error!("Catalog initialization failed: {}", e);
                        e.to_string()
                    })
            })
            .await;

        outcome
            .as_ref()
            .map_err(|msg| MusicMindError::catalog_load(msg.clone()))
    }

    /// Rank catalog songs by similarity to `query` and return the best `top_k`
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if query.is_empty() {
            return Err(MusicMindError::invalid_input("Query cannot be empty"));
        }

        let index = self.ensure_loaded().await?;
        debug!("Searching for: {} (top_k={})", query, top_k);

        if index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = rank(index, &query_embedding, top_k)?;

        info!(
            "Search completed - {} results (from {} songs)",
            results.len(),
            index.len()
        );
        Ok(results)
    }

    /// Catalog statistics; never triggers a load
    pub fn stats(&self) -> CatalogStats {
        match self.index.get() {
            Some(Ok(index)) => CatalogStats {
                total_songs: index.len(),
                embedding_model: index.embedding_model.clone(),
                embedding_dim: index.embedding_dim,
                loaded: true,
                loaded_at: Some(index.loaded_at),
            },
            _ => CatalogStats {
                total_songs: 0,
                embedding_model: self.embedder.model_name().to_string(),
                embedding_dim: 0,
                loaded: false,
                loaded_at: None,
            },
        }
    }
}

/// Score every song against `query_embedding`, best first, ties in catalog order
pub fn rank(index: &CatalogIndex, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
    if !index.is_empty() && query_embedding.len() != index.embedding_dim {
        return Err(MusicMindError::embedding(format!(
            "Query embedding has dimension {}, catalog uses {}",
            query_embedding.len(),
            index.embedding_dim
        )));
    }

    let mut results: Vec<SearchResult> = index
        .songs
        .iter()
        .zip(&index.embeddings)
        .map(|(song, embedding)| SearchResult::new(song, cosine_similarity(query_embedding, embedding)))
        .collect();

    // sort_by is stable, so equal scores keep catalog order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use musicmind_embed::HashEmbedder;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::types::{Song, SongId};

    const RAIN_FIRE: &str = r#"[
        {"id": 1, "title": "Rainy Day", "artist": "The Clouds", "description": "a song about rain"},
        {"id": 2, "title": "Wildfire", "artist": "Ember", "description": "a song about fire"}
    ]"#;

    fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn service_for(file: &tempfile::NamedTempFile) -> SearchService {
        SearchService::new(file.path(), Arc::new(HashEmbedder::new(384)))
    }

    /// Counts batch calls so tests can see how often the catalog is embedded
    struct CountingEmbedder {
        inner: HashEmbedder,
        batches: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.inner.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let mut out = Vec::new();
            for text in texts {
                out.push(self.inner.embed(text).await?);
            }
            Ok(out)
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    /// Embeds the catalog fine but fails every query
    struct FlakyQueryEmbedder;

    #[async_trait]
    impl Embedder for FlakyQueryEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MusicMindError::embedding("model unavailable"))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    /// Model that never comes up; counts how often the catalog was attempted
    struct BrokenModelEmbedder {
        batches: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for BrokenModelEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MusicMindError::embedding("model failed to initialize"))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            Err(MusicMindError::embedding("model failed to initialize"))
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    fn index_of(vectors: Vec<Vec<f32>>) -> CatalogIndex {
        let songs = (0..vectors.len())
            .map(|i| Song {
                id: SongId::Int(i as i64),
                title: format!("title {}", i),
                artist: format!("artist {}", i),
                description: String::new(),
            })
            .collect();
        let embedding_dim = vectors.first().map_or(0, Vec::len);
        CatalogIndex {
            songs,
            embeddings: vectors,
            embedding_model: "test".to_string(),
            embedding_dim,
            loaded_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_rain_query_prefers_rain_song() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        let results = service.search("rain", 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, SongId::Int(1));
        assert_eq!(results[0].title, "Rainy Day");
    }

    #[tokio::test]
    async fn test_top_k_larger_than_catalog() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        let results = service.search("fire", 10).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, SongId::Int(2));
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_empty_catalog_returns_no_results() {
        let file = write_catalog("[]");
        let service = service_for(&file);

        let results = service.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_zero() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);
        assert!(service.search("rain", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_query_is_idempotent() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        let first = service.search("a song", 5).await.unwrap();
        let second = service.search("a song", 5).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        let result = service.search("", 5).await;
        assert!(matches!(result, Err(MusicMindError::InvalidInput(_))));
        assert!(!service.stats().loaded);
    }

    #[tokio::test]
    async fn test_whitespace_query_ranks_in_catalog_order() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        // No tokens, so the query vector is all zeros and every score ties at 0.0
        let results = service.search("   ", 5).await.unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![SongId::Int(1), SongId::Int(2)]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[tokio::test]
    async fn test_missing_catalog_fails_every_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        let service = SearchService::new(&path, Arc::new(HashEmbedder::new(16)));

        let first = service.search("rain", 5).await;
        assert!(matches!(first, Err(MusicMindError::CatalogLoad(_))));

        // The failure is cached; creating the file afterwards does not help
        std::fs::write(&path, RAIN_FIRE).unwrap();
        let second = service.search("rain", 5).await;
        assert!(matches!(second, Err(MusicMindError::CatalogLoad(_))));
        assert!(!service.stats().loaded);
    }

    #[tokio::test]
    async fn test_catalog_embedding_failure_is_memoized() {
        let file = write_catalog(RAIN_FIRE);
        let embedder = Arc::new(BrokenModelEmbedder {
            batches: AtomicUsize::new(0),
        });
        let service = SearchService::new(file.path(), embedder.clone());

        let first = service.search("rain", 5).await;
        let second = service.search("rain", 5).await;

        assert!(matches!(first, Err(MusicMindError::CatalogLoad(_))));
        assert!(matches!(second, Err(MusicMindError::CatalogLoad(_))));
        assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
        assert!(!service.stats().loaded);
    }

    #[tokio::test]
    async fn test_query_embedding_failure() {
        let file = write_catalog(RAIN_FIRE);
        let service = SearchService::new(file.path(), Arc::new(FlakyQueryEmbedder));

        let result = service.search("rain", 5).await;
        assert!(matches!(result, Err(MusicMindError::Embedding(_))));
        // Catalog itself stays usable
        assert!(service.stats().loaded);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_catalog_embedded_once_under_concurrency() {
        let file = write_catalog(RAIN_FIRE);
        let embedder = Arc::new(CountingEmbedder {
            inner: HashEmbedder::new(64),
            batches: AtomicUsize::new(0),
        });
        let service = Arc::new(SearchService::new(file.path(), embedder.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move { service.search("rain", 2).await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().len(), 2);
        }

        assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stats_before_and_after_load() {
        let file = write_catalog(RAIN_FIRE);
        let service = service_for(&file);

        let before = service.stats();
        assert!(!before.loaded);
        assert_eq!(before.total_songs, 0);
        assert_eq!(before.embedding_model, "hash-384");

        service.ensure_loaded().await.unwrap();

        let after = service.stats();
        assert!(after.loaded);
        assert_eq!(after.total_songs, 2);
        assert_eq!(after.embedding_dim, 384);
        assert!(after.loaded_at.is_some());
    }

    #[test]
    fn test_rank_sorted_descending() {
        let index = index_of(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![-1.0, 0.0],
        ]);

        let results = rank(&index, &[1.0, 0.0], 4).unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![SongId::Int(1), SongId::Int(2), SongId::Int(0), SongId::Int(3)]);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(results[3].score < 0.0);
    }

    #[test]
    fn test_rank_ties_keep_catalog_order() {
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 0.0], vec![3.0, 0.0]]);

        let results = rank(&index, &[1.0, 0.0], 3).unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![SongId::Int(0), SongId::Int(2), SongId::Int(3)]);
    }

    #[test]
    fn test_rank_dimension_mismatch() {
        let index = index_of(vec![vec![1.0, 0.0]]);
        let result = rank(&index, &[1.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(MusicMindError::Embedding(_))));
    }

    #[test]
    fn test_rank_result_count_bounded() {
        let index = index_of(vec![vec![1.0, 0.0]; 3]);
        for k in 0..6 {
            assert_eq!(rank(&index, &[1.0, 0.0], k).unwrap().len(), k.min(3));
        }
    }
}
