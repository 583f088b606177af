use async_trait::async_trait;
use musicmind_common::{AppConfig, EmbeddingBackend, Result};
use std::sync::Arc;
use tracing::info;

use crate::client::OllamaEmbedder;
use crate::hash::HashEmbedder;

/// Common trait for embedding models
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for several texts, one vector per text in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Name of the model producing the vectors
    fn model_name(&self) -> &str;

    /// Whether the backing model server answers; in-process embedders are always ready
    async fn check_connection(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Build the embedder selected by the configuration
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding_backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(
            &config.ollama_base_url,
            &config.embedding_model,
        )?),
        EmbeddingBackend::Hash => Arc::new(HashEmbedder::new(config.embedding_dim)),
    };

    info!(
        "Embedding backend ready - backend: {:?}, model: {}",
        config.embedding_backend,
        embedder.model_name()
    );
    Ok(embedder)
}
