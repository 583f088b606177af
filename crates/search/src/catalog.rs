use musicmind_common::{MusicMindError, Result};
use musicmind_embed::Embedder;
use std::path::Path;
use tracing::{debug, info};

use crate::types::{CatalogIndex, Song};

/// Read the song catalog (a JSON array of songs)
pub async fn load_songs(path: &Path) -> Result<Vec<Song>> {
    let data = tokio::fs::read_to_string(path).await.map_err(|e| {
        MusicMindError::catalog_load(format!("Failed to read catalog {}: {}", path.display(), e))
    })?;

    let songs: Vec<Song> = serde_json::from_str(&data).map_err(|e| {
        MusicMindError::catalog_load(format!("Malformed catalog {}: {}", path.display(), e))
    })?;

    debug!("Read {} songs from {}", songs.len(), path.display());
    Ok(songs)
}

impl CatalogIndex {
    /// Embed every description in catalog order
    pub async fn build(songs: Vec<Song>, embedder: &dyn Embedder) -> Result<Self> {
        let descriptions: Vec<String> = songs.iter().map(|s| s.description.clone()).collect();
        let embeddings = if descriptions.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(&descriptions).await?
        };

        if embeddings.len() != songs.len() {
            return Err(MusicMindError::embedding(format!(
                "Expected {} catalog embeddings, got {}",
                songs.len(),
                embeddings.len()
            )));
        }

        let embedding_dim = embeddings.first().map_or(0, Vec::len);
        if let Some(pos) = embeddings.iter().position(|e| e.len() != embedding_dim) {
            return Err(MusicMindError::embedding(format!(
                "Embedding for song {} has dimension {}, expected {}",
                songs[pos].id,
                embeddings[pos].len(),
                embedding_dim
            )));
        }

        info!(
            "Catalog embedded - {} songs, dimension {}, model {}",
            songs.len(),
            embedding_dim,
            embedder.model_name()
        );

        Ok(Self {
            songs,
            embeddings,
            embedding_model: embedder.model_name().to_string(),
            embedding_dim,
            loaded_at: chrono::Utc::now(),
        })
    }

    /// Read the catalog file and embed it
    pub async fn load(path: &Path, embedder: &dyn Embedder) -> Result<Self> {
        let songs = load_songs(path).await?;
        Self::build(songs, embedder).await
    }
}
