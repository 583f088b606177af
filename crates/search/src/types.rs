use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Song identifier, kept in whatever JSON form the catalog uses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for SongId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,

    /// Free text the embedding is computed from
    pub description: String,
}

/// Songs plus one embedding per description, built once per process
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    /// Songs in catalog order
    pub songs: Vec<Song>,

    /// `embeddings[i]` belongs to `songs[i]`
    pub embeddings: Vec<Vec<f32>>,

    /// Embedding model used
    pub embedding_model: String,

    /// Embedding dimension (0 for an empty catalog)
    pub embedding_dim: usize,

    /// Timestamp when the catalog was embedded
    pub loaded_at: DateTime<Utc>,
}

impl CatalogIndex {
    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// Search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SongId,
    pub title: String,
    pub artist: String,

    /// Raw cosine similarity (-1.0 to 1.0)
    pub score: f32,
}

impl SearchResult {
    pub fn new(song: &Song, score: f32) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            score,
        }
    }
}

/// Catalog statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_songs: usize,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}
