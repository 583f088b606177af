//! MusicMind song search
//!
//! Catalog loading, cosine similarity ranking and the lazily initialized search service

mod catalog;
mod engine;
mod similarity;
mod types;

pub use catalog::load_songs;
pub use engine::{rank, SearchService};
pub use similarity::cosine_similarity;
pub use types::{CatalogIndex, CatalogStats, SearchResult, Song, SongId};
