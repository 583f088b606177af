//! MusicMind embedding models
//!
//! `Embedder` trait plus the Ollama HTTP backend and an offline hashing backend

mod client;
mod embedder;
mod hash;
mod types;

pub use client::OllamaEmbedder;
pub use embedder::{build_embedder, Embedder};
pub use hash::HashEmbedder;
pub use types::{EmbedRequest, EmbedResponse};
