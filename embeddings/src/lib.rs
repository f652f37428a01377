//! # Embeddings
//!
//! This crate provides the data model and remote-service clients for the
//! codesim analysis pipeline.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert source code to dense vectors via an
//!   OpenAI-compatible embeddings API
//! - **Chat Completions**: Request structured code reports from a chat model
//! - **Similarity**: Exact pairwise cosine similarity with threshold ranking
//! - **Record Store**: JSON persistence for per-file embedding records
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Embeddings System                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingClient ──► EmbeddingRecord ──► embeddings.json        │
//! │       │                    │                                    │
//! │       ▼                    ▼                                    │
//! │  ChatClient          SimilarityMatch                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod chat;
pub mod client;
pub mod error;
pub mod similarity;
pub mod store;

pub use chat::{ChatClient, ChatRequest};
pub use client::{EmbeddingClient, ServiceConfig};
pub use error::{EmbeddingError, Result};
pub use similarity::{SimilarityMatch, cosine_similarity, find_similar_pairs};
pub use store::{EmbeddingRecord, SourceFile, load_records, save_records};

/// A dense vector embedding.
pub type Embedding = Vec<f64>;
