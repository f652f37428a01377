//! # Runner
//!
//! This crate maps batches of source files to embedding records under one of
//! three interchangeable execution strategies.
//!
//! ## Strategies
//!
//! - **Threads**: a bounded pool of concurrent single-file requests
//! - **Ray**: a distributed partitioned frame with batched column transforms
//! - **Daft**: a locally partitioned frame with a per-row embedding UDF
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Embed Runner                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  RunnerKind ──► ThreadedEmbedder | FrameEmbedder                │
//! │                        │                │                       │
//! │                        │         strategy error                 │
//! │                        │                ▼                       │
//! │                        └──────── threaded fallback              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Whatever the strategy, every submitted file comes back with exactly one
//! record: a real embedding or an explicit empty-vector marker.

pub mod error;
pub mod frame;
pub mod strategy;
pub mod threaded;

pub use error::{Result, RunnerError};
pub use frame::{EmbedTransform, FrameBackend, FrameEmbedder};
pub use strategy::{BatchEmbedder, EmbedRunner, RunnerKind};
pub use threaded::ThreadedEmbedder;
