//! # Analysis
//!
//! Downstream analysis over stored embedding records:
//!
//! - **Code Statistics**: per-file line and declaration counts
//! - **Code Reports**: structured quality reports from a chat model, with
//!   verbatim fallback for unparseable replies
//! - **Enhanced Analysis**: similar pairs plus one report per file, written
//!   as a single artifact

pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

pub use engine::{
    AnalysisEngine, AnalyzeRunner, EnhancedAnalysis, SIMILARITY_THRESHOLD, SimilarPair,
};
pub use error::{AnalysisError, Result};
pub use report::{AnalysisReport, CodeAnalyzer, KeyFunctions, ParsedReport};
pub use stats::{CodeStats, LanguageProfile, extract_stats};
