//! Streaming ingestion pipeline for MuseCam's idea generation.
//!
//! The `ideas` crate defines the [`Idea`] data model, an [`IdeaSource`]
//! trait with a concrete HTTP implementation, and the [`Analyzer`] which
//! turns an incrementally-delivered response body into ordered
//! [`AnalysisState`] snapshots a presentation layer can render directly.

pub mod accumulator;
pub mod client;
pub mod model;
pub mod session;
pub mod traits;

pub use accumulator::LineAccumulator;
pub use client::HttpIdeaSource;
pub use model::{AnalyzeRequest, Idea, IdeaBatch, Language, MAX_IDEAS};
pub use session::{AnalysisState, Analyzer, StreamSession, DEFAULT_BUDGET};
pub use traits::{AnalysisError, ByteStream, IdeaSource};
