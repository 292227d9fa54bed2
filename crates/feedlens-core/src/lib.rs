//! Feedlens Core
//!
//! Core types and error handling shared across Feedlens components.
//!
//! This crate provides:
//! - Request/result types for the three analysis kinds
//! - Error types and result handling
//! - Batch and progress-event types used by the orchestrator

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AnalysisKind, AnalysisRequest, AnalysisResult, Batch, InsightRecord, ProgressEvent,
    ProgressSender, SentimentLabel, SentimentRecord,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AnalysisKind, AnalysisRequest, AnalysisResult, InsightRecord, SentimentLabel,
        SentimentRecord,
    };
}
