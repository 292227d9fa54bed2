//! Core types for Feedlens

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// The kind of analysis requested for a set of feedback texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Per-text sentiment scoring
    Sentiment,
    /// Structured insight extraction (pain points, feature requests, ...)
    Insight,
    /// Aggregated summary over the submitted texts
    Summary,
}

impl AnalysisKind {
    /// Stable string form used for cache partitioning and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Insight => "insight",
            Self::Summary => "summary",
        }
    }

    /// All kinds, in partition order
    pub const ALL: [AnalysisKind; 3] = [Self::Sentiment, Self::Insight, Self::Summary];
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment polarity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Parse a label from a remote payload, tolerating case variations.
    /// Unknown labels map to `Neutral` rather than failing the whole batch.
    pub fn from_remote(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

/// Per-text sentiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    /// Normalized sentiment score (0.0 = most negative, 1.0 = most positive)
    pub score: f32,

    /// Polarity label
    pub label: SentimentLabel,

    /// Confidence in the label (0.0-1.0)
    pub confidence: f32,
}

impl SentimentRecord {
    /// Create a record with score and confidence clamped into [0, 1]
    pub fn new(score: f32, label: SentimentLabel, confidence: f32) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Neutral default used when no stronger signal exists
    pub fn neutral() -> Self {
        Self {
            score: 0.5,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// Structured insight record for insight/summary analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    /// Narrative summary of the feedback
    pub summary: String,

    /// Key points raised across the feedback
    #[serde(default)]
    pub key_points: Vec<String>,

    /// Problems and frustrations mentioned
    #[serde(default)]
    pub pain_points: Vec<String>,

    /// Requested features or improvements
    #[serde(default)]
    pub feature_requests: Vec<String>,

    /// Aspects the feedback praises
    #[serde(default)]
    pub positive_aspects: Vec<String>,
}

impl InsightRecord {
    /// Degraded-capability record returned when the remote API is
    /// unavailable and no local equivalent exists
    pub fn unavailable() -> Self {
        Self {
            summary: "Analysis temporarily unavailable".to_string(),
            key_points: Vec::new(),
            pain_points: Vec::new(),
            feature_requests: Vec::new(),
            positive_aspects: Vec::new(),
        }
    }

    /// Whether this record carries any extracted content
    pub fn is_empty(&self) -> bool {
        self.key_points.is_empty()
            && self.pain_points.is_empty()
            && self.feature_requests.is_empty()
            && self.positive_aspects.is_empty()
    }
}

/// Result of analyzing a single input text
///
/// Modeled as a tagged union with per-kind payloads so decoding errors
/// surface at the type level instead of at field-access time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisResult {
    /// Sentiment scoring result
    Sentiment(SentimentRecord),
    /// Insight/summary extraction result
    Insight(InsightRecord),
}

impl AnalysisResult {
    /// The sentiment record, if this is a sentiment result
    pub fn as_sentiment(&self) -> Option<&SentimentRecord> {
        match self {
            Self::Sentiment(record) => Some(record),
            Self::Insight(_) => None,
        }
    }

    /// The insight record, if this is an insight result
    pub fn as_insight(&self) -> Option<&InsightRecord> {
        match self {
            Self::Insight(record) => Some(record),
            Self::Sentiment(_) => None,
        }
    }
}

/// Progress event emitted as batches complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Batches finished so far
    pub batches_done: usize,

    /// Total batches planned for this request
    pub batches_total: usize,

    /// Inputs with a result so far (cache hits included)
    pub items_processed: usize,

    /// Total inputs in the request
    pub items_total: usize,
}

/// Channel end the orchestrator pushes [`ProgressEvent`]s into
pub type ProgressSender = UnboundedSender<ProgressEvent>;

/// A request to analyze an ordered sequence of feedback texts
///
/// Immutable once submitted; the result sequence is index-aligned with
/// `texts` regardless of caching, batching, or fallback routing.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Input texts, in caller order
    pub texts: Vec<String>,

    /// Requested analysis kind
    pub kind: AnalysisKind,

    /// Optional progress sink, consumed by the UI layer
    pub progress: Option<ProgressSender>,

    /// Optional overall deadline; on expiry, unfinished batches are
    /// backfilled from the local analyzer instead of blocking
    pub deadline: Option<Duration>,
}

impl AnalysisRequest {
    /// Create a new request
    pub fn new(texts: Vec<String>, kind: AnalysisKind) -> Self {
        Self {
            texts,
            kind,
            progress: None,
            deadline: None,
        }
    }

    /// Attach a progress sink
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach an overall deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Number of inputs in this request
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the request has no inputs
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// A planned subset of a request's inputs, processed as one unit
///
/// `original_indices[i]` is the position of `texts[i]` in the submitted
/// request, so results scatter back correctly regardless of completion
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Positions of this batch's texts in the original request
    pub original_indices: Vec<usize>,

    /// The batch's input texts
    pub texts: Vec<String>,
}

impl Batch {
    /// Number of texts in this batch
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
