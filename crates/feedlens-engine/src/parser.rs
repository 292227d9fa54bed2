//! Defensive parsing of remote inference payloads
//!
//! The remote API returns model-generated text that is supposed to be
//! JSON but routinely arrives wrapped in markdown fences, surrounded by
//! prose, or using single quotes. The parser tries an ordered chain of
//! recovery strategies before giving up; a terminal failure is reported
//! as [`Error::Parse`] and never panics.

use feedlens_core::{
    AnalysisKind, AnalysisResult, Error, InsightRecord, Result, SentimentLabel, SentimentRecord,
};
use regex::Regex;
use serde::Deserialize;

/// Parser for semi-structured analysis payloads
pub struct ResponseParser {
    fence: Regex,
}

impl ResponseParser {
    /// Build the parser
    pub fn new() -> Result<Self> {
        // First fenced code block, optional language tag after the fence
        let fence = Regex::new(r"(?s)```[a-zA-Z0-9_-]*[ \t]*\r?\n?(.*?)```")
            .map_err(|e| Error::internal(format!("failed to compile fence pattern: {e}")))?;
        Ok(Self { fence })
    }

    /// Parse a raw payload into one result per input text.
    ///
    /// Attempts, in order: the raw text itself, the first fenced code
    /// block, the bracket-delimited substring, and a single-quote
    /// normalization of the best candidate.
    pub fn parse(&self, raw: &str, kind: AnalysisKind) -> Result<Vec<AnalysisResult>> {
        let mut last_reason = "empty payload".to_string();

        for candidate in self.candidates(raw) {
            match decode(&candidate, kind) {
                Ok(results) => return Ok(results),
                Err(reason) => last_reason = reason,
            }
        }

        Err(Error::parse(
            format!("all parse attempts failed: {last_reason}"),
            raw,
        ))
    }

    fn candidates(&self, raw: &str) -> Vec<String> {
        let mut candidates = vec![raw.trim().to_string()];

        if let Some(captures) = self.fence.captures(raw) {
            if let Some(block) = captures.get(1) {
                candidates.push(block.as_str().trim().to_string());
            }
        }

        if let Some(bracketed) = bracket_substring(raw) {
            candidates.push(bracketed.to_string());
        }

        // Last resort: retry the most promising candidate with single
        // quotes normalized to double quotes
        if let Some(best) = candidates.last().cloned() {
            let normalized = best.replace('\'', "\"");
            if normalized != best {
                candidates.push(normalized);
            }
        }

        candidates.dedup();
        candidates
    }
}

/// Substring between the first opening bracket and the matching last
/// closing bracket, used when prose surrounds the JSON body
fn bracket_substring(raw: &str) -> Option<&str> {
    let array_start = raw.find('[');
    let object_start = raw.find('{');

    let (start, closer) = match (array_start, object_start) {
        (Some(a), Some(o)) if a < o => (a, ']'),
        (Some(a), None) => (a, ']'),
        (_, Some(o)) => (o, '}'),
        (None, None) => return None,
    };

    let end = raw.rfind(closer)?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn decode(candidate: &str, kind: AnalysisKind) -> std::result::Result<Vec<AnalysisResult>, String> {
    if candidate.is_empty() {
        return Err("empty candidate".to_string());
    }

    match kind {
        AnalysisKind::Sentiment => decode_sentiment(candidate),
        AnalysisKind::Insight | AnalysisKind::Summary => decode_insight(candidate),
    }
}

fn decode_sentiment(candidate: &str) -> std::result::Result<Vec<AnalysisResult>, String> {
    let records: Vec<WireSentiment> = match serde_json::from_str(candidate) {
        Ok(records) => records,
        Err(array_err) => {
            // A single-object payload is accepted for one-input batches
            let single: WireSentiment =
                serde_json::from_str(candidate).map_err(|_| array_err.to_string())?;
            vec![single]
        }
    };

    Ok(records
        .into_iter()
        .map(|wire| {
            let label = SentimentLabel::from_remote(&wire.label);
            // Absent confidence is reconstructed from score distance to
            // the neutral midpoint
            let confidence = wire
                .confidence
                .unwrap_or_else(|| (wire.score - 0.5).abs() * 2.0);
            AnalysisResult::Sentiment(SentimentRecord::new(wire.score, label, confidence))
        })
        .collect())
}

fn decode_insight(candidate: &str) -> std::result::Result<Vec<AnalysisResult>, String> {
    let records: Vec<InsightRecord> = match serde_json::from_str(candidate) {
        Ok(records) => records,
        Err(array_err) => {
            let single: InsightRecord =
                serde_json::from_str(candidate).map_err(|_| array_err.to_string())?;
            vec![single]
        }
    };

    Ok(records.into_iter().map(AnalysisResult::Insight).collect())
}

#[derive(Debug, Deserialize)]
struct WireSentiment {
    score: f32,
    label: String,
    #[serde(default)]
    confidence: Option<f32>,
}
