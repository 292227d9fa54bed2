//! Remote inference API client
//!
//! The orchestrator talks to the cloud text-analysis service through the
//! [`RemoteAnalysisApi`] trait so tests can substitute scripted backends.
//! [`HttpRemoteApi`] is the production implementation.

use async_trait::async_trait;
use feedlens_core::{AnalysisKind, Error, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// A request/response call into the remote text-analysis service
#[async_trait]
pub trait RemoteAnalysisApi: Send + Sync {
    /// Analyze one batch of texts, returning the raw textual payload.
    ///
    /// The payload is model-generated and possibly malformed; decoding is
    /// the parser's responsibility, not the client's.
    async fn analyze_batch(&self, texts: &[String], kind: AnalysisKind) -> Result<String>;
}

/// HTTP client for the remote inference endpoint
pub struct HttpRemoteApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    texts: &'a [String],
    task: &'a str,
}

impl HttpRemoteApi {
    /// Create a client for the given endpoint
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    fn task_instruction(kind: AnalysisKind) -> &'static str {
        match kind {
            AnalysisKind::Sentiment => {
                "Score the sentiment of each text. Respond with a JSON array of \
                 {score, label, confidence} objects, one per text, in input order."
            }
            AnalysisKind::Insight => {
                "Extract insights from each text. Respond with a JSON array of \
                 {summary, key_points, pain_points, feature_requests, positive_aspects} \
                 objects, one per text, in input order."
            }
            AnalysisKind::Summary => {
                "Summarize each text. Respond with a JSON array of \
                 {summary, key_points, pain_points, feature_requests, positive_aspects} \
                 objects, one per text, in input order."
            }
        }
    }
}

#[async_trait]
impl RemoteAnalysisApi for HttpRemoteApi {
    async fn analyze_batch(&self, texts: &[String], kind: AnalysisKind) -> Result<String> {
        let body = AnalyzeRequest {
            texts,
            task: Self::task_instruction(kind),
        };

        debug!(batch = texts.len(), kind = %kind, "dispatching remote batch");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::remote(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_remote_error(status.as_u16(), &message));
        }

        response
            .text()
            .await
            .map_err(|e| Error::remote(format!("failed to read response body: {e}")))
    }
}

/// Classify a failed remote call, separating quota/rate rejections from
/// ordinary failures by status code and message inspection
pub fn classify_remote_error(status: u16, message: &str) -> Error {
    let lowered = message.to_lowercase();
    if status == 429
        || lowered.contains("quota")
        || lowered.contains("rate")
        || lowered.contains("429")
    {
        Error::quota(format!("status {status}: {message}"))
    } else {
        Error::remote(format!("status {status}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_quota() {
        assert!(classify_remote_error(429, "").is_quota());
    }

    #[test]
    fn quota_detected_by_message_substring() {
        assert!(classify_remote_error(400, "Quota exhausted for project").is_quota());
        assert!(classify_remote_error(503, "rate limit reached").is_quota());
        assert!(classify_remote_error(500, "HTTP 429 from upstream").is_quota());
    }

    #[test]
    fn plain_failures_stay_remote_errors() {
        let err = classify_remote_error(500, "internal server error");
        assert!(!err.is_quota());
        assert!(err.is_remote_failure());
    }
}
