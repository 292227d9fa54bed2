//! Top-level analysis orchestrator
//!
//! Composes the cache, circuit breaker, throttle, batch planner, parser,
//! and local analyzer behind a single `submit` entry point. Remote and
//! parse failures never surface to callers: affected batches are served
//! by the local fallback path instead, and the result sequence always
//! stays index-aligned with the request.

use crate::batch::BatchPlanner;
use crate::cache::{CacheStats, ResultCache};
use crate::circuit::{CircuitBreaker, CircuitState};
use crate::config::EngineConfig;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::parser::ResponseParser;
use crate::remote::RemoteAnalysisApi;
use crate::throttle::{AdaptiveThrottle, RemoteOutcome};
use feedlens_analyzer::LexiconAnalyzer;
use feedlens_core::{
    AnalysisKind, AnalysisRequest, AnalysisResult, Batch, Error, InsightRecord, ProgressEvent,
    ProgressSender, Result,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Orchestrates analysis requests across cache, remote API, and local
/// fallback
///
/// Owns all shared mutable state (circuit, throttle, cache, metrics) as
/// fields; construct once per process and share by reference.
pub struct Orchestrator {
    config: EngineConfig,
    cache: ResultCache,
    circuit: CircuitBreaker,
    throttle: AdaptiveThrottle,
    planner: BatchPlanner,
    parser: ResponseParser,
    analyzer: Arc<LexiconAnalyzer>,
    remote: Arc<dyn RemoteAnalysisApi>,
    metrics: EngineMetrics,
    local_slots: Arc<Semaphore>,
    remote_slots: Arc<Semaphore>,
}

impl Orchestrator {
    /// Build an orchestrator from configuration and a remote API client
    pub fn new(config: EngineConfig, remote: Arc<dyn RemoteAnalysisApi>) -> Result<Self> {
        let analyzer = Arc::new(LexiconAnalyzer::new()?);
        let parser = ResponseParser::new()?;

        info!(
            failure_threshold = config.failure_threshold,
            local_concurrency = config.local_concurrency,
            remote_concurrency = config.remote_concurrency,
            "initializing analysis orchestrator"
        );

        Ok(Self {
            cache: ResultCache::new(config.cache_capacity),
            circuit: CircuitBreaker::new(config.failure_threshold, config.reset_timeout()),
            throttle: AdaptiveThrottle::new(config.throttle_floor(), config.throttle_ceiling()),
            planner: BatchPlanner::new(config.remote_batch_sizes, config.local_batch_sizes),
            parser,
            analyzer,
            remote,
            metrics: EngineMetrics::new(),
            local_slots: Arc::new(Semaphore::new(config.local_concurrency)),
            remote_slots: Arc::new(Semaphore::new(config.remote_concurrency)),
            config,
        })
    }

    /// Analyze a request, returning one result per input in input order
    pub async fn submit(&self, request: AnalysisRequest) -> Result<Vec<AnalysisResult>> {
        let total = request.texts.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let mut slots: Vec<Option<AnalysisResult>> = vec![None; total];

        // Cache probe, one partition per kind
        let mut misses: Vec<(usize, String)> = Vec::new();
        for (index, text) in request.texts.iter().enumerate() {
            match self.cache.get(text, request.kind) {
                Some(result) => slots[index] = Some(result),
                None => misses.push((index, text.clone())),
            }
        }

        let hits = (total - misses.len()) as u64;
        self.metrics.record_cache_hits(hits);
        self.metrics.record_cache_misses(misses.len() as u64);
        metrics::counter!("feedlens_cache_probes_total", "outcome" => "hit").increment(hits);
        metrics::counter!("feedlens_cache_probes_total", "outcome" => "miss")
            .increment(misses.len() as u64);

        if misses.is_empty() {
            ProgressReporter::new(request.progress.as_ref(), 0, total, total).emit();
            return collect(slots);
        }

        // Sentiment always runs locally to conserve remote quota for the
        // higher-value insight/summary calls; everything else runs local
        // only while the circuit is open.
        let route_local = request.kind == AnalysisKind::Sentiment || self.circuit.is_open();

        if route_local {
            self.run_local(&request, misses, &mut slots).await;
        } else {
            self.run_remote(&request, misses, &mut slots, started).await;
            self.backfill_abandoned(&request, &mut slots);
        }

        debug!(
            kind = %request.kind,
            total,
            cache_hits = hits,
            latency_ms = started.elapsed().as_millis() as u64,
            "request complete"
        );

        collect(slots)
    }

    /// Read-only health snapshot for monitoring
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            // The lexicon path cannot fail, so analysis is always available,
            // if possibly degraded
            available: true,
            circuit_open: self.circuit.current_state() == CircuitState::Open,
            rate_limited: self.throttle.is_backing_off(),
            cache: self.cache.stats(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Process misses on the local path: lexicon analysis for sentiment,
    /// degraded records for insight/summary
    async fn run_local(
        &self,
        request: &AnalysisRequest,
        misses: Vec<(usize, String)>,
        slots: &mut [Option<AnalysisResult>],
    ) {
        let kind = request.kind;
        let total = request.texts.len();
        let batches = self.planner.plan_local(&misses);
        self.metrics.record_local_fallbacks(misses.len() as u64);

        let mut reporter = ProgressReporter::new(
            request.progress.as_ref(),
            batches.len(),
            total,
            total - misses.len(),
        );
        reporter.emit();

        let mut tasks: FuturesUnordered<_> = batches
            .into_iter()
            .map(|batch| {
                let analyzer = Arc::clone(&self.analyzer);
                let permits = Arc::clone(&self.local_slots);
                async move {
                    let _permit = permits.acquire_owned().await.ok();
                    let results = local_results(&analyzer, &batch, kind);
                    (batch, results)
                }
            })
            .collect();

        while let Some((batch, results)) = tasks.next().await {
            let completed = batch.len();
            for ((index, text), result) in batch
                .original_indices
                .iter()
                .zip(batch.texts.iter())
                .zip(results)
            {
                // Degraded insight records are not cached: they would keep
                // serving emptiness after the remote API recovers
                if kind == AnalysisKind::Sentiment {
                    self.cache.put(text, result.clone(), kind);
                }
                slots[*index] = Some(result);
            }
            reporter.batch_completed(completed);
        }
    }

    /// Process misses on the remote path, falling back per batch
    async fn run_remote(
        &self,
        request: &AnalysisRequest,
        misses: Vec<(usize, String)>,
        slots: &mut [Option<AnalysisResult>],
        started: Instant,
    ) {
        let kind = request.kind;
        let total = request.texts.len();
        let batches = self.planner.plan_remote(&misses);

        let mut reporter = ProgressReporter::new(
            request.progress.as_ref(),
            batches.len(),
            total,
            total - misses.len(),
        );
        reporter.emit();

        let mut tasks: FuturesUnordered<_> = batches
            .into_iter()
            .map(|batch| self.process_remote_batch(batch, kind))
            .collect();

        let drain = async {
            while let Some((batch, results)) = tasks.next().await {
                let completed = batch.len();
                for (index, result) in batch.original_indices.iter().zip(results) {
                    slots[*index] = Some(result);
                }
                reporter.batch_completed(completed);
            }
        };

        match request.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_sub(started.elapsed());
                if tokio::time::timeout(remaining, drain).await.is_err() {
                    warn!(
                        kind = %kind,
                        deadline_ms = deadline.as_millis() as u64,
                        "request deadline expired, abandoning outstanding batches"
                    );
                }
            }
            None => drain.await,
        }
    }

    /// One remote batch: throttle, call, parse; on any failure feed the
    /// breaker/throttle and serve the batch locally instead
    async fn process_remote_batch(
        &self,
        batch: Batch,
        kind: AnalysisKind,
    ) -> (Batch, Vec<AnalysisResult>) {
        let _permit = self.remote_slots.acquire().await.ok();
        self.throttle.wait_if_needed().await;

        let started = Instant::now();
        let outcome = self.call_remote(&batch, kind).await;
        let latency = started.elapsed();

        self.metrics.record_remote_call(latency.as_micros() as u64);
        metrics::histogram!("feedlens_remote_latency_us").record(latency.as_micros() as f64);

        match outcome {
            Ok(results) => {
                self.circuit.record_success();
                self.throttle.adjust(RemoteOutcome::Success);
                metrics::counter!("feedlens_remote_batches_total", "outcome" => "ok").increment(1);

                for (text, result) in batch.texts.iter().zip(results.iter()) {
                    self.cache.put(text, result.clone(), kind);
                }

                debug!(
                    batch = batch.len(),
                    latency_ms = latency.as_millis() as u64,
                    "remote batch complete"
                );
                (batch, results)
            }
            Err(err) => {
                self.metrics.record_remote_failure();
                self.circuit.record_failure();
                self.throttle.adjust(if err.is_quota() {
                    RemoteOutcome::Quota
                } else {
                    RemoteOutcome::Failure
                });
                metrics::counter!("feedlens_remote_batches_total", "outcome" => "fallback")
                    .increment(1);

                warn!(
                    error = %err,
                    batch = batch.len(),
                    "remote batch failed, serving local fallback"
                );

                self.metrics.record_local_fallbacks(batch.len() as u64);
                let results = local_results(&self.analyzer, &batch, kind);
                (batch, results)
            }
        }
    }

    async fn call_remote(&self, batch: &Batch, kind: AnalysisKind) -> Result<Vec<AnalysisResult>> {
        let raw = tokio::time::timeout(
            self.config.remote_timeout(),
            self.remote.analyze_batch(&batch.texts, kind),
        )
        .await
        .map_err(|_| Error::Timeout)??;

        let results = self.parser.parse(&raw, kind)?;
        if results.len() != batch.len() {
            return Err(Error::parse(
                format!(
                    "record count mismatch: expected {}, got {}",
                    batch.len(),
                    results.len()
                ),
                &raw,
            ));
        }
        Ok(results)
    }

    /// Fill slots left empty by deadline-abandoned batches from the local
    /// path so the caller always receives a full result sequence
    fn backfill_abandoned(&self, request: &AnalysisRequest, slots: &mut [Option<AnalysisResult>]) {
        let mut backfilled = 0u64;
        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(local_result(
                    &self.analyzer,
                    &request.texts[index],
                    request.kind,
                ));
                backfilled += 1;
            }
        }
        if backfilled > 0 {
            self.metrics.record_local_fallbacks(backfilled);
            info!(count = backfilled, "backfilled abandoned slots locally");
        }
    }
}

/// Engine health snapshot exposed to monitoring
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    /// Whether any analysis path is available (always true: the local
    /// path has no external dependency)
    pub available: bool,

    /// Whether the circuit to the remote API is currently open
    pub circuit_open: bool,

    /// Whether the throttle is backing off above its floor
    pub rate_limited: bool,

    /// Cache hit/miss/size counters per partition
    pub cache: CacheStats,

    /// Call and latency counters
    pub metrics: MetricsSnapshot,
}

fn local_results(
    analyzer: &LexiconAnalyzer,
    batch: &Batch,
    kind: AnalysisKind,
) -> Vec<AnalysisResult> {
    match kind {
        AnalysisKind::Sentiment => analyzer
            .analyze_batch(&batch.texts)
            .into_iter()
            .map(AnalysisResult::Sentiment)
            .collect(),
        AnalysisKind::Insight | AnalysisKind::Summary => batch
            .texts
            .iter()
            .map(|_| AnalysisResult::Insight(InsightRecord::unavailable()))
            .collect(),
    }
}

fn local_result(analyzer: &LexiconAnalyzer, text: &str, kind: AnalysisKind) -> AnalysisResult {
    match kind {
        AnalysisKind::Sentiment => AnalysisResult::Sentiment(analyzer.analyze(text)),
        AnalysisKind::Insight | AnalysisKind::Summary => {
            AnalysisResult::Insight(InsightRecord::unavailable())
        }
    }
}

fn collect(slots: Vec<Option<AnalysisResult>>) -> Result<Vec<AnalysisResult>> {
    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| Error::internal("result slot left unfilled")))
        .collect()
}

/// Pushes progress events into the caller's sink as batches complete
struct ProgressReporter<'a> {
    sender: Option<&'a ProgressSender>,
    batches_total: usize,
    items_total: usize,
    batches_done: usize,
    items_processed: usize,
}

impl<'a> ProgressReporter<'a> {
    fn new(
        sender: Option<&'a ProgressSender>,
        batches_total: usize,
        items_total: usize,
        items_processed: usize,
    ) -> Self {
        Self {
            sender,
            batches_total,
            items_total,
            batches_done: 0,
            items_processed,
        }
    }

    fn batch_completed(&mut self, items: usize) {
        self.batches_done += 1;
        self.items_processed += items;
        self.emit();
    }

    fn emit(&self) {
        if let Some(sender) = self.sender {
            // A dropped receiver just means nobody is watching
            let _ = sender.send(ProgressEvent {
                batches_done: self.batches_done,
                batches_total: self.batches_total,
                items_processed: self.items_processed,
                items_total: self.items_total,
            });
        }
    }
}
