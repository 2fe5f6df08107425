// crates/verity-consensus/src/service.rs
//
// ConsensusService: the async request layer wrapped around the engine.
//
// Adds what the engine deliberately leaves out: result caching, metadata
// enrichment from an external store, an evaluation deadline, per-content
// ordering of successive evaluations, and execution metrics. The engine
// itself stays pure and synchronous; evaluations run on the blocking pool.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinSet;
use verity_core::{
    ConsensusRequest, ConsensusResult, MetadataStore, Source, SourceMetadata, VerityError,
};

use crate::cache::{request_fingerprint, ConsensusCache};
use crate::engine::ConsensusEngine;

/// Outcome of one request inside a batch or history.
pub type Outcome = Result<Arc<ConsensusResult>, VerityError>;

/// Metadata recorded in memory, keyed by `source_id`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataStore {
    entries: HashMap<String, SourceMetadata>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: impl Into<String>, metadata: SourceMetadata) {
        self.entries.insert(source_id.into(), metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn lookup(&self, source: &Source) -> Result<Option<SourceMetadata>, VerityError> {
        Ok(source
            .source_id
            .as_ref()
            .and_then(|id| self.entries.get(id))
            .copied())
    }
}

/// Snapshot of service execution counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ServiceMetrics {
    /// Evaluations actually run (cache hits excluded).
    pub evaluations: u64,
    /// Evaluations that returned an error.
    pub errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Wall time of the most recent evaluation, in milliseconds.
    pub last_execution_ms: u64,
    /// Fraction of evaluations that succeeded; 1.0 before any evaluation.
    pub success_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    evaluations: AtomicU64,
    errors: AtomicU64,
    last_execution_ms: AtomicU64,
}

/// Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct ConsensusService {
    engine: Arc<ConsensusEngine>,
    cache: ConsensusCache,
    metadata: Option<Arc<dyn MetadataStore>>,
    timeout: Option<Duration>,
    counters: Arc<Counters>,
}

impl ConsensusService {
    pub fn new(engine: Arc<ConsensusEngine>, cache: ConsensusCache) -> Self {
        Self {
            engine,
            cache,
            metadata: None,
            timeout: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Fill in missing quality/evidence scores from `store` before evaluating.
    pub fn with_metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata = Some(store);
        self
    }

    /// Fail evaluations that run longer than `timeout_ms`.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    pub fn engine(&self) -> &ConsensusEngine {
        &self.engine
    }

    pub fn cache(&self) -> &ConsensusCache {
        &self.cache
    }

    /// Serve one request; a live cache entry produced by an identical
    /// request (same sources, same previous score) short-circuits evaluation.
    pub async fn handle(&self, request: ConsensusRequest) -> Outcome {
        let fingerprint = request_fingerprint(&request)?;
        let now = self.engine.now();
        if let Some(hit) = self.cache.get(&request.content_id, fingerprint, now).await {
            tracing::debug!("Cache hit for {}", request.content_id);
            return Ok(hit);
        }

        let result = self.evaluate_fresh(request).await?;
        Ok(self.cache.insert(result, fingerprint, self.engine.now()).await)
    }

    /// Evaluate requests strictly in order, bypassing cache reads.
    ///
    /// A request without `previous_consensus_score` inherits the score of the
    /// last successful evaluation for the same content id, so successive
    /// evidence snapshots move through the state machine causally.
    pub async fn handle_history(&self, requests: Vec<ConsensusRequest>) -> Vec<Outcome> {
        let mut last_scores: HashMap<String, f64> = HashMap::new();
        let mut outcomes = Vec::with_capacity(requests.len());

        for mut request in requests {
            if request.previous_consensus_score.is_none() {
                request.previous_consensus_score = last_scores.get(&request.content_id).copied();
            }

            let fingerprint = match request_fingerprint(&request) {
                Ok(fingerprint) => fingerprint,
                Err(e) => {
                    outcomes.push(Err(e));
                    continue;
                }
            };
            let outcome = match self.evaluate_fresh(request).await {
                Ok(result) => {
                    last_scores.insert(result.content_id.clone(), result.consensus_score);
                    Ok(self.cache.insert(result, fingerprint, self.engine.now()).await)
                }
                Err(e) => Err(e),
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Evaluate many requests: different content ids run concurrently,
    /// requests for the same content id run in input order.
    ///
    /// Outcomes are returned in input order.
    pub async fn handle_batch(&self, requests: Vec<ConsensusRequest>) -> Vec<Outcome> {
        let total = requests.len();

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<(usize, ConsensusRequest)>> = HashMap::new();
        for (index, request) in requests.into_iter().enumerate() {
            let group = groups.entry(request.content_id.clone()).or_insert_with(|| {
                order.push(request.content_id.clone());
                Vec::new()
            });
            group.push((index, request));
        }

        let mut tasks = JoinSet::new();
        for content_id in order {
            let Some(group) = groups.remove(&content_id) else {
                continue;
            };
            let service = self.clone();
            tasks.spawn(async move {
                let (indices, requests): (Vec<usize>, Vec<ConsensusRequest>) = group.into_iter().unzip();
                let outcomes = service.handle_history(requests).await;
                indices.into_iter().zip(outcomes).collect::<Vec<_>>()
            });
        }

        let mut slots: Vec<Option<Outcome>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcomes) => {
                    for (index, outcome) in outcomes {
                        slots[index] = Some(outcome);
                    }
                }
                Err(e) => tracing::warn!("Batch group task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(VerityError::Internal("batch group task did not complete".into())))
            })
            .collect()
    }

    pub fn metrics(&self) -> ServiceMetrics {
        let evaluations = self.counters.evaluations.load(Ordering::Relaxed);
        let errors = self.counters.errors.load(Ordering::Relaxed);
        let cache = self.cache.stats();
        let success_rate = if evaluations == 0 {
            1.0
        } else {
            (evaluations - errors) as f64 / evaluations as f64
        };
        ServiceMetrics {
            evaluations,
            errors,
            cache_hits: cache.hits,
            cache_misses: cache.misses,
            last_execution_ms: self.counters.last_execution_ms.load(Ordering::Relaxed),
            success_rate,
        }
    }

    async fn evaluate_fresh(&self, request: ConsensusRequest) -> Result<ConsensusResult, VerityError> {
        let started = Instant::now();
        let content_id = request.content_id.clone();

        let outcome = match self.enrich(request).await {
            Ok(request) => self.run_blocking(request).await,
            Err(e) => Err(e),
        };

        self.counters.evaluations.fetch_add(1, Ordering::Relaxed);
        self.counters
            .last_execution_ms
            .store(started.elapsed().as_millis() as u64, Ordering::Relaxed);
        if let Err(e) = &outcome {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Consensus request for {} rejected: {}", content_id, e);
        }
        outcome
    }

    async fn run_blocking(&self, request: ConsensusRequest) -> Result<ConsensusResult, VerityError> {
        let engine = Arc::clone(&self.engine);
        let handle = tokio::task::spawn_blocking(move || engine.evaluate(&request));

        // On timeout the blocking evaluation is abandoned, not interrupted.
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| VerityError::Timeout(limit.as_millis() as u64))?,
            None => handle.await,
        };

        joined.map_err(|e| VerityError::Internal(format!("evaluation task failed: {}", e)))?
    }

    /// Copy the request, filling only fields the caller left empty.
    async fn enrich(&self, mut request: ConsensusRequest) -> Result<ConsensusRequest, VerityError> {
        let Some(store) = &self.metadata else {
            return Ok(request);
        };

        for source in request.sources.iter_mut() {
            if source.quality_score.is_some() && source.evidence_strength.is_some() {
                continue;
            }
            if let Some(meta) = store.lookup(source).await? {
                source.quality_score = source.quality_score.or(meta.quality_score);
                source.evidence_strength = source.evidence_strength.or(meta.evidence_strength);
            }
        }
        Ok(request)
    }
}
