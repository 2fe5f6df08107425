// crates/verity-consensus/src/cache.rs
//
// ConsensusCache: TTL result cache keyed by content id.
//
// Lives outside the engine. Each entry remembers the fingerprint of the
// request that produced it; a lookup only hits when the fingerprint
// matches, so a request with different sources or a different previous
// score is always evaluated. Entries are published whole behind the write
// lock as Arc<ConsensusResult>, so a reader either sees the previous entry
// or the complete new one.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use verity_core::{ConsensusRequest, ConsensusResult, Source, VerityError};

/// Entry count below which inserts never sweep.
const MIN_SWEEP_AT: usize = 16;

/// Fingerprint of everything in a request that affects its result.
pub fn request_fingerprint(request: &ConsensusRequest) -> Result<u64, VerityError> {
    #[derive(Serialize)]
    struct Key<'a> {
        sources: &'a [Source],
        previous_consensus_score: Option<f64>,
    }

    let bytes = serde_json::to_vec(&Key {
        sources: &request.sources,
        previous_consensus_score: request.previous_consensus_score,
    })?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(hasher.finish())
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Arc<ConsensusResult>,
    fingerprint: u64,
    expires_at: f64,
}

#[derive(Debug)]
struct CacheMap {
    entries: HashMap<String, CacheEntry>,
    /// Size at which the next insert sweeps expired entries.
    sweep_at: usize,
}

impl CacheMap {
    fn evict_expired(&mut self, now: f64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP_AT);
        before - self.entries.len()
    }
}

/// Hit/miss counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Shared TTL cache, cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct ConsensusCache {
    inner: Arc<RwLock<CacheMap>>,
    ttl_secs: f64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ConsensusCache {
    /// Create a cache whose entries live for `ttl_secs` seconds.
    pub fn new(ttl_secs: f64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheMap {
                entries: HashMap::new(),
                sweep_at: MIN_SWEEP_AT,
            })),
            ttl_secs,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl_secs(&self) -> f64 {
        self.ttl_secs
    }

    /// Look up a live entry produced by a request with `fingerprint`.
    /// Expired or mismatched entries count as misses.
    pub async fn get(&self, content_id: &str, fingerprint: u64, now: f64) -> Option<Arc<ConsensusResult>> {
        let inner = self.inner.read().await;
        match inner.entries.get(content_id) {
            Some(entry) if entry.expires_at > now && entry.fingerprint == fingerprint => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.result))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Publish a result, replacing any previous entry for its content id.
    ///
    /// Once the map has doubled since the last sweep, expired entries are
    /// evicted first, so the size stays proportional to the live set.
    pub async fn insert(&self, result: ConsensusResult, fingerprint: u64, now: f64) -> Arc<ConsensusResult> {
        let result = Arc::new(result);
        let entry = CacheEntry {
            result: Arc::clone(&result),
            fingerprint,
            expires_at: now + self.ttl_secs,
        };

        let mut inner = self.inner.write().await;
        if inner.entries.len() >= inner.sweep_at {
            let evicted = inner.evict_expired(now);
            if evicted > 0 {
                tracing::debug!("Evicted {} expired consensus cache entries on insert", evicted);
            }
        }
        inner.entries.insert(result.content_id.clone(), entry);
        result
    }

    /// Drop the entry for `content_id`, if any.
    pub async fn invalidate(&self, content_id: &str) -> bool {
        self.inner.write().await.entries.remove(content_id).is_some()
    }

    /// Remove all entries expired at `now`. Returns how many were removed.
    pub async fn evict_expired(&self, now: f64) -> usize {
        let evicted = self.inner.write().await.evict_expired(now);
        if evicted > 0 {
            tracing::debug!("Evicted {} expired consensus cache entries", evicted);
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
