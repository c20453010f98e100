//! Run orchestration for one source and trigger time.
//!
//! 1. Return the cached result set if `(source, trigger_time)` was computed.
//! 2. Enumerate targets and warm up the source session.
//! 3. Fetch targets concurrently (bounded); pages within a target run in order.
//! 4. Extract, gate and score each target's posts as results arrive in
//!    target order, stopping once enough posts are admitted.
//!    Posts whose URL was already admitted are dropped before counting.
//! 5. Rank, truncate, and cache non-empty complete results.
//!
//! The optional run deadline covers the warm-up as well as the fetches.
//!
//! Fetch failures never abort a run: the failed target contributes nothing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use crowdpulse_core::{CanonicalPost, ScoredPost, Target};
use crowdpulse_fetch::{FetchClient, SessionToken};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{CacheKey, SessionCache};
use crate::lexicon::Lexicon;
use crate::rank::rank;
use crate::scorer::Scorer;
use crate::sources::SourceAdapter;
use crate::types::ResultSet;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on ranked posts per run; collection stops early once
    /// this many posts pass the gate.
    pub max_posts: usize,
    /// Targets processed concurrently. Request-level concurrency is bounded
    /// separately by the fetch client.
    pub max_concurrent_targets: usize,
    /// Wall-clock budget for the whole run. A run that hits it returns what
    /// it has and is not cached.
    pub run_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_posts: 100,
            max_concurrent_targets: 4,
            run_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStage {
    CacheCheck,
    Enumerating,
    Fetching,
    Ranking,
    Caching,
}

impl RunStage {
    fn as_str(self) -> &'static str {
        match self {
            RunStage::CacheCheck => "cache_check",
            RunStage::Enumerating => "enumerating",
            RunStage::Fetching => "fetching",
            RunStage::Ranking => "ranking",
            RunStage::Caching => "caching",
        }
    }
}

fn enter(stage: RunStage) {
    tracing::debug!(stage = stage.as_str(), "run stage");
}

struct RunOutcome {
    result: ResultSet,
    deadline_hit: bool,
}

type KeyLocks = StdMutex<HashMap<CacheKey, Arc<Mutex<()>>>>;

/// A run's claim on its key lock. Dropping the last lease for a key removes
/// the key from the map, including when the run future is cancelled.
struct KeyLease<'a> {
    locks: &'a KeyLocks,
    key: CacheKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for KeyLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this lease are the only holders: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

/// Crawl-score-rank orchestrator shared by every source.
pub struct Pipeline {
    fetcher: Arc<FetchClient>,
    cache: Arc<dyn SessionCache>,
    lexicon: Arc<dyn Lexicon>,
    config: PipelineConfig,
    /// Serializes computation per cache key so each key is computed once.
    /// Entries live only while a run for the key is in progress.
    key_locks: KeyLocks,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        fetcher: Arc<FetchClient>,
        cache: Arc<dyn SessionCache>,
        lexicon: Arc<dyn Lexicon>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            cache,
            lexicon,
            config,
            key_locks: StdMutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn fetcher(&self) -> &FetchClient {
        &self.fetcher
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce the ranked result set for `adapter`'s source at
    /// `trigger_time`.
    ///
    /// Never fails: when every target fails the result is empty (and not
    /// cached, so a later call retries).
    pub async fn run(&self, adapter: &dyn SourceAdapter, trigger_time: &str) -> Arc<ResultSet> {
        let key = CacheKey::new(adapter.source_type(), trigger_time);
        let span = tracing::info_span!(
            "pipeline_run",
            run_id = %Uuid::new_v4(),
            source = %key.source,
            trigger_time = %key.trigger_time,
        );
        self.run_keyed(adapter, key).instrument(span).await
    }

    async fn run_keyed(&self, adapter: &dyn SourceAdapter, key: CacheKey) -> Arc<ResultSet> {
        enter(RunStage::CacheCheck);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::info!(posts = hit.len(), "cache hit");
            return hit;
        }

        let lease = self.key_lease(&key);
        let _guard = lease.lock.lock().await;
        self.compute_once(adapter, &key).await
    }

    /// Number of cache keys with a run in progress or waiting.
    #[must_use]
    pub fn in_progress_keys(&self) -> usize {
        self.key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Body of a keyed run; the caller holds the key's lock.
    async fn compute_once(&self, adapter: &dyn SourceAdapter, key: &CacheKey) -> Arc<ResultSet> {
        if let Some(hit) = self.cache.get(key).await {
            tracing::info!(posts = hit.len(), "cache populated by concurrent run");
            return hit;
        }

        let outcome = self.execute(adapter).await;
        let result = outcome.result;

        if result.is_empty() {
            tracing::info!("run produced no posts; result not cached");
            return Arc::new(result);
        }
        if outcome.deadline_hit {
            tracing::warn!(posts = result.len(), "partial result after deadline; not cached");
            return Arc::new(result);
        }

        enter(RunStage::Caching);
        match self.cache.put(key, result.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "failed to cache result set");
                Arc::new(result)
            }
        }
    }

    fn key_lease(&self, key: &CacheKey) -> KeyLease<'_> {
        let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(key.clone()).or_default());
        KeyLease {
            locks: &self.key_locks,
            key: key.clone(),
            lock,
        }
    }

    async fn execute(&self, adapter: &dyn SourceAdapter) -> RunOutcome {
        let started = Instant::now();
        let deadline = self.config.run_timeout.map(|t| started + t);
        let max_posts = self.config.max_posts;

        enter(RunStage::Enumerating);
        let targets = adapter.enumerate_targets();
        tracing::info!(targets = targets.len(), "enumerated targets");
        if targets.is_empty() || max_posts == 0 {
            return RunOutcome {
                result: ResultSet::empty(),
                deadline_hit: false,
            };
        }

        let warm_up = adapter.warm_up(&self.fetcher);
        let session = match deadline {
            Some(at) => {
                if let Ok(session) = tokio::time::timeout_at(at, warm_up).await {
                    session
                } else {
                    tracing::warn!(
                        elapsed_ms = started.elapsed().as_millis(),
                        "run deadline reached during warm-up"
                    );
                    return RunOutcome {
                        result: ResultSet::empty(),
                        deadline_hit: true,
                    };
                }
            }
            None => warm_up.await,
        };
        let scorer = Scorer::new(Arc::clone(&self.lexicon), adapter.quality_model());
        let gate = adapter.gate();

        enter(RunStage::Fetching);
        let session_ref = &session;
        let mut batches = stream::iter(targets)
            .map(|target| self.collect_target(adapter, session_ref, target))
            .buffered(self.config.max_concurrent_targets.max(1));

        let mut admitted: Vec<ScoredPost> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut extracted = 0_usize;
        let mut deadline_hit = false;

        loop {
            let next = match deadline {
                Some(at) => {
                    if let Ok(next) = tokio::time::timeout_at(at, batches.next()).await {
                        next
                    } else {
                        deadline_hit = true;
                        tracing::warn!(
                            elapsed_ms = started.elapsed().as_millis(),
                            "run deadline reached; abandoning remaining targets"
                        );
                        break;
                    }
                }
                None => batches.next().await,
            };
            let Some(posts) = next else { break };

            extracted += posts.len();
            admitted.extend(
                posts
                    .into_iter()
                    .filter(|post| gate.admit(post))
                    .filter(|post| seen_urls.insert(post.url.clone()))
                    .map(|post| scorer.score(post)),
            );

            if admitted.len() >= max_posts {
                tracing::debug!(admitted = admitted.len(), "post cap reached; skipping remaining targets");
                break;
            }
        }
        // Dropping the stream cancels targets still in flight.
        drop(batches);

        enter(RunStage::Ranking);
        let admitted_count = admitted.len();
        let result = rank(admitted, max_posts);

        tracing::info!(
            extracted,
            admitted = admitted_count,
            ranked = result.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "run finished"
        );

        RunOutcome {
            result,
            deadline_hit,
        }
    }

    /// Fetch and extract every page of one target. Stops at the first
    /// failed fetch or empty page; posts from earlier pages are kept.
    async fn collect_target(
        &self,
        adapter: &dyn SourceAdapter,
        session: &SessionToken,
        target: Target,
    ) -> Vec<CanonicalPost> {
        let mut posts = Vec::new();
        for page in 1..=adapter.pages_per_target() {
            let payload = match adapter.fetch_raw(&self.fetcher, session, &target, page).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(
                        fetch_target = %target,
                        page,
                        transient = e.is_transient(),
                        error = %e,
                        "fetch failed; skipping rest of target"
                    );
                    break;
                }
            };

            let extracted = adapter.extract(&payload);
            tracing::debug!(
                fetch_target = %target,
                page,
                extracted = extracted.len(),
                "page extracted"
            );
            if extracted.is_empty() {
                break;
            }
            posts.extend(extracted);
        }
        posts
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
