//! Resolves member concepts the dictionary has no term for.
//!
//! Cache hits are applied first. Everything else goes to the remote lookup
//! in rounds of [`BATCH_SIZE`] concurrent requests, with a randomized pause
//! between rounds so the browser is not hammered. The cache file is
//! rewritten after each successful round, so an interrupted run resumes
//! where it stopped.
//!
//! ```text
//! Idle ──▶ BatchInFlight ──▶ Cooldown ──▶ BatchInFlight ... ──▶ Done
//!                │
//!                └── any lookup fails ──▶ Failed
//! ```

use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use pcd_types::{DefinitionTable, SctId, SimpleDefinition};
use rand::Rng;
use tracing::{debug, info};

use crate::cache::UnknownCodeCache;
use crate::error::{PipelineError, PipelineResult};
use crate::lookup::ConceptLookup;

/// Lookups issued concurrently per round.
pub const BATCH_SIZE: usize = 40;

/// Bounds of the pause between rounds, in milliseconds.
pub const DELAY_MS: Range<u64> = 2000..7000;

/// Chooses and observes the pause between rounds.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Picks the next pause.
    fn next_delay(&self) -> Duration;

    /// Waits for `delay`.
    async fn pause(&self, delay: Duration);
}

/// Sleeps for a uniformly random time in [`DELAY_MS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPacer;

#[async_trait]
impl Pacer for RandomPacer {
    fn next_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(DELAY_MS))
    }

    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Where the resolver is in its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    /// Nothing started.
    Idle,
    /// Waiting on the lookups of one round.
    BatchInFlight {
        /// 1-based round number.
        round: usize,
        /// Lookups in this round.
        size: usize,
    },
    /// Pausing after a completed round.
    Cooldown {
        /// Round just completed.
        round: usize,
        /// Pause being observed.
        delay: Duration,
    },
    /// Every candidate resolved.
    Done,
    /// A lookup failed; nothing after the last saved round was kept.
    Failed,
}

/// What a resolver run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveReport {
    /// Candidates answered from the cache.
    pub from_cache: usize,
    /// Candidates answered remotely.
    pub from_remote: usize,
    /// Size of each remote round, in order.
    pub rounds: Vec<usize>,
}

/// Drives unknown concepts through cache and remote lookup.
pub struct UnknownConceptResolver<'a, L, P> {
    lookup: &'a L,
    pacer: &'a P,
    batch_size: usize,
    state: ResolverState,
}

impl<'a, L: ConceptLookup, P: Pacer> UnknownConceptResolver<'a, L, P> {
    /// Creates an idle resolver.
    pub fn new(lookup: &'a L, pacer: &'a P) -> Self {
        Self {
            lookup,
            pacer,
            batch_size: BATCH_SIZE,
            state: ResolverState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Resolves every distinct id in `unresolved`, adding the results to
    /// `definitions` and to `cache`. Ids are looked up in ascending order.
    ///
    /// Fails fast: the first failed lookup aborts the run with
    /// [`PipelineError::ExternalLookup`]. Rounds completed before the failure
    /// stay in the cache file.
    pub async fn resolve(
        &mut self,
        unresolved: &[SctId],
        definitions: &mut DefinitionTable,
        cache: &mut UnknownCodeCache,
    ) -> PipelineResult<ResolveReport> {
        let mut report = ResolveReport::default();
        let mut pending = VecDeque::new();

        let distinct: BTreeSet<SctId> = unresolved.iter().copied().collect();
        for concept_id in distinct {
            match cache.get(concept_id) {
                Some(definition) => {
                    definitions.insert(concept_id, definition.clone());
                    report.from_cache += 1;
                }
                None => pending.push_back(concept_id),
            }
        }
        debug!(
            cached = report.from_cache,
            remote = pending.len(),
            "Unknown concepts split"
        );

        let mut round = 0;
        while !pending.is_empty() {
            let take = pending.len().min(self.batch_size);
            let batch: Vec<SctId> = pending.drain(..take).collect();
            round += 1;
            self.state = ResolverState::BatchInFlight {
                round,
                size: batch.len(),
            };

            let resolved = match self.fetch_round(&batch).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.state = ResolverState::Failed;
                    return Err(e);
                }
            };

            for (concept_id, definition) in resolved {
                definitions.insert(concept_id, definition.clone());
                cache.insert(concept_id, definition);
            }
            if let Err(e) = cache.save() {
                self.state = ResolverState::Failed;
                return Err(e);
            }
            report.from_remote += batch.len();
            report.rounds.push(batch.len());
            info!(round, resolved = batch.len(), remaining = pending.len(), "Resolved batch");

            if !pending.is_empty() {
                let delay = self.pacer.next_delay();
                self.state = ResolverState::Cooldown { round, delay };
                self.pacer.pause(delay).await;
            }
        }

        self.state = ResolverState::Done;
        Ok(report)
    }

    async fn fetch_round(&self, batch: &[SctId]) -> PipelineResult<Vec<(SctId, SimpleDefinition)>> {
        try_join_all(batch.iter().map(|&concept_id| async move {
            self.lookup
                .lookup(concept_id)
                .await
                .map(|concept| (concept_id, concept.into_definition()))
                .map_err(|source| PipelineError::ExternalLookup { concept_id, source })
        }))
        .await
    }
}
