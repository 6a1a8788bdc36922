//! Batched field population.
//!
//! ```text
//! entities ──claim──► [e1 e2 ... e50] [e51 ... e100] [e101 ... e120]
//!                          │               │                │
//!                        job 1           job 2            job 3      (WorkerPool)
//!                          │               │                │
//!                    one DataSource call per chunk, then every claimed
//!                    future is resolved from that single response
//! ```
//!
//! Claiming creates the missing futures under the entity's lock, so two
//! threads asking for the same field end up with one future and one job.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::fields::Field;
use crate::catalog::Shared;
use crate::config::BATCH_SIZE;
use crate::source::{DataSource, RecordView, Resource, SourceError};

/// An entity whose info fields are filled by one batch lookup.
pub(crate) trait Populate: Send + Sync + 'static {
    /// Entity kind for logs.
    const KIND: &'static str;
    /// Fields covered by one lookup.
    const INFO_FIELDS: &'static [Field];

    /// Futures of the info fields, as handed to a batch job.
    type Claim: Send + 'static;

    fn id(&self) -> &str;

    /// Create the info futures that do not exist yet.
    ///
    /// Returns `None` when every info field already has a future, meaning
    /// another request is (or was) responsible for them.
    fn claim_info(&self) -> Option<Self::Claim>;

    /// Resolve the claimed futures from `record`, or to absent when `None`.
    ///
    /// Futures resolved earlier keep their value.
    fn apply(claim: &Self::Claim, record: Option<RecordView<'_>>, max_videos: usize);

    /// The batch lookup for this entity kind.
    fn fetch(source: &dyn DataSource, ids: &[String]) -> Result<Vec<Resource>, SourceError>;
}

/// Claim and schedule info lookups for `entities`, in order.
///
/// Without a live catalog nothing can be fetched, so claimed fields resolve
/// to absent right away.
pub(crate) fn populate<'a, E, I>(shared: Option<&Arc<Shared>>, entities: I)
where
    E: Populate,
    I: IntoIterator<Item = &'a E>,
{
    let claims: Vec<(String, E::Claim)> = entities
        .into_iter()
        .filter_map(|e| e.claim_info().map(|c| (e.id().to_string(), c)))
        .collect();

    if claims.is_empty() {
        return;
    }

    let Some(shared) = shared else {
        debug!(kind = E::KIND, count = claims.len(), "catalog gone, resolving to absent");
        for (_, claim) in &claims {
            E::apply(claim, None, 0);
        }
        return;
    };

    let max_videos = shared.config.max_videos();
    let mut claims = claims.into_iter().peekable();
    while claims.peek().is_some() {
        let chunk: Vec<_> = claims.by_ref().take(BATCH_SIZE).collect();
        let source = Arc::clone(&shared.source);
        debug!(
            kind = E::KIND,
            batch_size = chunk.len(),
            fields = ?E::INFO_FIELDS,
            "scheduling batch lookup"
        );
        shared.pool.submit(move || run_batch::<E>(source.as_ref(), chunk, max_videos));
    }
}

/// Resolves every claim of a batch to absent unless the batch finished.
struct BatchGuard<E: Populate> {
    claims: Vec<(String, E::Claim)>,
}

impl<E: Populate> Drop for BatchGuard<E> {
    fn drop(&mut self) {
        for (_, claim) in &self.claims {
            E::apply(claim, None, 0);
        }
    }
}

fn run_batch<E: Populate>(
    source: &dyn DataSource,
    claims: Vec<(String, E::Claim)>,
    max_videos: usize,
) {
    let guard = BatchGuard::<E> { claims };
    let ids: Vec<String> = guard.claims.iter().map(|(id, _)| id.clone()).collect();

    let records = match E::fetch(source, &ids) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                kind = E::KIND,
                source = source.name(),
                batch_size = ids.len(),
                error = %e,
                "batch lookup failed"
            );
            Vec::new()
        }
    };

    let by_id: HashMap<&str, &Resource> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    for (id, claim) in &guard.claims {
        let record = by_id.get(id.as_str()).map(|r| RecordView::from(*r));
        E::apply(claim, record, max_videos);
    }

    debug!(
        kind = E::KIND,
        requested = ids.len(),
        found = by_id.len(),
        "batch resolved"
    );
    // Everything is resolved; the guard's pass is a no-op.
    drop(guard);
}
