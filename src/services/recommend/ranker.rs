use std::sync::Arc;

use futures::StreamExt;

use crate::ports::EntityKind;
use crate::ports::catalog::CatalogClient;
use crate::ports::similarity::SimilarityClient;
use crate::services::recommend::{Candidate, Category, RESULT_SIZE};

/// Popularity lookups fan out per candidate; candidates are independent reads
/// so a few can be in flight at once without changing the final order.
const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// The discoverability policy: candidates are scored by listener count and
/// stably sorted ascending so smaller acts surface first. Unknown popularity
/// sorts last; ties keep their input order.
pub struct Ranker<C, S> {
    catalog: Arc<C>,
    similarity: Arc<S>,
}

impl<C: CatalogClient, S: SimilarityClient> Ranker<C, S> {
    pub fn new(catalog: Arc<C>, similarity: Arc<S>) -> Self {
        Self {
            catalog,
            similarity,
        }
    }

    /// Score one candidate. The similarity graph is the primary source; for
    /// artists the catalog's follower count stands in when the graph has no
    /// listener data. A zero follower count still means unknown.
    async fn score(&self, kind: EntityKind, candidate: &Candidate) -> Option<u64> {
        if let Some(known) = candidate.popularity {
            return Some(known);
        }
        let listeners = self
            .similarity
            .listeners(
                kind,
                &candidate.entity.name,
                candidate.entity.artist.as_deref(),
            )
            .await;
        if listeners.is_some() {
            return listeners;
        }
        if kind == EntityKind::Artist {
            let followers = self.catalog.artist_followers(&candidate.entity.name).await;
            if followers > 0 {
                return Some(followers);
            }
        }
        None
    }

    /// Score, sort ascending and truncate to the result size. Candidates
    /// that already carry a popularity hint are not re-fetched. Idempotent
    /// on a fully scored, already ranked list.
    pub async fn rank(&self, category: Category, pool: Vec<Candidate>) -> Vec<Candidate> {
        let kind = category.entity_kind();

        // buffered() keeps input order, which the stable sort below relies on
        let mut scored: Vec<Candidate> =
            futures::stream::iter(pool.into_iter().map(|candidate| async move {
                let popularity = self.score(kind, &candidate).await;
                Candidate {
                    entity: candidate.entity,
                    popularity,
                }
            }))
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        scored.sort_by_key(|candidate| match candidate.popularity {
            Some(listeners) => (0u8, listeners),
            None => (1, 0),
        });
        scored.truncate(RESULT_SIZE);
        scored
    }
}
