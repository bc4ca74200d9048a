use std::sync::Arc;

use crate::lastfm;
use crate::ports::EntityKind;
use crate::ports::catalog::CatalogClient;
use crate::ports::similarity::SimilarityClient;
use crate::services::recommend::{CANDIDATE_POOL, Candidate, Category, Entity, QueryContext};

/// Collects the raw, capacity-bounded candidate pool for one category.
///
/// Dedup is by case-insensitive entity name; the query entity itself and the
/// request's excluded artist never enter the pool. An unresolvable query
/// yields an empty pool with no further provider calls.
pub struct Aggregator<C, S> {
    catalog: Arc<C>,
    similarity: Arc<S>,
}

fn matches_any(name: &str, excluded: &[String]) -> bool {
    let lowered = name.to_lowercase();
    excluded.iter().any(|entry| *entry == lowered)
}

fn contains_name(pool: &[Candidate], name: &str) -> bool {
    pool.iter()
        .any(|candidate| candidate.entity.name.to_lowercase() == name.to_lowercase())
}

impl<C: CatalogClient, S: SimilarityClient> Aggregator<C, S> {
    pub fn new(catalog: Arc<C>, similarity: Arc<S>) -> Self {
        Self {
            catalog,
            similarity,
        }
    }

    pub async fn collect(&self, ctx: &QueryContext) -> Vec<Candidate> {
        match ctx.category {
            Category::Artists => self.collect_artists(ctx).await,
            Category::Albums => self.collect_albums(ctx).await,
            Category::Songs => self.collect_songs(ctx).await,
        }
    }

    /// Related artists from the catalog, topped up from the similarity graph
    /// when the catalog comes up short.
    async fn collect_artists(&self, ctx: &QueryContext) -> Vec<Candidate> {
        let Some(artist) = self
            .catalog
            .resolve(EntityKind::Artist, &ctx.query, None)
            .await
        else {
            return Vec::new();
        };

        let mut excluded = vec![artist.name.to_lowercase(), ctx.query.to_lowercase()];
        if let Some(exclude) = &ctx.exclude_artist {
            excluded.push(exclude.to_lowercase());
        }

        let mut pool = Vec::new();
        for entry in self.catalog.related_artists(&artist.id).await {
            if pool.len() >= CANDIDATE_POOL {
                break;
            }
            if matches_any(&entry.name, &excluded) || contains_name(&pool, &entry.name) {
                continue;
            }
            pool.push(Candidate {
                entity: Entity {
                    name: entry.name,
                    link: entry.link,
                    artist: None,
                },
                popularity: None,
            });
        }

        if pool.len() < CANDIDATE_POOL {
            for similar in self.similarity.similar_artists(&artist.name).await {
                if pool.len() >= CANDIDATE_POOL {
                    break;
                }
                if matches_any(&similar.name, &excluded) || contains_name(&pool, &similar.name) {
                    continue;
                }
                let link = lastfm::artist_url(&similar.name);
                pool.push(Candidate {
                    entity: Entity {
                        name: similar.name,
                        link,
                        artist: None,
                    },
                    popularity: similar.listeners,
                });
            }
        }

        pool
    }

    /// Albums by artists similar to the album's owner, at most one album per
    /// similar artist.
    async fn collect_albums(&self, ctx: &QueryContext) -> Vec<Candidate> {
        let Some(query_artist) = ctx.artist.as_deref() else {
            return Vec::new();
        };
        let Some(album) = self
            .catalog
            .resolve(EntityKind::Album, &ctx.query, Some(query_artist))
            .await
        else {
            return Vec::new();
        };

        let owner = album
            .artist_name
            .clone()
            .unwrap_or_else(|| query_artist.to_string());

        let mut excluded_artists = vec![owner.to_lowercase(), query_artist.to_lowercase()];
        if let Some(exclude) = &ctx.exclude_artist {
            excluded_artists.push(exclude.to_lowercase());
        }

        let mut pool = Vec::new();
        for similar in self.similarity.similar_artists(&owner).await {
            if pool.len() >= CANDIDATE_POOL {
                break;
            }
            if matches_any(&similar.name, &excluded_artists) {
                continue;
            }
            let Some(top_album) = self
                .similarity
                .top_albums(&similar.name)
                .await
                .into_iter()
                .next()
            else {
                continue;
            };
            if contains_name(&pool, &top_album) {
                continue;
            }
            let link = match self
                .catalog
                .resolve(EntityKind::Album, &top_album, Some(&similar.name))
                .await
            {
                Some(resolved) => resolved.link,
                None => lastfm::album_url(&similar.name, &top_album),
            };
            pool.push(Candidate {
                entity: Entity {
                    name: top_album,
                    link,
                    artist: Some(similar.name),
                },
                popularity: None,
            });
        }

        pool
    }

    /// Catalog recommendations seeded by the resolved track and its artist.
    async fn collect_songs(&self, ctx: &QueryContext) -> Vec<Candidate> {
        let Some(query_artist) = ctx.artist.as_deref() else {
            return Vec::new();
        };
        let Some(track) = self
            .catalog
            .resolve(EntityKind::Track, &ctx.query, Some(query_artist))
            .await
        else {
            return Vec::new();
        };

        let track_artist = track
            .artist_name
            .clone()
            .unwrap_or_else(|| query_artist.to_string());
        let mut excluded_artists = Vec::new();
        if let Some(exclude) = &ctx.exclude_artist {
            excluded_artists.push(exclude.to_lowercase());
        }

        let recommendations = self
            .catalog
            .track_recommendations(&track.id, track.artist_id.as_deref())
            .await;

        let mut pool = Vec::new();
        for entry in recommendations {
            if pool.len() >= CANDIDATE_POOL {
                break;
            }
            // drop the seed track itself
            let is_seed = entry.name.to_lowercase() == track.name.to_lowercase()
                && entry
                    .artist_name
                    .as_deref()
                    .is_some_and(|artist| artist.to_lowercase() == track_artist.to_lowercase());
            if is_seed {
                continue;
            }
            if let Some(artist) = entry.artist_name.as_deref() {
                if matches_any(artist, &excluded_artists) {
                    continue;
                }
            }
            if contains_name(&pool, &entry.name) {
                continue;
            }
            pool.push(Candidate {
                entity: Entity {
                    name: entry.name,
                    link: entry.link,
                    artist: entry.artist_name,
                },
                popularity: None,
            });
        }

        pool
    }

    /// The artist's most recent album name, used to seed the manage session's
    /// album category.
    pub async fn seed_album(&self, artist_name: &str) -> Option<String> {
        let artist = self
            .catalog
            .resolve(EntityKind::Artist, artist_name, None)
            .await?;
        self.catalog
            .artist_albums(&artist.id)
            .await
            .into_iter()
            .next()
            .map(|album| album.name)
    }

    /// The artist's top track name, used to seed the manage session's song
    /// category.
    pub async fn seed_track(&self, artist_name: &str) -> Option<String> {
        let artist = self
            .catalog
            .resolve(EntityKind::Artist, artist_name, None)
            .await?;
        self.catalog
            .artist_top_tracks(&artist.id)
            .await
            .into_iter()
            .next()
            .map(|track| track.name)
    }
}
