pub mod aggregator;
pub mod manager;
pub mod ranker;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ports::EntityKind;
use crate::ports::catalog::CatalogClient;
use crate::ports::similarity::SimilarityClient;
use crate::services::recommend::aggregator::Aggregator;
use crate::services::recommend::manager::{ManageError, RecommendationSet};
use crate::services::recommend::ranker::Ranker;

/// Every candidate list is cut to this size after ranking.
pub const RESULT_SIZE: usize = 3;

/// Raw candidates gathered before ranking. Wider than the result size so the
/// discoverability sort has something to choose from.
pub const CANDIDATE_POOL: usize = 10;

/// Link attached to manually added recommendations.
pub const PLACEHOLDER_LINK: &str = "https://www.example.com";

/// Recommendation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Artists,
    Albums,
    Songs,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Artists, Category::Albums, Category::Songs];

    /// Parse the singular input-type form used by recommendation requests.
    pub fn parse_input_type(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "artist" => Some(Category::Artists),
            "album" => Some(Category::Albums),
            "song" => Some(Category::Songs),
            _ => None,
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Category::Artists => "artist",
            Category::Albums => "album",
            Category::Songs => "song",
        }
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            Category::Artists => EntityKind::Artist,
            Category::Albums => EntityKind::Album,
            Category::Songs => EntityKind::Track,
        }
    }

    /// The caller-facing string for an empty result. An unresolvable query is
    /// a valid empty outcome, not an error.
    pub fn empty_sentinel(self) -> String {
        format!("no similar {} found", self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Artists => "artists",
            Category::Albums => "albums",
            Category::Songs => "songs",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Category {
    type Err = ManageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artists" => Ok(Category::Artists),
            "albums" => Ok(Category::Albums),
            "songs" => Ok(Category::Songs),
            other => Err(ManageError::InvalidCategory(other.to_string())),
        }
    }
}

/// A recommendable artist, album or song. Immutable once created; albums and
/// songs carry the owning artist's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub link: String,
    pub artist: Option<String>,
}

/// An entity plus its lazily fetched popularity proxy. `None` means unscored
/// and sorts after every scored candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entity: Entity,
    pub popularity: Option<u64>,
}

/// Pre-confirmed query parameters for one recommendation request. Constructed
/// fresh per request by the interface layer, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    pub category: Category,
    pub query: String,
    pub artist: Option<String>,
    pub exclude_artist: Option<String>,
}

/// The recommendation engine: aggregation plus popularity-biased ranking.
///
/// Both provider clients are immutable after construction and injected so
/// tests can substitute mocks.
pub struct RecommendService<C, S> {
    aggregator: Aggregator<C, S>,
    ranker: Ranker<C, S>,
}

impl<C: CatalogClient, S: SimilarityClient> RecommendService<C, S> {
    pub fn new(catalog: Arc<C>, similarity: Arc<S>) -> Self {
        Self {
            aggregator: Aggregator::new(Arc::clone(&catalog), Arc::clone(&similarity)),
            ranker: Ranker::new(catalog, similarity),
        }
    }

    /// Produce the ranked candidate list for one category. An empty result
    /// means the query entity could not be resolved or no candidates
    /// survived filtering.
    pub async fn recommend(&self, ctx: &QueryContext) -> Vec<Candidate> {
        let pool = self.aggregator.collect(ctx).await;
        log::debug!(
            "Gathered {} raw {} candidates for {:?}",
            pool.len(),
            ctx.category,
            ctx.query
        );
        self.ranker.rank(ctx.category, pool).await
    }

    /// Build the full three-category set for one artist, used by the manage
    /// session: related artists, albums adjacent to the artist's latest
    /// album, and songs adjacent to their top track.
    pub async fn full_set(&self, artist_name: &str) -> RecommendationSet {
        let artists = self
            .recommend(&QueryContext {
                category: Category::Artists,
                query: artist_name.to_string(),
                artist: None,
                exclude_artist: None,
            })
            .await;

        let albums = match self.aggregator.seed_album(artist_name).await {
            Some(album_name) => {
                self.recommend(&QueryContext {
                    category: Category::Albums,
                    query: album_name,
                    artist: Some(artist_name.to_string()),
                    exclude_artist: None,
                })
                .await
            }
            None => Vec::new(),
        };

        let songs = match self.aggregator.seed_track(artist_name).await {
            Some(track_name) => {
                self.recommend(&QueryContext {
                    category: Category::Songs,
                    query: track_name,
                    artist: Some(artist_name.to_string()),
                    exclude_artist: None,
                })
                .await
            }
            None => Vec::new(),
        };

        RecommendationSet::from_parts(artists, albums, songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::catalog::{MockCatalogClient, ResolvedEntity};
    use crate::ports::similarity::{MockSimilarityClient, SimilarArtist};

    fn resolved_artist(id: &str, name: &str) -> ResolvedEntity {
        ResolvedEntity {
            id: id.to_string(),
            name: name.to_string(),
            link: format!("https://open.spotify.com/artist/{}", id),
            artist_id: Some(id.to_string()),
            artist_name: None,
        }
    }

    #[tokio::test]
    async fn test_artist_discovery_prefers_smaller_acts() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_resolve()
            .returning(|_, _, _| Some(resolved_artist("dp1", "Daft Punk")));
        catalog.expect_related_artists().returning(|_| Vec::new());

        let mut similarity = MockSimilarityClient::new();
        similarity.expect_similar_artists().returning(|_| {
            ["Justice", "Moderat", "SebastiAn", "Breakbot"]
                .iter()
                .map(|name| SimilarArtist {
                    name: name.to_string(),
                    listeners: None,
                })
                .collect()
        });
        similarity
            .expect_listeners()
            .returning(|_, name, _| match name {
                "Justice" => Some(500_000),
                "Moderat" => Some(150_000),
                "SebastiAn" => Some(80_000),
                "Breakbot" => Some(40_000),
                _ => None,
            });

        let service = RecommendService::new(Arc::new(catalog), Arc::new(similarity));
        let ctx = QueryContext {
            category: Category::Artists,
            query: "Daft Punk".to_string(),
            artist: None,
            exclude_artist: None,
        };

        let ranked = service.recommend(&ctx).await;
        let names: Vec<&str> = ranked
            .iter()
            .map(|candidate| candidate.entity.name.as_str())
            .collect();
        assert_eq!(names, vec!["Breakbot", "SebastiAn", "Moderat"]);
    }

    #[tokio::test]
    async fn test_unresolvable_album_skips_further_provider_calls() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_resolve().returning(|_, _, _| None);

        let mut similarity = MockSimilarityClient::new();
        similarity.expect_similar_artists().never();
        similarity.expect_top_albums().never();
        similarity.expect_listeners().never();

        let service = RecommendService::new(Arc::new(catalog), Arc::new(similarity));
        let ctx = QueryContext {
            category: Category::Albums,
            query: "Discovery".to_string(),
            artist: Some("Daft Punk".to_string()),
            exclude_artist: None,
        };

        assert!(service.recommend(&ctx).await.is_empty());
        assert_eq!(Category::Albums.empty_sentinel(), "no similar albums found");
    }

    #[test]
    fn test_parse_input_type() {
        assert_eq!(Category::parse_input_type("artist"), Some(Category::Artists));
        assert_eq!(Category::parse_input_type(" Album "), Some(Category::Albums));
        assert_eq!(Category::parse_input_type("song"), Some(Category::Songs));
        assert_eq!(Category::parse_input_type("playlist"), None);
    }

    #[test]
    fn test_category_from_str_rejects_unknown() {
        assert!("artists".parse::<Category>().is_ok());
        assert!(matches!(
            "podcasts".parse::<Category>(),
            Err(ManageError::InvalidCategory(name)) if name == "podcasts"
        ));
    }
}
