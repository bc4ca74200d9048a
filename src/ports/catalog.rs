use crate::ports::EntityKind;

/// Decoupled representation of a catalog entity resolved from a free-text query.
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub id: String,
    pub name: String,
    pub link: String,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
}

/// Decoupled representation of a single related/recommended catalog item.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub link: String,
    pub artist_name: Option<String>,
}

/// Port trait wrapping the catalog/search provider capabilities used by the
/// recommendation engine.
///
/// Implementations live in `spotify::client` (production) or test mocks.
/// Lookup failures (transport errors, malformed responses) degrade to
/// `None`/empty rather than propagating; the worst case downstream is an
/// empty candidate list.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Resolve a free-text name to the best (first) catalog match.
    /// `artist` disambiguates album and track lookups.
    async fn resolve<'a>(
        &self,
        kind: EntityKind,
        name: &str,
        artist: Option<&'a str>,
    ) -> Option<ResolvedEntity>;

    /// Artists related to the given artist, in provider ranking order.
    async fn related_artists(&self, artist_id: &str) -> Vec<CatalogEntry>;

    /// The given artist's albums, most recent first.
    async fn artist_albums(&self, artist_id: &str) -> Vec<CatalogEntry>;

    /// The given artist's top tracks, in provider ranking order.
    async fn artist_top_tracks(&self, artist_id: &str) -> Vec<CatalogEntry>;

    /// Catalog-generated recommendations seeded by a track (and optionally
    /// its artist).
    async fn track_recommendations<'a>(
        &self,
        track_id: &str,
        artist_id: Option<&'a str>,
    ) -> Vec<CatalogEntry>;

    /// Follower count as a popularity proxy; 0 when unavailable.
    async fn artist_followers(&self, name: &str) -> u64;
}
