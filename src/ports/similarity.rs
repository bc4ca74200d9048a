use crate::ports::EntityKind;

/// A similar artist as reported by the similarity graph, with an optional
/// listener-count hint when the provider includes one inline.
#[derive(Debug, Clone)]
pub struct SimilarArtist {
    pub name: String,
    pub listeners: Option<u64>,
}

/// Port trait wrapping the similarity-graph provider.
///
/// Implementations live in `lastfm` (production) or test mocks. Every call is
/// a single round trip with no retry; provider errors and missing response
/// sections yield empty/unknown results, never a hard failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityClient: Send + Sync {
    /// Artists similar to the named one, ranked by provider similarity.
    async fn similar_artists(&self, artist: &str) -> Vec<SimilarArtist>;

    /// The named artist's top album names, most played first.
    async fn top_albums(&self, artist: &str) -> Vec<String>;

    /// Listener count for an artist, album or track. `None` means unknown
    /// and sorts after every known value.
    async fn listeners<'a>(
        &self,
        kind: EntityKind,
        name: &str,
        artist: Option<&'a str>,
    ) -> Option<u64>;
}
