use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub artists: Option<Page<ArtistObject>>,
    pub albums: Option<Page<AlbumObject>>,
    pub tracks: Option<Page<TrackObject>>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    pub followers: Option<Followers>,
}

/// Stripped-down artist object embedded in albums and tracks.
#[derive(Debug, Deserialize)]
pub struct SimplifiedArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumObject {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    #[serde(default = "Vec::new")]
    pub artists: Vec<SimplifiedArtist>,
}

#[derive(Debug, Deserialize)]
pub struct TrackObject {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    #[serde(default = "Vec::new")]
    pub artists: Vec<SimplifiedArtist>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default = "Vec::new")]
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistAlbumsResponse {
    #[serde(default = "Vec::new")]
    pub items: Vec<AlbumObject>,
}

#[derive(Debug, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default = "Vec::new")]
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default = "Vec::new")]
    pub tracks: Vec<TrackObject>,
}
