use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::de::DeserializeOwned;

use crate::ports::EntityKind;
use crate::ports::catalog::{CatalogClient, CatalogEntry, ResolvedEntity};
use crate::spotify::auth::TokenManager;
use crate::spotify::types::{
    AlbumObject, ArtistAlbumsResponse, ArtistObject, RecommendationsResponse,
    RelatedArtistsResponse, SearchResponse, TopTracksResponse, TrackObject,
};

const API_BASE: &str = "https://api.spotify.com/v1";

/// Fetch window per provider call. Wider than the final result size so the
/// ranker has candidates left after filtering and exclusion.
const FETCH_LIMIT: u32 = 10;

/// Spotify-backed catalog client.
///
/// All port methods swallow provider failures: a transport error, a non-2xx
/// status or an unparseable body is logged and reported upward as "no data".
pub struct SpotifyCatalog {
    http: reqwest::Client,
    auth: TokenManager,
}

impl SpotifyCatalog {
    pub fn new(client_id: String, client_secret: String) -> Self {
        let http = reqwest::Client::new();
        let auth = TokenManager::new(client_id, client_secret, http.clone());
        Self { http, auth }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self
            .auth
            .access_token()
            .await
            .wrap_err("Failed to obtain Spotify access token")?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to send Spotify API request to {}", url))?
            .error_for_status()
            .wrap_err_with(|| format!("Spotify API request to {} failed", url))?;

        response
            .json()
            .await
            .wrap_err_with(|| format!("Failed to parse Spotify API response from {}", url))
    }

    async fn search(&self, kind: EntityKind, query: &str) -> Result<SearchResponse> {
        let type_param = match kind {
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Track => "track",
        };
        let url = format!(
            "{}/search?q={}&type={}&limit={}",
            API_BASE,
            urlencoding::encode(query),
            type_param,
            FETCH_LIMIT
        );
        self.get_json(&url).await
    }

    fn search_query(kind: EntityKind, name: &str, artist: Option<&str>) -> String {
        let field = match kind {
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Track => "track",
        };
        match artist {
            Some(artist) => format!("{}:{} artist:{}", field, name, artist),
            None => format!("{}:{}", field, name),
        }
    }

    async fn first_artist_match(&self, name: &str) -> Result<Option<ArtistObject>> {
        let query = Self::search_query(EntityKind::Artist, name, None);
        let results = self.search(EntityKind::Artist, &query).await?;
        Ok(results
            .artists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .next())
    }
}

fn link_or_placeholder(url: Option<String>) -> String {
    url.unwrap_or_else(|| "https://www.example.com".to_string())
}

fn album_entry(album: AlbumObject) -> CatalogEntry {
    let artist_name = album.artists.into_iter().next().map(|artist| artist.name);
    CatalogEntry {
        name: album.name,
        link: link_or_placeholder(album.external_urls.spotify),
        artist_name,
    }
}

fn track_entry(track: TrackObject) -> CatalogEntry {
    let artist_name = track.artists.into_iter().next().map(|artist| artist.name);
    CatalogEntry {
        name: track.name,
        link: link_or_placeholder(track.external_urls.spotify),
        artist_name,
    }
}

#[async_trait::async_trait]
impl CatalogClient for SpotifyCatalog {
    async fn resolve<'a>(
        &self,
        kind: EntityKind,
        name: &str,
        artist: Option<&'a str>,
    ) -> Option<ResolvedEntity> {
        let query = Self::search_query(kind, name, artist);
        let results = match self.search(kind, &query).await {
            Ok(results) => results,
            Err(error) => {
                log::warn!("Spotify search for {:?} failed: {:#}", query, error);
                return None;
            }
        };

        match kind {
            EntityKind::Artist => results
                .artists
                .map(|page| page.items)
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(|artist| ResolvedEntity {
                    id: artist.id.clone(),
                    name: artist.name,
                    link: link_or_placeholder(artist.external_urls.spotify),
                    artist_id: Some(artist.id),
                    artist_name: None,
                }),
            EntityKind::Album => results
                .albums
                .map(|page| page.items)
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(|album| {
                    let owner = album.artists.into_iter().next();
                    ResolvedEntity {
                        id: album.id,
                        name: album.name,
                        link: link_or_placeholder(album.external_urls.spotify),
                        artist_id: owner.as_ref().map(|artist| artist.id.clone()),
                        artist_name: owner.map(|artist| artist.name),
                    }
                }),
            EntityKind::Track => results
                .tracks
                .map(|page| page.items)
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(|track| {
                    let owner = track.artists.into_iter().next();
                    ResolvedEntity {
                        id: track.id,
                        name: track.name,
                        link: link_or_placeholder(track.external_urls.spotify),
                        artist_id: owner.as_ref().map(|artist| artist.id.clone()),
                        artist_name: owner.map(|artist| artist.name),
                    }
                }),
        }
    }

    async fn related_artists(&self, artist_id: &str) -> Vec<CatalogEntry> {
        let url = format!("{}/artists/{}/related-artists", API_BASE, artist_id);
        match self.get_json::<RelatedArtistsResponse>(&url).await {
            Ok(response) => response
                .artists
                .into_iter()
                .take(FETCH_LIMIT as usize)
                .map(|artist| CatalogEntry {
                    name: artist.name,
                    link: link_or_placeholder(artist.external_urls.spotify),
                    artist_name: None,
                })
                .collect(),
            Err(error) => {
                log::warn!("Spotify related-artists lookup failed: {:#}", error);
                Vec::new()
            }
        }
    }

    async fn artist_albums(&self, artist_id: &str) -> Vec<CatalogEntry> {
        let url = format!(
            "{}/artists/{}/albums?include_groups=album&limit={}",
            API_BASE, artist_id, FETCH_LIMIT
        );
        match self.get_json::<ArtistAlbumsResponse>(&url).await {
            Ok(response) => response.items.into_iter().map(album_entry).collect(),
            Err(error) => {
                log::warn!("Spotify artist-albums lookup failed: {:#}", error);
                Vec::new()
            }
        }
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Vec<CatalogEntry> {
        let url = format!("{}/artists/{}/top-tracks?market=US", API_BASE, artist_id);
        match self.get_json::<TopTracksResponse>(&url).await {
            Ok(response) => response.tracks.into_iter().map(track_entry).collect(),
            Err(error) => {
                log::warn!("Spotify top-tracks lookup failed: {:#}", error);
                Vec::new()
            }
        }
    }

    async fn track_recommendations<'a>(
        &self,
        track_id: &str,
        artist_id: Option<&'a str>,
    ) -> Vec<CatalogEntry> {
        let mut url = format!(
            "{}/recommendations?seed_tracks={}&limit={}",
            API_BASE, track_id, FETCH_LIMIT
        );
        if let Some(artist_id) = artist_id {
            url.push_str(&format!("&seed_artists={}", artist_id));
        }
        match self.get_json::<RecommendationsResponse>(&url).await {
            Ok(response) => response.tracks.into_iter().map(track_entry).collect(),
            Err(error) => {
                log::warn!("Spotify recommendations lookup failed: {:#}", error);
                Vec::new()
            }
        }
    }

    async fn artist_followers(&self, name: &str) -> u64 {
        match self.first_artist_match(name).await {
            Ok(Some(artist)) => artist
                .followers
                .map(|followers| followers.total)
                .unwrap_or(0),
            Ok(None) => 0,
            Err(error) => {
                log::warn!("Spotify follower lookup for {:?} failed: {:#}", name, error);
                0
            }
        }
    }
}
