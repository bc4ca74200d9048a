use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use hmac::{Hmac, Mac};
use md5::Md5;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ports::EntityKind;
use crate::ports::similarity::{SimilarArtist, SimilarityClient};

const API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// How many similar artists / top albums to request per call.
const FETCH_LIMIT: u32 = 10;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// Last.fm asks clients to stay under ~5 requests per second
static RATE_LIMITER: std::sync::OnceLock<Arc<DirectRateLimiter>> = std::sync::OnceLock::new();

fn get_rate_limiter() -> &'static Arc<DirectRateLimiter> {
    RATE_LIMITER.get_or_init(|| {
        let quota = Quota::per_second(NonZeroU32::new(5).unwrap());
        Arc::new(RateLimiter::direct(quota))
    })
}

/// Public Last.fm page for an artist, used when the catalog has no link for a
/// similarity-sourced candidate.
pub fn artist_url(name: &str) -> String {
    format!("https://www.last.fm/music/{}", name.replace(' ', "+"))
}

/// Public Last.fm page for an album.
pub fn album_url(artist: &str, album: &str) -> String {
    format!(
        "https://www.last.fm/music/{}/{}",
        artist.replace(' ', "+"),
        album.replace(' ', "+")
    )
}

fn hmac_md5_hex(secret: &str, payload: &str) -> String {
    let mut mac =
        Hmac::<Md5>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac.finalize()
        .into_bytes()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Request signature per the Last.fm convention: sort parameter keys
/// alphabetically, concatenate `key` + `value` pairs, sign with the shared
/// secret. `format` is excluded from the signed set.
fn sign_params(params: &[(&str, String)], shared_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    let payload: String = sorted
        .iter()
        .map(|(key, value)| format!("{key}{value}"))
        .collect();
    hmac_md5_hex(shared_secret, &payload)
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsEnvelope {
    similarartists: Option<SimilarArtistList>,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistList {
    #[serde(default)]
    artist: Vec<SimilarArtistEntry>,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistEntry {
    name: String,
    listeners: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopAlbumsEnvelope {
    topalbums: Option<TopAlbumList>,
}

#[derive(Debug, Deserialize)]
struct TopAlbumList {
    #[serde(default)]
    album: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ArtistInfoEnvelope {
    artist: Option<ArtistInfo>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    stats: Option<ArtistStats>,
}

#[derive(Debug, Deserialize)]
struct ArtistStats {
    listeners: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfoEnvelope {
    album: Option<ListenerStats>,
}

#[derive(Debug, Deserialize)]
struct TrackInfoEnvelope {
    track: Option<ListenerStats>,
}

#[derive(Debug, Deserialize)]
struct ListenerStats {
    listeners: Option<String>,
}

/// Last.fm-backed similarity client.
///
/// Every call is keyed with the API key and signed with the shared secret. A
/// missing response section means the provider has no data for the entity and
/// is reported as empty/unknown, same as a transport failure.
pub struct LastfmClient {
    api_key: String,
    shared_secret: String,
    http: reqwest::Client,
}

impl LastfmClient {
    pub fn new(api_key: String, shared_secret: String) -> Self {
        Self {
            api_key,
            shared_secret,
            http: reqwest::Client::new(),
        }
    }

    async fn request<T: DeserializeOwned>(&self, mut params: Vec<(&str, String)>) -> Result<T> {
        log::debug!("Waiting for Last.fm rate limiter");
        get_rate_limiter().until_ready().await;

        params.push(("api_key", self.api_key.clone()));
        let api_sig = sign_params(&params, &self.shared_secret);
        params.push(("api_sig", api_sig));
        params.push(("format", "json".to_string()));

        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        let url = format!("{}?{}", API_BASE, query.join("&"));

        let response: T = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .wrap_err("Failed to send Last.fm API request")?
            .error_for_status()
            .wrap_err("Last.fm API request failed")?
            .json()
            .await
            .wrap_err("Failed to parse Last.fm API response")?;

        Ok(response)
    }

    fn parse_count(listeners: Option<String>) -> Option<u64> {
        listeners.and_then(|value| value.parse().ok())
    }
}

#[async_trait::async_trait]
impl SimilarityClient for LastfmClient {
    async fn similar_artists(&self, artist: &str) -> Vec<SimilarArtist> {
        let params = vec![
            ("method", "artist.getsimilar".to_string()),
            ("artist", artist.to_string()),
            ("limit", FETCH_LIMIT.to_string()),
        ];
        match self.request::<SimilarArtistsEnvelope>(params).await {
            Ok(envelope) => envelope
                .similarartists
                .map(|list| list.artist)
                .unwrap_or_default()
                .into_iter()
                .map(|entry| SimilarArtist {
                    name: entry.name,
                    listeners: Self::parse_count(entry.listeners),
                })
                .collect(),
            Err(error) => {
                log::warn!("Last.fm getsimilar for {:?} failed: {:#}", artist, error);
                Vec::new()
            }
        }
    }

    async fn top_albums(&self, artist: &str) -> Vec<String> {
        let params = vec![
            ("method", "artist.gettopalbums".to_string()),
            ("artist", artist.to_string()),
            ("limit", FETCH_LIMIT.to_string()),
        ];
        match self.request::<TopAlbumsEnvelope>(params).await {
            Ok(envelope) => envelope
                .topalbums
                .map(|list| list.album)
                .unwrap_or_default()
                .into_iter()
                .map(|album| album.name)
                .collect(),
            Err(error) => {
                log::warn!("Last.fm gettopalbums for {:?} failed: {:#}", artist, error);
                Vec::new()
            }
        }
    }

    async fn listeners<'a>(
        &self,
        kind: EntityKind,
        name: &str,
        artist: Option<&'a str>,
    ) -> Option<u64> {
        let result = match kind {
            EntityKind::Artist => {
                let params = vec![
                    ("method", "artist.getinfo".to_string()),
                    ("artist", name.to_string()),
                ];
                self.request::<ArtistInfoEnvelope>(params)
                    .await
                    .map(|envelope| {
                        envelope
                            .artist
                            .and_then(|artist| artist.stats)
                            .and_then(|stats| Self::parse_count(stats.listeners))
                    })
            }
            EntityKind::Album => {
                let mut params = vec![
                    ("method", "album.getinfo".to_string()),
                    ("album", name.to_string()),
                ];
                if let Some(artist) = artist {
                    params.push(("artist", artist.to_string()));
                }
                self.request::<AlbumInfoEnvelope>(params).await.map(|e| {
                    e.album
                        .and_then(|album| Self::parse_count(album.listeners))
                })
            }
            EntityKind::Track => {
                let mut params = vec![
                    ("method", "track.getinfo".to_string()),
                    ("track", name.to_string()),
                ];
                if let Some(artist) = artist {
                    params.push(("artist", artist.to_string()));
                }
                self.request::<TrackInfoEnvelope>(params).await.map(|e| {
                    e.track
                        .and_then(|track| Self::parse_count(track.listeners))
                })
            }
        };

        match result {
            Ok(listeners) => listeners,
            Err(error) => {
                log::warn!("Last.fm listener lookup for {:?} failed: {:#}", name, error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_md5_rfc2202_vector() {
        // RFC 2202 test case 2
        let digest = hmac_md5_hex("Jefe", "what do ya want for nothing?");
        assert_eq!(digest, "750c783e6ab0b503eaa86e310a5db738");
    }

    #[test]
    fn test_sign_params_sorts_keys() {
        let forward = vec![
            ("artist", "Moderat".to_string()),
            ("method", "artist.getsimilar".to_string()),
        ];
        let backward = vec![
            ("method", "artist.getsimilar".to_string()),
            ("artist", "Moderat".to_string()),
        ];
        assert_eq!(
            sign_params(&forward, "secret"),
            sign_params(&backward, "secret")
        );
    }

    #[test]
    fn test_sign_params_is_hex_digest() {
        let params = vec![("method", "artist.getinfo".to_string())];
        let signature = sign_params(&params, "secret");
        assert_eq!(signature.len(), 32);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_params_depends_on_secret() {
        let params = vec![("method", "artist.getinfo".to_string())];
        assert_ne!(sign_params(&params, "one"), sign_params(&params, "two"));
    }

    #[test]
    fn test_artist_url_replaces_spaces() {
        assert_eq!(artist_url("Daft Punk"), "https://www.last.fm/music/Daft+Punk");
    }

    #[test]
    fn test_album_url() {
        assert_eq!(
            album_url("Daft Punk", "Random Access Memories"),
            "https://www.last.fm/music/Daft+Punk/Random+Access+Memories"
        );
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert_eq!(LastfmClient::parse_count(Some("12345".to_string())), Some(12345));
        assert_eq!(LastfmClient::parse_count(Some("n/a".to_string())), None);
        assert_eq!(LastfmClient::parse_count(None), None);
    }
}
