use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tokio::sync::Mutex;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this far ahead of expiry so a token never lapses mid-request.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Spotify rejected the credential exchange: {reason}")]
    Rejected { reason: String },
    #[error("Failed to send token request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse token response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Client-credentials token manager.
/// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
///
/// Tokens are cached until shortly before expiry; the catalog client asks for
/// the current token before every request.
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(client_id: String, client_secret: String, http: reqwest::Client) -> Self {
        Self {
            client_id,
            client_secret,
            http,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached access token, exchanging credentials for a fresh one
    /// when none is held or the held one is about to expire.
    pub async fn access_token(&self) -> Result<String, TokenError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.exchange_credentials().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn exchange_credentials(&self) -> Result<CachedToken, TokenError> {
        let params = [("grant_type", "client_credentials")];

        let response = self
            .http
            .post(SPOTIFY_TOKEN_URL)
            // Serializes to x-www-form-urlencoded and sets the header (as required by spotify)
            .form(&params)
            .header(
                "Authorization",
                format!(
                    "Basic {}",
                    STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
                ),
            )
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(TokenError::FailedToSendRequest)?;

        if !response.status().is_success() {
            return Err(TokenError::Rejected {
                reason: response
                    .text()
                    .await
                    .unwrap_or("Failed to get error text".to_string()),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(TokenError::FailedToParseResponse)?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}
