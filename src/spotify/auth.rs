//! Access-token refresh against the Spotify accounts service.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::SpotifyConfig;
use crate::error::ClientError;

const SERVICE: &str = "Spotify accounts";

/// Marker set on a [`TokenSet`] whose refresh failed.
pub const REFRESH_TOKEN_ERROR: &str = "RefreshAccessTokenError";

/// A user's OAuth tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as Unix epoch milliseconds.
    pub expires_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenSet {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Exchanges refresh tokens for new access tokens.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl TokenRefresher {
    /// Build a refresher from the configured application credentials.
    pub fn new(http: reqwest::Client, config: &SpotifyConfig) -> Result<Self, ClientError> {
        let client_id = config
            .client_id
            .clone()
            .ok_or(ClientError::MissingCredentials("SPOTIFY_CLIENT_ID"))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or(ClientError::MissingCredentials("SPOTIFY_CLIENT_SECRET"))?;
        Ok(Self {
            http,
            token_url: format!("{}/api/token", config.accounts_base.trim_end_matches('/')),
            client_id,
            client_secret,
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// `Authorization` header value for the client credentials.
    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
        )
    }

    /// Return `token` unchanged while it is valid, otherwise refresh it.
    pub async fn refresh_if_expired(&self, token: &TokenSet) -> TokenSet {
        if !token.is_expired(now_ms()) {
            return token.clone();
        }
        log::info!("Access token expired, refreshing");
        self.refresh(token).await
    }

    /// Refresh unconditionally.
    ///
    /// Never fails: on error the previous tokens come back with
    /// `error` set to [`REFRESH_TOKEN_ERROR`].
    pub async fn refresh(&self, token: &TokenSet) -> TokenSet {
        match self.exchange(&token.refresh_token).await {
            Ok(resp) => {
                log::debug!("Access token refreshed, expires in {}s", resp.expires_in);
                TokenSet {
                    access_token: resp.access_token,
                    refresh_token: resp
                        .refresh_token
                        .unwrap_or_else(|| token.refresh_token.clone()),
                    expires_at_ms: now_ms() + resp.expires_in * 1000,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Error refreshing access token: {}", e);
                TokenSet {
                    error: Some(REFRESH_TOKEN_ERROR.to_string()),
                    ..token.clone()
                }
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<TokenResponse, ClientError> {
        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", self.basic_auth_header())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::decode(SERVICE, e))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Form, Json, Router,
    };

    use super::*;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(accounts_base: &str) -> SpotifyConfig {
        SpotifyConfig {
            client_id: Some("cid".into()),
            client_secret: Some("secret".into()),
            accounts_base: accounts_base.to_string(),
            ..Default::default()
        }
    }

    fn token(expires_at_ms: i64) -> TokenSet {
        TokenSet {
            access_token: "old-access".into(),
            refresh_token: "old-refresh".into(),
            expires_at_ms,
            error: None,
        }
    }

    /// Token endpoint: accepts refresh token "good" (rotating it when asked
    /// via "rotate"), rejects everything else.
    fn fake_accounts() -> Router {
        Router::new().route(
            "/api/token",
            post(
                |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    // base64("cid:secret")
                    if auth != "Basic Y2lkOnNlY3JldA=="
                        || form.get("grant_type").map(String::as_str) != Some("refresh_token")
                    {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    match form.get("refresh_token").map(String::as_str) {
                        Some("old-refresh") => Ok(Json(serde_json::json!({
                            "access_token": "new-access",
                            "token_type": "Bearer",
                            "expires_in": 3600
                        }))),
                        Some("rotate") => Ok(Json(serde_json::json!({
                            "access_token": "new-access",
                            "expires_in": 3600,
                            "refresh_token": "new-refresh"
                        }))),
                        _ => Err(StatusCode::BAD_REQUEST),
                    }
                },
            ),
        )
    }

    #[test]
    fn test_missing_credentials() {
        let err = TokenRefresher::new(reqwest::Client::new(), &SpotifyConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::MissingCredentials("SPOTIFY_CLIENT_ID")));
    }

    #[test]
    fn test_basic_auth_header_and_url() {
        let refresher =
            TokenRefresher::new(reqwest::Client::new(), &config("https://accounts.example/")).unwrap();
        assert_eq!(refresher.basic_auth_header(), "Basic Y2lkOnNlY3JldA==");
        assert_eq!(refresher.token_url(), "https://accounts.example/api/token");
    }

    #[test]
    fn test_token_set_json_shape() {
        let json = serde_json::to_value(token(5)).unwrap();
        assert_eq!(json["accessToken"], "old-access");
        assert_eq!(json["expiresAtMs"], 5);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_valid_token_returned_unchanged() {
        let refresher = TokenRefresher::new(reqwest::Client::new(), &config("http://127.0.0.1:9")).unwrap();
        let fresh = token(now_ms() + 60_000);
        assert_eq!(refresher.refresh_if_expired(&fresh).await, fresh);
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token() {
        let base = spawn(fake_accounts()).await;
        let refresher = TokenRefresher::new(reqwest::Client::new(), &config(&base)).unwrap();

        let before = now_ms();
        let refreshed = refresher.refresh_if_expired(&token(0)).await;
        assert_eq!(refreshed.access_token, "new-access");
        assert_eq!(refreshed.refresh_token, "old-refresh");
        assert!(refreshed.error.is_none());
        assert!(refreshed.expires_at_ms >= before + 3_600_000);
    }

    #[tokio::test]
    async fn test_refresh_rotates_refresh_token() {
        let base = spawn(fake_accounts()).await;
        let refresher = TokenRefresher::new(reqwest::Client::new(), &config(&base)).unwrap();

        let mut expired = token(0);
        expired.refresh_token = "rotate".into();
        let refreshed = refresher.refresh(&expired).await;
        assert_eq!(refreshed.refresh_token, "new-refresh");
    }

    #[tokio::test]
    async fn test_failed_refresh_marks_error() {
        let base = spawn(fake_accounts()).await;
        let refresher = TokenRefresher::new(reqwest::Client::new(), &config(&base)).unwrap();

        let mut expired = token(0);
        expired.refresh_token = "revoked".into();
        let result = refresher.refresh(&expired).await;
        assert_eq!(result.error.as_deref(), Some(REFRESH_TOKEN_ERROR));
        assert_eq!(result.access_token, "old-access");
        assert_eq!(result.refresh_token, "revoked");
    }
}
