//! Spotify Web API client.
//!
//! Stateless apart from the HTTP pool: every call takes the caller's access
//! token, so one client serves all users.

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::seeds::Seeds;
use super::types::{
    GenresResponse, NewPlaylist, Paging, SnapshotResponse, SpotifyPlaylist, SpotifyTrack,
    SpotifyUser, TrackSearchResponse, TracksResponse,
};
use crate::atmosphere::RecommendationParams;
use crate::error::ClientError;

const SERVICE: &str = "Spotify";

/// Default page size for track searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Default number of recommended tracks.
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 20;
/// Page size when listing the user's playlists.
pub const PLAYLISTS_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `api_base` with `segments` appended, each percent-encoded so ids
    /// cannot leave their path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let invalid = |message: String| ClientError::InvalidUrl {
            url: self.api_base.clone(),
            message,
        };
        let mut url = Url::parse(&self.api_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T, B>(
        &self,
        token: &str,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        log::debug!("Spotify {} {}", method, url);

        let mut request = self
            .http
            .request(method, url.clone())
            .bearer_auth(token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            log::warn!("Spotify {} returned {}", url.path(), status);
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::decode(SERVICE, e))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.request::<T, ()>(token, Method::GET, path, query, None)
            .await
    }

    /// The authenticated user's profile.
    pub async fn current_user(&self, token: &str) -> Result<SpotifyUser, ClientError> {
        self.get(token, &["me"], &[]).await
    }

    /// Search tracks by free text.
    pub async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SpotifyTrack>, ClientError> {
        let resp: TrackSearchResponse = self
            .get(
                token,
                &["search"],
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(resp.tracks.map(|p| p.items).unwrap_or_default())
    }

    /// Genre names accepted as recommendation seeds.
    pub async fn available_genre_seeds(&self, token: &str) -> Result<Vec<String>, ClientError> {
        let resp: GenresResponse = self
            .get(token, &["recommendations", "available-genre-seeds"], &[])
            .await?;
        Ok(resp.genres)
    }

    /// Playlists owned or followed by the authenticated user.
    pub async fn user_playlists(&self, token: &str) -> Result<Vec<SpotifyPlaylist>, ClientError> {
        let page: Paging<SpotifyPlaylist> = self
            .get(
                token,
                &["me", "playlists"],
                &[("limit", PLAYLISTS_PAGE_LIMIT.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    pub async fn playlist(&self, token: &str, id: &str) -> Result<SpotifyPlaylist, ClientError> {
        self.get(token, &["playlists", id], &[]).await
    }

    /// Create a playlist owned by `user_id`.
    pub async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        playlist: &NewPlaylist<'_>,
    ) -> Result<SpotifyPlaylist, ClientError> {
        self.request(
            token,
            Method::POST,
            &["users", user_id, "playlists"],
            &[],
            Some(playlist),
        )
        .await
    }

    /// Append tracks (by URI) to a playlist.
    pub async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<SnapshotResponse, ClientError> {
        let body = serde_json::json!({ "uris": uris });
        self.request(
            token,
            Method::POST,
            &["playlists", playlist_id, "tracks"],
            &[],
            Some(&body),
        )
        .await
    }

    /// Tracks recommended for `seeds` within the bounds of `params`.
    ///
    /// Seeds are cut to the combined budget before the call; `limit`
    /// defaults to [`DEFAULT_RECOMMENDATION_LIMIT`].
    pub async fn recommendations(
        &self,
        token: &str,
        seeds: &Seeds,
        params: &RecommendationParams,
        limit: Option<u32>,
    ) -> Result<Vec<SpotifyTrack>, ClientError> {
        let seeds = seeds.within_budget();
        let mut query = seeds.to_query_pairs();
        query.push((
            "limit",
            limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT).to_string(),
        ));
        query.extend(params.to_query_pairs());

        let resp: TracksResponse = self.get(token, &["recommendations"], &query).await?;
        Ok(resp.tracks)
    }
}
