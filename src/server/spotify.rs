//! `/api/spotify` handlers.
//!
//! Both verbs require `Authorization: Bearer <spotify access token>` and
//! dispatch on an `action`:
//!
//! | Verb | Action            | Inputs                                   | Response key |
//! |------|-------------------|------------------------------------------|--------------|
//! | GET  | `profile`         |                                          | `profile`    |
//! | GET  | `search`          | `query`, `limit` (20)                    | `tracks`     |
//! | GET  | `genres`          |                                          | `genres`     |
//! | GET  | `playlists`       |                                          | `playlists`  |
//! | GET  | `playlist`        | `id`                                     | `playlist`   |
//! | POST | `create-playlist` | `name`, `description`, `isPublic` (true) | `playlist`   |
//! | POST | `add-tracks`      | `playlistId`, `trackUris`                | `result`     |
//! | POST | `recommendations` | `seed*`, `atmosphereSettings`            | `tracks`     |

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::routes::{api_error, ApiError};
use super::state::AppState;
use crate::atmosphere::{map_atmosphere_to_params, AtmosphereSettings};
use crate::error::ClientError;
use crate::spotify::client::DEFAULT_SEARCH_LIMIT;
use crate::spotify::{NewPlaylist, Seeds};

/// Track count requested by the `recommendations` action.
const RECOMMENDATION_TRACKS: u32 = 30;

const INVALID_GET_ACTION: &str =
    r#"Invalid action. Use "profile", "search", "genres", "playlists", or "playlist"."#;
const INVALID_POST_ACTION: &str =
    r#"Invalid action. Use "create-playlist", "add-tracks", or "recommendations"."#;

/// Pull the bearer token out of the request headers.
fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Authentication required"))
}

fn upstream_error(e: ClientError, message: &'static str) -> ApiError {
    tracing::error!("Spotify API error: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// GET
// ---------------------------------------------------------------------------

/// Query of `GET /api/spotify`.
#[derive(Debug, Default, Deserialize)]
pub struct SpotifyQuery {
    pub action: Option<String>,
    pub query: Option<String>,
    /// Parsed leniently; anything non-numeric means the default.
    pub limit: Option<String>,
    pub id: Option<String>,
}

/// GET /api/spotify - read-only Spotify actions.
pub async fn spotify_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SpotifyQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let spotify = &state.spotify;
    let failed = |e| upstream_error(e, "Failed to fetch data from Spotify");

    let body = match params.action.as_deref() {
        Some("profile") => {
            let profile = spotify.current_user(&token).await.map_err(failed)?;
            serde_json::json!({ "profile": profile })
        }
        Some("search") => {
            let query = non_empty(params.query).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "Query parameter is required for search",
                )
            })?;
            let limit = params
                .limit
                .and_then(|l| l.trim().parse().ok())
                .unwrap_or(DEFAULT_SEARCH_LIMIT);
            let tracks = spotify
                .search_tracks(&token, &query, limit)
                .await
                .map_err(failed)?;
            serde_json::json!({ "tracks": tracks })
        }
        Some("genres") => {
            let genres = spotify
                .available_genre_seeds(&token)
                .await
                .map_err(failed)?;
            serde_json::json!({ "genres": genres })
        }
        Some("playlists") => {
            let playlists = spotify.user_playlists(&token).await.map_err(failed)?;
            serde_json::json!({ "playlists": playlists })
        }
        Some("playlist") => {
            let id = non_empty(params.id)
                .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Playlist ID is required"))?;
            let playlist = spotify.playlist(&token, &id).await.map_err(failed)?;
            serde_json::json!({ "playlist": playlist })
        }
        _ => return Err(api_error(StatusCode::BAD_REQUEST, INVALID_GET_ACTION)),
    };
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// POST
// ---------------------------------------------------------------------------

/// Body of `POST /api/spotify`. Which fields matter depends on `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyAction {
    pub action: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub playlist_id: Option<String>,
    /// Kept loose so a non-array gets the proper 400 message.
    pub track_uris: Option<Value>,
    pub seed_tracks: Option<Vec<String>>,
    pub seed_artists: Option<Vec<String>>,
    pub seed_genres: Option<Vec<String>>,
    pub atmosphere_settings: Option<AtmosphereSettings>,
}

/// String elements of a JSON array, or `None` for anything else.
fn string_array(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// POST /api/spotify - playlist writes and recommendations.
pub async fn spotify_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SpotifyAction>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let spotify = &state.spotify;
    let failed = |e| upstream_error(e, "Failed to perform action with Spotify");

    let response = match body.action.as_deref() {
        Some("create-playlist") => {
            let name = non_empty(body.name)
                .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Playlist name is required"))?;
            let description = body.description.unwrap_or_default();
            let user = spotify.current_user(&token).await.map_err(failed)?;
            let playlist = spotify
                .create_playlist(
                    &token,
                    &user.id,
                    &NewPlaylist {
                        name: &name,
                        description: &description,
                        public: body.is_public.unwrap_or(true),
                    },
                )
                .await
                .map_err(failed)?;
            tracing::info!(playlist_id = %playlist.id, "Created playlist");
            serde_json::json!({ "playlist": playlist })
        }
        Some("add-tracks") => {
            let playlist_id = non_empty(body.playlist_id);
            let uris = body.track_uris.as_ref().and_then(string_array);
            let (playlist_id, uris) = playlist_id.zip(uris).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "Playlist ID and track URIs array are required",
                )
            })?;
            let result = spotify
                .add_tracks(&token, &playlist_id, &uris)
                .await
                .map_err(failed)?;
            serde_json::json!({ "result": result })
        }
        Some("recommendations") => {
            let settings = body.atmosphere_settings.ok_or_else(|| {
                api_error(StatusCode::BAD_REQUEST, "Atmosphere settings are required")
            })?;
            let params = map_atmosphere_to_params(&settings);
            let seeds = Seeds::new(
                body.seed_tracks.unwrap_or_default(),
                body.seed_artists.unwrap_or_default(),
                body.seed_genres.unwrap_or_default(),
            );
            let tracks = spotify
                .recommendations(&token, &seeds, &params, Some(RECOMMENDATION_TRACKS))
                .await
                .map_err(failed)?;
            serde_json::json!({ "tracks": tracks })
        }
        _ => return Err(api_error(StatusCode::BAD_REQUEST, INVALID_POST_ACTION)),
    };
    Ok(Json(response))
}
