//! Axum route handlers for the tabletop-tunes HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                 - Returns `{"status": "ok", "version": "0.3.0"}`
//! - `POST /api/ai`                 - Genre recommendation for a board game
//! - `POST /api/atmosphere/params`  - Slider settings to recommendation bounds
//! - `GET  /api/boardgames`         - BoardGameGeek search, details and hot list
//! - `GET  /api/spotify`            - Spotify reads (see [`super::spotify`])
//! - `POST /api/spotify`            - Spotify writes and recommendations
//! - `POST /api/auth/refresh`       - Refresh an expired Spotify access token

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::spotify::{spotify_get_handler, spotify_post_handler};
use super::state::AppState;
use crate::atmosphere::{map_atmosphere_to_params, AtmosphereSettings, RecommendationParams};
use crate::boardgames::BoardGame;
use crate::error::ClientError;
use crate::recommendation::{
    build_messages, parse_ai_response, BoardGameSummary, ParsedRecommendation,
};
use crate::spotify::TokenSet;

/// Error half of every handler result: a status plus `{"error": "..."}`.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/ai", post(ai_handler))
        .route("/api/atmosphere/params", post(atmosphere_params_handler))
        .route("/api/boardgames", get(boardgames_handler))
        .route(
            "/api/spotify",
            get(spotify_get_handler).post(spotify_post_handler),
        )
        .route("/api/auth/refresh", post(refresh_token_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "tabletop-tunes",
    }))
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Body of `POST /api/ai`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub board_game: Option<BoardGame>,
}

/// POST /api/ai - ask the language model for genres matching a game.
///
/// Upstream failures never surface as errors: the caller gets the fixed
/// fallback recommendation instead. A body that is not a JSON request of
/// the expected shape gets the parse-error fallback.
async fn ai_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ParsedRecommendation>, ApiError> {
    let request: AiRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Unreadable AI request body: {}", e);
            return Ok(Json(ParsedRecommendation::fallback()));
        }
    };
    let game = request
        .board_game
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Board game information is required"))?;
    if game.id.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Board game ID is required"));
    }
    if game.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Board game name is required"));
    }

    tracing::debug!(game_id = %game.id, game = %game.name, "Requesting genre recommendation");
    let messages = build_messages(&game);

    match state.completion.complete(&messages).await {
        Ok(raw) => {
            let hint = BoardGameSummary::from(&game);
            let parsed = parse_ai_response(&raw, Some(&hint));
            tracing::info!(game_id = %game.id, genres = ?parsed.genres, "Recommendation ready");
            Ok(Json(parsed))
        }
        Err(e) => {
            tracing::error!(
                provider = state.completion.provider(),
                "Error in AI route: {}",
                e
            );
            Ok(Json(ParsedRecommendation::api_fallback()))
        }
    }
}

/// POST /api/atmosphere/params - map slider settings to query bounds.
async fn atmosphere_params_handler(
    Json(settings): Json<AtmosphereSettings>,
) -> Json<RecommendationParams> {
    Json(map_atmosphere_to_params(&settings))
}

// ---------------------------------------------------------------------------
// Board games
// ---------------------------------------------------------------------------

/// Query of `GET /api/boardgames`.
#[derive(Debug, Default, Deserialize)]
pub struct BoardGameQuery {
    pub query: Option<String>,
    pub id: Option<String>,
    pub hot: Option<String>,
}

/// GET /api/boardgames - `?query=`, `?id=` or `?hot=true`, checked in that order.
async fn boardgames_handler(
    State(state): State<AppState>,
    Query(params): Query<BoardGameQuery>,
) -> Result<Json<Value>, ApiError> {
    let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

    let result = if let Some(query) = present(&params.query) {
        state
            .boardgames
            .search(&query)
            .await
            .map(|results| serde_json::json!({ "results": results }))
    } else if let Some(id) = present(&params.id) {
        state
            .boardgames
            .details(&id)
            .await
            .map(|game| serde_json::json!({ "game": game }))
    } else if params.hot.as_deref() == Some("true") {
        state
            .boardgames
            .hot()
            .await
            .map(|games| serde_json::json!({ "hotGames": games }))
    } else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            r#"Missing required parameters. Use "query", "id", or "hot=true"."#,
        ));
    };

    result.map(Json).map_err(|e| match e {
        ClientError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Board game not found"),
        e => {
            tracing::error!("BoardGameGeek API error: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch board game data",
            )
        }
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// POST /api/auth/refresh - return the token set, refreshed if expired.
async fn refresh_token_handler(
    State(state): State<AppState>,
    Json(token): Json<TokenSet>,
) -> Result<Json<TokenSet>, ApiError> {
    let refresher = state.token_refresher.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Spotify credentials are not configured",
        )
    })?;
    Ok(Json(refresher.refresh_if_expired(&token).await))
}
