//! Spotify Web API integration.
//!
//! - [`client`] - Profile, search, playlists and recommendations
//! - [`seeds`] - Seed budgeting for recommendation queries
//! - [`auth`] - Access-token refresh
//! - [`types`] - Response records

pub mod auth;
pub mod client;
pub mod seeds;
pub mod types;

pub use auth::{TokenRefresher, TokenSet, REFRESH_TOKEN_ERROR};
pub use client::SpotifyClient;
pub use seeds::{Seeds, MAX_SEEDS};
pub use types::{NewPlaylist, SnapshotResponse, SpotifyPlaylist, SpotifyTrack, SpotifyUser};
