//! # tabletop-tunes
//!
//! Soundtracks for board-game nights. The crate turns a game's metadata and
//! a handful of mood sliders into music:
//!
//! - [`atmosphere`] maps tempo/energy/complexity sliders and a mood onto
//!   numeric bounds for a recommendation query.
//! - [`recommendation`] prompts a language model for matching genres and
//!   recovers a structured answer from whatever text comes back.
//! - [`boardgames`], [`spotify`] and [`llms`] wrap the upstream services.
//! - [`server`] exposes all of it over HTTP.

pub mod atmosphere;
pub mod boardgames;
pub mod config;
pub mod error;
pub mod llms;
pub mod recommendation;
pub mod server;
pub mod spotify;

pub use atmosphere::{map_atmosphere_to_params, AtmosphereSettings, Mood, RecommendationParams};
pub use boardgames::{BoardGame, BoardGameClient};
pub use config::AppConfig;
pub use error::{ClientError, ConfigError};
pub use llms::{ChatMessage, CompletionProvider, OpenAiCompatClient};
pub use recommendation::{parse_ai_response, BoardGameSummary, ParsedRecommendation};
pub use spotify::{Seeds, SpotifyClient, TokenSet};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
