//! Output and context types for the recommendation parser.

use serde::{Deserialize, Serialize};

use crate::boardgames::BoardGame;

/// Genres used whenever nothing usable can be recovered from a reply.
pub const FALLBACK_GENRES: [&str; 5] = [
    "instrumental",
    "soundtrack",
    "ambient",
    "electronic",
    "classical",
];

/// Maximum number of genres (and keywords) kept from a reply.
pub const MAX_GENRES: usize = 5;

/// Maximum explanation length in characters, ellipsis included.
pub const EXPLANATION_CAP: usize = 1000;

pub const GENERIC_EXPLANATION: &str = "These genres were selected to create an immersive atmosphere that complements the board game's theme and mechanics.";

pub const PARSE_FALLBACK_EXPLANATION: &str = "Fallback response due to parsing error. These genres provide a balanced soundtrack suitable for most board games.";

pub const API_FALLBACK_EXPLANATION: &str = "Fallback response due to API error. These genres provide a balanced soundtrack suitable for most board games.";

// ---------------------------------------------------------------------------
// AudioFeatures
// ---------------------------------------------------------------------------

/// Target audio descriptors for a playlist.
///
/// Missing fields take the documented defaults, so a partial object from
/// the model still yields a complete record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    /// Beats per minute.
    pub tempo: f64,
    pub valence: f64,
}

impl AudioFeatures {
    pub const DEFAULT: Self = Self {
        acousticness: 0.5,
        danceability: 0.5,
        energy: 0.5,
        instrumentalness: 0.5,
        liveness: 0.3,
        speechiness: 0.1,
        tempo: 120.0,
        valence: 0.5,
    };
}

impl Default for AudioFeatures {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// BoardGameSummary
// ---------------------------------------------------------------------------

/// The slice of game metadata the parser uses to personalise its
/// synthesised explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGameSummary {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl From<&BoardGame> for BoardGameSummary {
    fn from(game: &BoardGame) -> Self {
        Self {
            name: game.name.clone(),
            categories: game.categories.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ParsedRecommendation
// ---------------------------------------------------------------------------

/// Structured result recovered from a model reply. Every field is always
/// populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecommendation {
    pub genres: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub audio_features: AudioFeatures,
    pub explanation: String,
}

impl ParsedRecommendation {
    /// The fully-degraded result used when nothing can be recovered.
    pub fn fallback() -> Self {
        Self::fallback_with(PARSE_FALLBACK_EXPLANATION)
    }

    /// The result served when the model endpoint itself could not be reached.
    pub fn api_fallback() -> Self {
        Self::fallback_with(API_FALLBACK_EXPLANATION)
    }

    fn fallback_with(explanation: &str) -> Self {
        Self {
            genres: fallback_genres(),
            keywords: Vec::new(),
            audio_features: AudioFeatures::DEFAULT,
            explanation: explanation.to_string(),
        }
    }
}

pub fn fallback_genres() -> Vec<String> {
    FALLBACK_GENRES.iter().map(|g| g.to_string()).collect()
}
