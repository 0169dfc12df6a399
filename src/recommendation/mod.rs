//! Genre recommendations from a language model.
//!
//! - [`prompt`] renders the request for a board game
//! - [`parser`] recovers genres, keywords, audio features and an explanation
//!   from whatever text the model sends back
//! - [`types`] holds the result record and its fallback constants

pub mod parser;
pub mod prompt;
pub mod types;

pub use parser::parse_ai_response;
pub use prompt::{build_messages, build_prompt};
pub use types::{
    AudioFeatures, BoardGameSummary, ParsedRecommendation, EXPLANATION_CAP, FALLBACK_GENRES,
};
