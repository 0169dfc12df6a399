//! Board-game metadata from the BoardGameGeek XML API v2.
//!
//! - [`xml`] decodes `/search`, `/thing` and `/hot` responses (pure, offline)
//! - [`client`] fetches them over HTTP

pub mod client;
pub mod xml;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use client::BoardGameClient;
pub use xml::{parse_game_details, parse_hot_games, parse_search_results};

/// Designer/publisher placeholder when the game lists none.
pub const UNKNOWN_CREDIT: &str = "Unknown";

/// Full details for one game.
///
/// Deserialization is lenient: ids may arrive as numbers, numbers as
/// strings, and `null` stands for the default of any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardGame {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    /// Publication year; negative for BCE titles.
    #[serde(default, deserialize_with = "lenient_i32")]
    pub year: i32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub min_players: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub max_players: u32,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub playing_time: u32,
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub mechanics: Vec<String>,
    #[serde(default = "unknown_credit", deserialize_with = "lenient_credit")]
    pub designer: String,
    #[serde(default = "unknown_credit", deserialize_with = "lenient_credit")]
    pub publisher: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
}

fn unknown_credit() -> String {
    UNKNOWN_CREDIT.to_string()
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_number(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_credit<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(d)?)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(unknown_credit))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(scalar_number(Value::deserialize(d)?)
        .filter(|n| n.is_finite())
        .unwrap_or_default())
}

fn lenient_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    Ok(lenient_f64(d)? as i32)
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(lenient_f64(d)? as u32)
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    })
}

impl Default for BoardGame {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            image: String::new(),
            year: 0,
            min_players: 0,
            max_players: 0,
            playing_time: 0,
            categories: Vec::new(),
            mechanics: Vec::new(),
            designer: unknown_credit(),
            publisher: unknown_credit(),
            rating: 0.0,
        }
    }
}

/// One hit from a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardGameSearchResult {
    pub id: String,
    pub name: String,
    /// Year as reported, or `"N/A"`.
    pub year_published: String,
}

/// One entry of the trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotBoardGame {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}
