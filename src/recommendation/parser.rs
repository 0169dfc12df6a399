//! Best-effort parsing of free-text model replies.
//!
//! The model is asked for one JSON object followed by a short explanation,
//! but it routinely wraps the object in prose, emits trailing garbage, or
//! echoes its own instructions. Parsing therefore runs as an ordered list of
//! stages per field; each stage returns `Option` and the first non-empty
//! result wins:
//!
//! ```text
//! genres:      json object ─▶ bracketed list ─▶ loose list ─▶ FALLBACK_GENRES
//! explanation: text after json ─▶ introducer sentence ─▶ synthesised sentence
//! ```
//!
//! No stage can fail, so [`parse_ai_response`] always returns a complete
//! [`ParsedRecommendation`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::types::{
    fallback_genres, AudioFeatures, BoardGameSummary, ParsedRecommendation, EXPLANATION_CAP,
    GENERIC_EXPLANATION, MAX_GENRES,
};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\{.*?"genres"\s*:\s*\[.*?\].*?\}"#).unwrap());

static BRACKETED_GENRES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)genres?["\s:]*\[(.*?)\]"#).unwrap());
static LOOSE_GENRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)genres?:?\s*([^.]*)").unwrap());

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:json)?.*?```").unwrap());

/// Instruction echoes and clarification requests the model sometimes emits.
static SELF_DIALOGUE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)However.*?valid response.*?requirements:",
        r"(?is)Here is the valid response.*?requirements:",
        r"(?is)(?:However,?\s*)?I need a confirmation.*?not\.",
        r"(?is)Please confirm.*?gameplay\.",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static INTRODUCERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)(?:These genres|The music genres|These recommendations|The chosen genres)(.*?)(?:$|```)",
        r"(?is)(?:explanation|reasoning|rationale):(.*?)(?:$|```)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const ELLIPSIS: &str = "...";

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a model reply into a [`ParsedRecommendation`].
///
/// `hint` personalises the explanation synthesised when the reply carries
/// none. The function is pure: identical input yields identical output.
pub fn parse_ai_response(raw: &str, hint: Option<&BoardGameSummary>) -> ParsedRecommendation {
    let block = find_json_block(raw);
    let payload = block.as_ref().and_then(|b| parse_json_block(b.text));

    let (genres, keywords, audio_features) = match payload {
        Some(payload) => {
            log::debug!("recommendation parsed from JSON block ({} genres)", payload.genres.len());
            (payload.genres, payload.keywords, payload.audio_features)
        }
        None => {
            let genres = bracketed_genres(raw)
                .or_else(|| loose_genres(raw))
                .unwrap_or_else(|| {
                    log::debug!("no genres recoverable from reply, using fallback list");
                    fallback_genres()
                });
            (genres, Vec::new(), AudioFeatures::DEFAULT)
        }
    };

    let explanation = block
        .as_ref()
        .and_then(|b| trailing_explanation(raw, b.end))
        .or_else(|| introduced_explanation(raw))
        .map(|text| truncate_explanation(&text))
        .unwrap_or_else(|| synthesized_explanation(hint));

    ParsedRecommendation {
        genres,
        keywords,
        audio_features,
        explanation,
    }
}

// ---------------------------------------------------------------------------
// Stage 1–2: JSON block
// ---------------------------------------------------------------------------

/// A candidate JSON object located in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
struct JsonBlock<'a> {
    text: &'a str,
    /// Byte offset just past the block.
    end: usize,
}

/// Locate the first object containing a `"genres"` array.
///
/// The pattern is non-greedy, so for objects with nested members
/// (`audioFeatures`) it stops at the first inner `}`. In that case the match
/// is widened to the balanced closing brace; it is never shortened.
fn find_json_block(raw: &str) -> Option<JsonBlock<'_>> {
    let m = JSON_OBJECT.find(raw)?;
    let end = match balanced_object_end(raw, m.start()) {
        Some(balanced) if balanced > m.end() => balanced,
        _ => m.end(),
    };
    Some(JsonBlock {
        text: &raw[m.start()..end],
        end,
    })
}

/// Byte offset just past the `}` closing the object opened at `start`.
fn balanced_object_end(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Fields recovered from a strictly-parsed JSON block.
#[derive(Debug, Clone, PartialEq)]
struct JsonPayload {
    genres: Vec<String>,
    keywords: Vec<String>,
    audio_features: AudioFeatures,
}

fn parse_json_block(text: &str) -> Option<JsonPayload> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("JSON block failed strict parsing: {}", e);
            return None;
        }
    };
    if !value.is_object() {
        return None;
    }

    let audio_features = value
        .get("audioFeatures")
        .and_then(|v| serde_json::from_value::<AudioFeatures>(v.clone()).ok())
        .unwrap_or_default();

    Some(JsonPayload {
        genres: string_list(value.get("genres")),
        keywords: string_list(value.get("keywords")),
        audio_features,
    })
}

/// Non-empty string elements of a JSON array, capped at [`MAX_GENRES`].
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_GENRES)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stage 3: fallback genres
// ---------------------------------------------------------------------------

/// `genres: ["a", "b"]` anywhere in the text.
fn bracketed_genres(raw: &str) -> Option<Vec<String>> {
    genres_from_capture(&BRACKETED_GENRES, raw)
}

/// `genres: a, b, c` up to the next period.
fn loose_genres(raw: &str) -> Option<Vec<String>> {
    genres_from_capture(&LOOSE_GENRES, raw)
}

fn genres_from_capture(pattern: &Regex, raw: &str) -> Option<Vec<String>> {
    let captured = pattern.captures(raw)?.get(1)?.as_str();
    let genres = split_genre_list(captured);
    (!genres.is_empty()).then_some(genres)
}

fn split_genre_list(list: &str) -> Vec<String> {
    list.replace('"', "")
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_GENRES)
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Stage 4: explanation
// ---------------------------------------------------------------------------

/// Prose following the JSON block, cleaned.
fn trailing_explanation(raw: &str, block_end: usize) -> Option<String> {
    non_empty(clean_explanation(&raw[block_end..]))
}

/// Text following an introducer such as "These genres…" or "explanation:".
fn introduced_explanation(raw: &str) -> Option<String> {
    INTRODUCERS.iter().find_map(|pattern| {
        let captured = pattern.captures(raw)?.get(1)?.as_str();
        non_empty(clean_explanation(captured))
    })
}

fn clean_explanation(text: &str) -> String {
    let mut cleaned = CODE_BLOCK.replace_all(text, "").into_owned();
    for artifact in SELF_DIALOGUE.iter() {
        cleaned = artifact.replace(&cleaned, "").into_owned();
    }
    trim_edges(&cleaned).to_string()
}

/// Strip quotes, commas, periods and whitespace from both ends.
fn trim_edges(text: &str) -> &str {
    text.trim_matches(|c: char| c == '"' || c == ',' || c == '.' || c.is_whitespace())
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Cap at [`EXPLANATION_CAP`] characters, ending in `...` when cut.
fn truncate_explanation(text: &str) -> String {
    if text.chars().count() <= EXPLANATION_CAP {
        return text.to_string();
    }
    let keep = EXPLANATION_CAP - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn synthesized_explanation(hint: Option<&BoardGameSummary>) -> String {
    match hint {
        Some(game) if !game.name.trim().is_empty() => {
            let themes = if game.categories.is_empty() {
                String::new()
            } else {
                format!("{} ", game.categories.join(", "))
            };
            format!(
                "These genre recommendations are chosen to match the {}themes in {}, creating an atmosphere that enhances the gameplay experience.",
                themes, game.name
            )
        }
        _ => GENERIC_EXPLANATION.to_string(),
    }
}
