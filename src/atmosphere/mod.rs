//! Atmosphere settings and their mapping onto recommendation bounds.
//!
//! The UI exposes a handful of 0–100 sliders plus a mood label. The
//! [`mapper`] turns those into the numeric windows a recommendation query
//! expects (tempo in BPM, everything else on a 0.0–1.0 scale).

pub mod mapper;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mapper::{map_atmosphere_to_params, RecommendationParams};

/// Lower bound of every slider.
pub const SLIDER_MIN: i32 = 0;
/// Upper bound of every slider.
pub const SLIDER_MAX: i32 = 100;

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Mood label chosen by the user.
///
/// The set is open: unknown labels are kept verbatim in [`Mood::Other`] and
/// behave as neutral when mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    Happy,
    Sad,
    Tense,
    Relaxed,
    Epic,
    Mysterious,
    Other(String),
}

impl Mood {
    /// Parse a label. Matching ignores case and surrounding whitespace.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "happy" => Self::Happy,
            "sad" => Self::Sad,
            "tense" => Self::Tense,
            "relaxed" => Self::Relaxed,
            "epic" => Self::Epic,
            "mysterious" => Self::Mysterious,
            _ => Self::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Tense => "tense",
            Self::Relaxed => "relaxed",
            Self::Epic => "epic",
            Self::Mysterious => "mysterious",
            Self::Other(label) => label,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::Other("neutral".to_string())
    }
}

impl From<String> for Mood {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<&str> for Mood {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AtmosphereSettings
// ---------------------------------------------------------------------------

/// Slider values and hints describing the desired musical atmosphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmosphereSettings {
    /// Slow (0) to fast (100).
    pub tempo: i32,
    /// Calm (0) to energetic (100).
    pub energy: i32,
    /// Simple (0) to complex (100).
    pub complexity: i32,
    #[serde(default)]
    pub mood: Mood,
    /// Seed hints; not authoritative.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Part of the contract, ignored by the mapping.
    #[serde(default)]
    pub era: String,
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            tempo: 50,
            energy: 50,
            complexity: 50,
            mood: Mood::default(),
            genres: Vec::new(),
            era: String::new(),
        }
    }
}

impl AtmosphereSettings {
    /// Copy of these settings with every slider clamped to `[0, 100]`.
    pub fn clamped(&self) -> Self {
        Self {
            tempo: clamp_slider(self.tempo),
            energy: clamp_slider(self.energy),
            complexity: clamp_slider(self.complexity),
            ..self.clone()
        }
    }
}

fn clamp_slider(value: i32) -> i32 {
    value.clamp(SLIDER_MIN, SLIDER_MAX)
}
