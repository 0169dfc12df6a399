//! Slider-to-bounds mapping.
//!
//! Generic numeric mappings run first; mood-specific rules run afterwards and
//! replace whatever bound they touch.

use serde::{Deserialize, Serialize};

use super::{AtmosphereSettings, Mood};

/// Lowest tempo produced, in BPM (slider at 0).
pub const BASE_MIN_TEMPO: f64 = 40.0;
/// BPM span covered by the tempo slider.
pub const TEMPO_SPAN: f64 = 80.0;
/// Width of the tempo window.
pub const TEMPO_WINDOW: f64 = 30.0;

const ENERGY_HALF_WINDOW: f64 = 0.2;
const INSTRUMENTALNESS_HALF_WINDOW: f64 = 0.1;
const VALENCE_HALF_WINDOW: f64 = 0.2;
const NEUTRAL_VALENCE: f64 = 0.5;

/// Numeric bounds for a recommendation query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationParams {
    pub min_tempo: f64,
    pub max_tempo: f64,
    pub min_energy: f64,
    pub max_energy: f64,
    pub min_valence: f64,
    pub max_valence: f64,
    pub min_instrumentalness: f64,
    pub max_instrumentalness: f64,
}

impl RecommendationParams {
    /// Query-string pairs in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("min_tempo", self.min_tempo.to_string()),
            ("max_tempo", self.max_tempo.to_string()),
            ("min_energy", self.min_energy.to_string()),
            ("max_energy", self.max_energy.to_string()),
            ("min_valence", self.min_valence.to_string()),
            ("max_valence", self.max_valence.to_string()),
            ("min_instrumentalness", self.min_instrumentalness.to_string()),
            ("max_instrumentalness", self.max_instrumentalness.to_string()),
        ]
    }
}

/// Bound a mood forces, applied after the generic mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MoodOverride {
    MinEnergy(f64),
    MaxEnergy(f64),
    MinInstrumentalness(f64),
}

/// Base valence plus the optional bound override for a mood.
fn mood_rule(mood: &Mood) -> (f64, Option<MoodOverride>) {
    match mood {
        Mood::Happy => (0.8, None),
        Mood::Sad => (0.2, None),
        Mood::Tense => (0.3, Some(MoodOverride::MinEnergy(0.7))),
        Mood::Relaxed => (0.6, Some(MoodOverride::MaxEnergy(0.4))),
        Mood::Epic => (NEUTRAL_VALENCE, Some(MoodOverride::MinEnergy(0.8))),
        Mood::Mysterious => (0.4, Some(MoodOverride::MinInstrumentalness(0.4))),
        Mood::Other(_) => (NEUTRAL_VALENCE, None),
    }
}

/// `[center - half, center + half]` clipped to `[0, 1]`.
fn unit_window(center: f64, half: f64) -> (f64, f64) {
    ((center - half).max(0.0), (center + half).min(1.0))
}

/// Convert atmosphere settings into recommendation bounds.
///
/// Sliders are clamped to `[0, 100]` before mapping, so every unit-scale
/// bound lands in `[0, 1]` and every `min_*` is at most its `max_*`.
pub fn map_atmosphere_to_params(settings: &AtmosphereSettings) -> RecommendationParams {
    let settings = settings.clamped();

    let min_tempo = BASE_MIN_TEMPO + f64::from(settings.tempo) / 100.0 * TEMPO_SPAN;
    let max_tempo = min_tempo + TEMPO_WINDOW;

    let energy = f64::from(settings.energy) / 100.0;
    let (mut min_energy, mut max_energy) = unit_window(energy, ENERGY_HALF_WINDOW);

    // Halved scale: complexity tops out at 0.5 instrumentalness.
    let instrumentalness = f64::from(settings.complexity) / 200.0;
    let (mut min_instrumentalness, mut max_instrumentalness) =
        unit_window(instrumentalness, INSTRUMENTALNESS_HALF_WINDOW);

    let (valence, mood_override) = mood_rule(&settings.mood);
    let (min_valence, max_valence) = unit_window(valence, VALENCE_HALF_WINDOW);

    // The override replaces its bound; the partner follows if crossed.
    match mood_override {
        Some(MoodOverride::MinEnergy(value)) => {
            min_energy = value;
            max_energy = max_energy.max(value);
        }
        Some(MoodOverride::MaxEnergy(value)) => {
            max_energy = value;
            min_energy = min_energy.min(value);
        }
        Some(MoodOverride::MinInstrumentalness(value)) => {
            min_instrumentalness = value;
            max_instrumentalness = max_instrumentalness.max(value);
        }
        None => {}
    }

    RecommendationParams {
        min_tempo,
        max_tempo,
        min_energy,
        max_energy,
        min_valence,
        max_valence,
        min_instrumentalness,
        max_instrumentalness,
    }
}
