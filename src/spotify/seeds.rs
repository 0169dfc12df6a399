//! Seed selection for recommendation queries.
//!
//! The recommendations endpoint accepts at most [`MAX_SEEDS`] seeds across
//! tracks, artists and genres combined.

use serde::{Deserialize, Serialize};

/// Combined seed limit.
pub const MAX_SEEDS: usize = 5;

/// Seeds anchoring a recommendation query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seeds {
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Seeds {
    pub fn new(tracks: Vec<String>, artists: Vec<String>, genres: Vec<String>) -> Self {
        Self {
            tracks,
            artists,
            genres,
        }
    }

    pub fn total(&self) -> usize {
        self.tracks.len() + self.artists.len() + self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Cut the seeds down to the combined budget.
    ///
    /// First each kind is cut against the supplied counts of the other two;
    /// when the others alone exceed the budget, the kind loses that excess
    /// from its own length. If the result is still over budget, tracks,
    /// artists and genres are trimmed in turn to what the current others
    /// leave, keeping at least one. When every seed would be lost, the
    /// first seed of each supplied kind is kept instead.
    pub fn within_budget(&self) -> Seeds {
        let (t, a, g) = (self.tracks.len(), self.artists.len(), self.genres.len());

        let mut budgeted = Seeds {
            tracks: take(&self.tracks, first_cut(t, a + g)),
            artists: take(&self.artists, first_cut(a, t + g)),
            genres: take(&self.genres, first_cut(g, t + a)),
        };

        if budgeted.total() > MAX_SEEDS {
            log::warn!(
                "Too many seeds ({}); Spotify allows at most {}",
                budgeted.total(),
                MAX_SEEDS
            );
            let room = |others: usize| MAX_SEEDS.saturating_sub(others).max(1);
            if !budgeted.tracks.is_empty() {
                let n = room(budgeted.artists.len() + budgeted.genres.len());
                budgeted.tracks.truncate(n);
            }
            if !budgeted.artists.is_empty() {
                let n = room(budgeted.tracks.len() + budgeted.genres.len());
                budgeted.artists.truncate(n);
            }
            if !budgeted.genres.is_empty() {
                let n = room(budgeted.tracks.len() + budgeted.artists.len());
                budgeted.genres.truncate(n);
            }
        }

        if budgeted.is_empty() && !self.is_empty() {
            log::warn!(
                "Too many seeds ({}); keeping one of each kind",
                self.total()
            );
            return Seeds {
                tracks: take(&self.tracks, 1),
                artists: take(&self.artists, 1),
                genres: take(&self.genres, 1),
            };
        }
        budgeted
    }

    /// `seed_*` query pairs; kinds without seeds are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("seed_tracks", &self.tracks),
            ("seed_artists", &self.artists),
            ("seed_genres", &self.genres),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| (key, values.join(",")))
        .collect()
    }
}

/// Seeds of one kind that survive the first cut. Within budget the kind
/// gets the room the others leave; past it, it loses the overshoot.
fn first_cut(len: usize, others: usize) -> usize {
    if others <= MAX_SEEDS {
        len.min(MAX_SEEDS - others)
    } else {
        len.saturating_sub(others - MAX_SEEDS)
    }
}

fn take(values: &[String], n: usize) -> Vec<String> {
    values.iter().take(n).cloned().collect()
}
