//! Spotify Web API records.
//!
//! Only the fields the service reads are typed; everything else is carried
//! through untouched in `extra` so responses relayed to callers lose nothing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// The authenticated user (`GET /me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub uri: String,
    pub public: Option<bool>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generic paging envelope (`items` plus whatever paging metadata came along).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackSearchResponse {
    pub tracks: Option<Paging<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenresResponse {
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Result of adding tracks to a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

/// Body of a create-playlist request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylist<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "t1",
            "name": "Song",
            "uri": "spotify:track:t1",
            "artists": [{"id": "a1", "name": "Band"}],
            "album": {"id": "al1", "name": "Record", "images": []},
            "duration_ms": 1000,
            "popularity": 42
        });
        let track: SpotifyTrack = serde_json::from_value(json).unwrap();
        assert_eq!(track.artists[0].name, "Band");
        assert_eq!(track.extra["popularity"], 42);

        let back = serde_json::to_value(&track).unwrap();
        assert_eq!(back["popularity"], 42);
    }

    #[test]
    fn test_empty_search_response() {
        let resp: TrackSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.tracks.is_none());
    }
}
