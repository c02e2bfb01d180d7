use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Stable identity of a library track.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id for a newly ingested track.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identity of a playlist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch, the unit used for `created_at`.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A library track record. The audio payload is stored separately and only
/// loaded when the track is played or its waveform is decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default = "default_mime")]
    pub mime: String,
    /// Duration probed at ingestion time, used until the decoder reports one.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    pub created_at: i64,
}

pub(crate) fn default_mime() -> String {
    "audio/mpeg".to_string()
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::generate(),
            name: name.into(),
            memo: String::new(),
            artist: String::new(),
            mime: default_mime(),
            duration_ms: None,
            created_at: now_millis(),
        }
    }

    pub fn duration_hint(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// The memo, or `placeholder` when it is blank.
    pub fn subtitle<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.memo.trim().is_empty() {
            placeholder
        } else {
            &self.memo
        }
    }
}

/// A named ordering of track ids. Ids are weak references: a playlist may
/// hold ids whose track no longer exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
    pub created_at: i64,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            track_ids: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// Append `id` unless it is already present. Returns whether it was added.
    pub fn add_track(&mut self, id: TrackId) -> bool {
        if self.track_ids.contains(&id) {
            return false;
        }
        self.track_ids.push(id);
        true
    }

    /// Remove the entry at `index`, returning its id.
    pub fn remove_at(&mut self, index: usize) -> Option<TrackId> {
        if index < self.track_ids.len() {
            Some(self.track_ids.remove(index))
        } else {
            None
        }
    }

    /// Drop every occurrence of `id`. Returns whether anything was removed.
    pub fn purge(&mut self, id: &TrackId) -> bool {
        let before = self.track_ids.len();
        self.track_ids.retain(|t| t != id);
        before != self.track_ids.len()
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.track_ids.iter().position(|t| t == id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.track_ids.contains(id)
    }
}
