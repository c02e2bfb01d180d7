//! Record storage collaborator.
//!
//! The core only talks to storage through [`RecordStore`]. Every call may
//! fail with a [`StoreError`]; callers in `app` turn failures into empty or
//! no-op results rather than letting them reach playback state.

mod file;
mod prefs;

pub use file::FileStore;
pub use prefs::{Prefs, PrefsFile};

use std::path::PathBuf;

use thiserror::Error;

use crate::library::{Playlist, PlaylistId, Track, TrackId};

pub type Result<T> = std::result::Result<T, StoreError>;

/// The record store could not be read or written.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value record store for playlists, tracks and track payloads.
pub trait RecordStore {
    fn get_all_playlists(&self) -> Result<Vec<Playlist>>;
    fn get_all_tracks(&self) -> Result<Vec<Track>>;
    fn get_track_by_id(&self, id: &TrackId) -> Result<Option<Track>>;
    /// Raw audio bytes of a track, if any were stored.
    fn load_payload(&self, id: &TrackId) -> Result<Option<Vec<u8>>>;
    fn put_playlist(&self, playlist: &Playlist) -> Result<()>;
    fn put_track(&self, track: &Track) -> Result<()>;
    fn put_payload(&self, id: &TrackId, payload: &[u8]) -> Result<()>;
    fn delete_playlist(&self, id: &PlaylistId) -> Result<()>;
    /// Delete a track record together with its payload.
    fn delete_track(&self, id: &TrackId) -> Result<()>;
    /// Remove every playlist and track.
    fn clear(&self) -> Result<()>;
}
