use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::library::{Playlist, PlaylistId, Track, TrackId};

use super::{RecordStore, Result, StoreError};

const PLAYLISTS: &str = "playlists";
const TRACKS: &str = "tracks";
const RECORD_EXT: &str = "json";
const PAYLOAD_EXT: &str = "audio";

/// A [`RecordStore`] keeping one JSON file per record under a root directory:
///
/// ```text
/// <root>/playlists/<key>.json
/// <root>/tracks/<key>.json
/// <root>/tracks/<key>.audio
/// ```
///
/// `<key>` is the URL-safe base64 of the id, so any id is a valid file name.
pub struct FileStore {
    root: PathBuf,
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn file_key(id: &str) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        for dir in [PLAYLISTS, TRACKS] {
            let path = store.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, id: &str) -> PathBuf {
        self.root
            .join(dir)
            .join(format!("{}.{RECORD_EXT}", file_key(id)))
    }

    fn payload_path(&self, id: &TrackId) -> PathBuf {
        self.root
            .join(TRACKS)
            .join(format!("{}.{PAYLOAD_EXT}", file_key(id.as_str())))
    }

    fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write through a temporary file so a crash never leaves half a record.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| io_err(path, e))
    }

    fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        Self::write_atomic(path, &bytes)
    }

    fn remove_if_present(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(path, e)),
        }
    }

    /// Read every record in `dir`. Unreadable or corrupt records are skipped
    /// with a warning; only a missing or unreadable directory is an error.
    fn read_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let dir_path = self.root.join(dir);
        let entries = fs::read_dir(&dir_path).map_err(|e| io_err(&dir_path, e))?;

        let mut out = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(e) => e.path(),
                Err(e) => return Err(io_err(&dir_path, e)),
            };
            if path.extension().and_then(|s| s.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            match Self::read_record::<T>(&path) {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "skipping unreadable record"),
            }
        }
        Ok(out)
    }

    fn clear_dir(&self, dir: &str) -> Result<()> {
        let dir_path = self.root.join(dir);
        match fs::remove_dir_all(&dir_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(&dir_path, e)),
        }
        fs::create_dir_all(&dir_path).map_err(|e| io_err(&dir_path, e))
    }
}

impl RecordStore for FileStore {
    fn get_all_playlists(&self) -> Result<Vec<Playlist>> {
        self.read_all(PLAYLISTS)
    }

    fn get_all_tracks(&self) -> Result<Vec<Track>> {
        self.read_all(TRACKS)
    }

    fn get_track_by_id(&self, id: &TrackId) -> Result<Option<Track>> {
        Self::read_record(&self.record_path(TRACKS, id.as_str()))
    }

    fn load_payload(&self, id: &TrackId) -> Result<Option<Vec<u8>>> {
        let path = self.payload_path(id);
        match fs::read(&path) {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path, e)),
        }
    }

    fn put_playlist(&self, playlist: &Playlist) -> Result<()> {
        Self::write_record(&self.record_path(PLAYLISTS, playlist.id.as_str()), playlist)
    }

    fn put_track(&self, track: &Track) -> Result<()> {
        Self::write_record(&self.record_path(TRACKS, track.id.as_str()), track)
    }

    fn put_payload(&self, id: &TrackId, payload: &[u8]) -> Result<()> {
        Self::write_atomic(&self.payload_path(id), payload)
    }

    fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        Self::remove_if_present(&self.record_path(PLAYLISTS, id.as_str()))
    }

    fn delete_track(&self, id: &TrackId) -> Result<()> {
        Self::remove_if_present(&self.record_path(TRACKS, id.as_str()))?;
        Self::remove_if_present(&self.payload_path(id))
    }

    fn clear(&self) -> Result<()> {
        self.clear_dir(PLAYLISTS)?;
        self.clear_dir(TRACKS)
    }
}
