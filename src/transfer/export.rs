use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::library::PlaylistId;
use crate::store::RecordStore;

use super::TransferError;
use super::format::{ExportFile, ExportPlaylist, ExportTrack, FORMAT_VERSION, encode_data_url};

/// Snapshot every playlist and track (with payload) in `store`.
pub fn export_library(
    store: &dyn RecordStore,
    active: Option<&PlaylistId>,
) -> Result<ExportFile, TransferError> {
    let mut playlists = store.get_all_playlists()?;
    playlists.sort_by_key(|p| p.created_at);
    let mut tracks = store.get_all_tracks()?;
    tracks.sort_by_key(|t| t.created_at);

    let tracks = tracks
        .into_iter()
        .map(|t| {
            let blob_data_url = match store.load_payload(&t.id) {
                Ok(Some(bytes)) => Some(encode_data_url(&t.mime, &bytes)),
                Ok(None) => None,
                Err(e) => {
                    warn!(track = %t.id, error = %e, "exporting track without audio");
                    None
                }
            };
            ExportTrack {
                id: t.id.to_string(),
                name: t.name,
                memo: t.memo,
                artist: t.artist,
                created_at: t.created_at,
                blob_data_url,
            }
        })
        .collect();

    let playlists = playlists
        .into_iter()
        .map(|p| ExportPlaylist {
            id: p.id.to_string(),
            name: p.name,
            track_ids: p.track_ids.iter().map(ToString::to_string).collect(),
            created_at: p.created_at,
        })
        .collect();

    Ok(ExportFile {
        version: FORMAT_VERSION,
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        active_playlist_id: active.map(ToString::to_string),
        playlists,
        tracks,
    })
}

/// Export to `path` as pretty-printed JSON.
pub fn write_export(
    store: &dyn RecordStore,
    active: Option<&PlaylistId>,
    path: &Path,
) -> Result<ExportFile, TransferError> {
    let file = export_library(store, active)?;
    let text = serde_json::to_string_pretty(&file)?;
    fs::write(path, text).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        playlists = file.playlists.len(),
        tracks = file.tracks.len(),
        "library exported"
    );
    Ok(file)
}
