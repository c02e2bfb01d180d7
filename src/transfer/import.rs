use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::library::{Playlist, PlaylistId, Track, TrackId, now_millis};
use crate::store::RecordStore;

use super::TransferError;
use super::format::{LoosePlaylist, LooseTrack, decode_data_url};

/// A validated import, ready to replace the current library.
#[derive(Debug, Default)]
pub struct ImportPlan {
    pub tracks: Vec<(Track, Vec<u8>)>,
    /// Playlists as listed in the file; ids are filtered on apply.
    pub playlists: Vec<Playlist>,
    pub active_playlist_id: Option<PlaylistId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub tracks: usize,
    pub playlists: usize,
    pub active_playlist_id: Option<PlaylistId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    playlists: Vec<serde_json::Value>,
    tracks: Vec<serde_json::Value>,
    #[serde(default)]
    active_playlist_id: Option<serde_json::Value>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn timestamp(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v as i64,
        _ => now_millis(),
    }
}

fn track_entry(value: serde_json::Value) -> Option<(Track, Vec<u8>)> {
    let raw: LooseTrack = serde_json::from_value(value).ok()?;
    let id = non_empty(raw.id)?;
    let name = non_empty(raw.name)?;
    let (mime, payload) = raw.blob_data_url.as_deref().and_then(decode_data_url)?;

    let track = Track {
        id: TrackId::new(id),
        name,
        memo: raw.memo.unwrap_or_default(),
        artist: raw.artist.unwrap_or_default(),
        mime,
        duration_ms: None,
        created_at: timestamp(raw.created_at),
    };
    Some((track, payload))
}

fn playlist_entry(value: serde_json::Value) -> Option<Playlist> {
    let raw: LoosePlaylist = serde_json::from_value(value).ok()?;
    let id = non_empty(raw.id)?;
    let name = non_empty(raw.name)?;
    let track_ids = raw
        .track_ids
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| v.as_str().map(TrackId::new))
        .collect();

    Some(Playlist {
        id: PlaylistId::new(id),
        name,
        track_ids,
        created_at: timestamp(raw.created_at),
    })
}

/// Validate an export document. Nothing is touched when this fails.
///
/// Entries that are not objects, lack an id or name, or (for tracks) lack
/// decodable audio are dropped.
pub fn parse_import(text: &str) -> Result<ImportPlan, TransferError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let doc: Document = serde_json::from_value(value)
        .map_err(|e| TransferError::Format(e.to_string()))?;

    let tracks: Vec<_> = doc.tracks.into_iter().filter_map(track_entry).collect();
    let playlists: Vec<_> = doc.playlists.into_iter().filter_map(playlist_entry).collect();
    let active_playlist_id = doc
        .active_playlist_id
        .and_then(|v| v.as_str().map(str::to_string))
        .and_then(|s| non_empty(Some(s)))
        .map(PlaylistId::new);

    debug!(
        tracks = tracks.len(),
        playlists = playlists.len(),
        "import validated"
    );
    Ok(ImportPlan {
        tracks,
        playlists,
        active_playlist_id,
    })
}

pub fn read_import(path: &Path) -> Result<ImportPlan, TransferError> {
    let text = fs::read_to_string(path).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_import(&text)
}

/// Replace the whole store with `plan`.
///
/// Playlists keep only the track ids that were actually written.
pub fn apply_import(
    store: &dyn RecordStore,
    plan: ImportPlan,
) -> Result<ImportSummary, TransferError> {
    store.clear()?;

    let mut imported: HashSet<TrackId> = HashSet::new();
    for (track, payload) in &plan.tracks {
        store.put_payload(&track.id, payload)?;
        store.put_track(track)?;
        imported.insert(track.id.clone());
    }

    let mut playlists = 0;
    for mut playlist in plan.playlists {
        playlist.track_ids.retain(|id| imported.contains(id));
        store.put_playlist(&playlist)?;
        playlists += 1;
    }

    info!(tracks = imported.len(), playlists, "library imported");
    Ok(ImportSummary {
        tracks: imported.len(),
        playlists,
        active_playlist_id: plan.active_playlist_id,
    })
}
