use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::library::default_mime;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub version: u32,
    pub exported_at: String,
    pub active_playlist_id: Option<String>,
    pub playlists: Vec<ExportPlaylist>,
    pub tracks: Vec<ExportTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlaylist {
    pub id: String,
    pub name: String,
    pub track_ids: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTrack {
    pub id: String,
    pub name: String,
    pub memo: String,
    pub artist: String,
    pub created_at: i64,
    /// `None` when the store held no payload for the track.
    pub blob_data_url: Option<String>,
}

/// Lenient views used on import. Every field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct LooseTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    pub memo: Option<String>,
    pub artist: Option<String>,
    pub created_at: Option<f64>,
    pub blob_data_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct LoosePlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub track_ids: Option<Vec<serde_json::Value>>,
    pub created_at: Option<f64>,
}

pub fn encode_data_url(mime: &str, payload: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(payload))
}

/// Split a `data:<mime>;base64,<data>` URL into its MIME type and bytes.
///
/// A header without a `;base64` marker falls back to `audio/mpeg`. Empty or
/// undecodable data yields `None`.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let (header, data) = url.split_once(',')?;
    if data.is_empty() {
        return None;
    }
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.split_once(";base64"))
        .map(|(m, _)| m.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_mime);
    let bytes = STANDARD.decode(data.trim()).ok()?;
    if bytes.is_empty() {
        return None;
    }
    Some((mime, bytes))
}
