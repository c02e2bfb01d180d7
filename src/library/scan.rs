use std::fs;
use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

/// A file picked up by ingestion, ready to be written to the store.
pub struct Ingested {
    pub track: Track,
    pub payload: Vec<u8>,
}

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts = normalized_extensions(settings);
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Guess a MIME type from the file extension.
pub(crate) fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("m4a") | Some("mp4") | Some("aac") => "audio/mp4",
        _ => "audio/mpeg",
    }
}

/// Build a track record for `path`. The display name is the file stem; tags
/// only contribute the artist and a duration hint.
fn track_for(path: &Path) -> Track {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut track = Track::new(name);
    track.mime = mime_for(path).to_string();

    if let Ok(tagged) = lofty::read_from_path(path) {
        let duration = tagged.properties().duration();
        if !duration.is_zero() {
            track.duration_ms = Some(duration.as_millis() as u64);
        }
        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(artist) = tag.artist() {
                let artist = artist.trim();
                if !artist.is_empty() {
                    track.artist = artist.to_string();
                }
            }
        }
    }

    track
}

/// Collect audio files under `root`. `root` may itself be a single file, in
/// which case it is taken as long as its extension matches.
pub fn collect_audio_paths(root: &Path, settings: &LibrarySettings) -> Vec<std::path::PathBuf> {
    if root.is_file() {
        return if is_audio_file(root, settings) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut paths: Vec<_> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .collect();

    // Stable ingestion order so `created_at` follows file names.
    paths.sort();
    paths
}

/// Read every audio file under each of `roots`. Unreadable files are skipped.
pub fn ingest(roots: &[impl AsRef<Path>], settings: &LibrarySettings) -> Vec<Ingested> {
    let base = super::model::now_millis();
    let mut out = Vec::new();
    for root in roots {
        for path in collect_audio_paths(root.as_ref(), settings) {
            match fs::read(&path) {
                Ok(payload) => {
                    let mut track = track_for(&path);
                    track.created_at = base + out.len() as i64;
                    debug!(path = %path.display(), id = %track.id, "ingested");
                    out.push(Ingested { track, payload });
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }
    }
    out
}
