use super::scan::{is_audio_file, mime_for};
use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = LibrarySettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
}

#[test]
fn mime_follows_extension() {
    assert_eq!(mime_for(Path::new("a.FLAC")), "audio/flac");
    assert_eq!(mime_for(Path::new("a.wav")), "audio/wav");
    assert_eq!(mime_for(Path::new("a.mp3")), "audio/mpeg");
    assert_eq!(mime_for(Path::new("a")), "audio/mpeg");
}

#[test]
fn ingest_names_tracks_by_stem_and_keeps_payload() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.MP3"), b"bbb").unwrap();
    fs::write(dir.path().join("a.ogg"), b"aa").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

    let got = ingest(&[dir.path()], &LibrarySettings::default());
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].track.name, "a");
    assert_eq!(got[0].payload, b"aa");
    assert_eq!(got[0].track.mime, "audio/ogg");
    assert_eq!(got[1].track.name, "b");
    assert!(got[0].track.created_at < got[1].track.created_at);
    assert_ne!(got[0].track.id, got[1].track.id);
    assert!(got[0].track.memo.is_empty());
}

#[test]
fn ingest_accepts_single_file_roots() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("solo.wav");
    fs::write(&file, b"x").unwrap();
    let got = ingest(&[file.as_path()], &LibrarySettings::default());
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].track.name, "solo");
}

#[test]
fn collect_respects_hidden_and_recursion_settings() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
    fs::write(dir.path().join("root.mp3"), b"x").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"x").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        recursive: false,
        ..LibrarySettings::default()
    };
    let paths = collect_audio_paths(dir.path(), &settings);
    assert_eq!(paths, vec![dir.path().join("root.mp3")]);

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    assert_eq!(collect_audio_paths(dir.path(), &settings).len(), 2);
}

#[test]
fn playlist_add_is_idempotent() {
    let mut p = Playlist::new("mix");
    let id = TrackId::new("t1");
    assert!(p.add_track(id.clone()));
    assert!(!p.add_track(id.clone()));
    assert_eq!(p.track_ids, vec![id]);
}

#[test]
fn playlist_purge_and_remove() {
    let mut p = Playlist::new("mix");
    p.add_track(TrackId::new("a"));
    p.add_track(TrackId::new("b"));
    p.add_track(TrackId::new("c"));
    assert_eq!(p.remove_at(1), Some(TrackId::new("b")));
    assert_eq!(p.remove_at(9), None);
    assert!(p.purge(&TrackId::new("a")));
    assert!(!p.purge(&TrackId::new("zzz")));
    assert_eq!(p.track_ids, vec![TrackId::new("c")]);
}

#[test]
fn track_subtitle_falls_back_to_placeholder() {
    let mut t = Track::new("song");
    assert_eq!(t.subtitle("add a memo"), "add a memo");
    t.memo = "  ".into();
    assert_eq!(t.subtitle("add a memo"), "add a memo");
    t.memo = "live take".into();
    assert_eq!(t.subtitle("add a memo"), "live take");
}
