use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::config::Settings;
use crate::library::{Playlist, PlaylistId, Track, TrackId};
use crate::playback::tests::{FakeSink, FakeState};
use crate::playback::{Direction, Origin, PlayerState};
use crate::store::{PrefsFile, RecordStore, Result as StoreResult, StoreError};

#[derive(Default)]
struct Inner {
    playlists: HashMap<PlaylistId, Playlist>,
    tracks: HashMap<TrackId, Track>,
    payloads: HashMap<TrackId, Vec<u8>>,
    failing: bool,
}

/// Record store kept in memory, with a switch that makes every call fail.
#[derive(Clone, Default)]
struct MemoryStore(Rc<RefCell<Inner>>);

impl MemoryStore {
    fn check(&self) -> StoreResult<()> {
        if self.0.borrow().failing {
            return Err(StoreError::Io {
                path: "memory".into(),
                source: std::io::Error::other("unavailable"),
            });
        }
        Ok(())
    }

    fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    fn playlist(&self, id: &PlaylistId) -> Playlist {
        self.0.borrow().playlists[id].clone()
    }
}

impl RecordStore for MemoryStore {
    fn get_all_playlists(&self) -> StoreResult<Vec<Playlist>> {
        self.check()?;
        Ok(self.0.borrow().playlists.values().cloned().collect())
    }

    fn get_all_tracks(&self) -> StoreResult<Vec<Track>> {
        self.check()?;
        Ok(self.0.borrow().tracks.values().cloned().collect())
    }

    fn get_track_by_id(&self, id: &TrackId) -> StoreResult<Option<Track>> {
        self.check()?;
        Ok(self.0.borrow().tracks.get(id).cloned())
    }

    fn load_payload(&self, id: &TrackId) -> StoreResult<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.0.borrow().payloads.get(id).cloned())
    }

    fn put_playlist(&self, playlist: &Playlist) -> StoreResult<()> {
        self.check()?;
        self.0
            .borrow_mut()
            .playlists
            .insert(playlist.id.clone(), playlist.clone());
        Ok(())
    }

    fn put_track(&self, track: &Track) -> StoreResult<()> {
        self.check()?;
        self.0
            .borrow_mut()
            .tracks
            .insert(track.id.clone(), track.clone());
        Ok(())
    }

    fn put_payload(&self, id: &TrackId, payload: &[u8]) -> StoreResult<()> {
        self.check()?;
        self.0
            .borrow_mut()
            .payloads
            .insert(id.clone(), payload.to_vec());
        Ok(())
    }

    fn delete_playlist(&self, id: &PlaylistId) -> StoreResult<()> {
        self.check()?;
        self.0.borrow_mut().playlists.remove(id);
        Ok(())
    }

    fn delete_track(&self, id: &TrackId) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.0.borrow_mut();
        inner.tracks.remove(id);
        inner.payloads.remove(id);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.0.borrow_mut();
        inner.playlists.clear();
        inner.tracks.clear();
        inner.payloads.clear();
        Ok(())
    }
}

struct Harness {
    app: App,
    sink: Rc<RefCell<FakeState>>,
    store: MemoryStore,
    dir: TempDir,
}

impl Harness {
    fn start(store: MemoryStore) -> Self {
        let dir = TempDir::new().unwrap();
        Self::start_in(store, dir)
    }

    fn start_in(store: MemoryStore, dir: TempDir) -> Self {
        let (sink, state) = FakeSink::pair();
        let app = App::new(
            Box::new(store.clone()),
            PrefsFile::new(dir.path()),
            Box::new(sink),
            Settings::default(),
        );
        Self {
            app,
            sink: state,
            store,
            dir,
        }
    }

    fn playing(&self) -> Option<String> {
        self.app.current_track_id().map(|id| id.to_string())
    }
}

fn add_track(store: &MemoryStore, name: &str, created_at: i64) -> TrackId {
    let mut track = Track::new(name);
    track.id = TrackId::new(name);
    track.created_at = created_at;
    track.duration_ms = Some(200_000);
    store.put_track(&track).unwrap();
    store.put_payload(&track.id, name.as_bytes()).unwrap();
    track.id
}

fn add_playlist(store: &MemoryStore, name: &str, ids: &[&TrackId], created_at: i64) -> PlaylistId {
    let mut playlist = Playlist::new(name);
    playlist.id = PlaylistId::new(name);
    playlist.created_at = created_at;
    for id in ids {
        playlist.add_track((*id).clone());
    }
    store.put_playlist(&playlist).unwrap();
    playlist.id
}

/// Library `names` (created in that order) plus one playlist holding them all.
fn with_playlist(names: &[&str]) -> (MemoryStore, Vec<TrackId>, PlaylistId) {
    let store = MemoryStore::default();
    let ids: Vec<TrackId> = names
        .iter()
        .enumerate()
        .map(|(i, n)| add_track(&store, n, i as i64 + 1))
        .collect();
    let refs: Vec<&TrackId> = ids.iter().collect();
    let pid = add_playlist(&store, "mix", &refs, 1);
    (store, ids, pid)
}

#[test]
fn next_walks_playlist_and_stops_without_wrapping() {
    let (store, _ids, _pid) = with_playlist(&["A", "B", "C"]);
    let mut h = Harness::start(store);

    h.app.update(Msg::PlayPlaylist(0));
    assert_eq!(h.playing().as_deref(), Some("A"));

    h.app.update(Msg::Advance(Direction::Next));
    h.app.update(Msg::Advance(Direction::Next));
    assert_eq!(h.playing().as_deref(), Some("C"));
    assert_eq!(h.app.player_state(), PlayerState::Playing);

    h.app.update(Msg::Advance(Direction::Next));
    assert_eq!(h.playing().as_deref(), Some("C"));
    assert_eq!(h.app.player_state(), PlayerState::Paused);
    assert!(!h.sink.borrow().playing);
}

#[test]
fn prev_clamps_at_first_entry() {
    let (store, _ids, _pid) = with_playlist(&["A", "B"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(1));
    h.app.update(Msg::Advance(Direction::Prev));
    h.app.update(Msg::Advance(Direction::Prev));
    assert_eq!(h.playing().as_deref(), Some("A"));
    assert_eq!(h.app.player_state(), PlayerState::Playing);
}

#[test]
fn selecting_in_empty_library_leaves_no_cursor() {
    let mut h = Harness::start(MemoryStore::default());
    h.app.update(Msg::SelectLibraryRow(0));
    h.app.update(Msg::MoveLibraryCursor(1));
    assert_eq!(h.app.library_cursor().index(), None);
    assert_eq!(h.app.playlist_cursor().index(), None);
}

#[test]
fn seek_commit_moves_playback_to_ratio_of_duration() {
    let (store, _ids, _pid) = with_playlist(&["A"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));

    h.app.update(Msg::SeekBegin(0.5));
    assert!(h.app.is_seeking());
    h.app.update(Msg::SeekCommit);

    assert!(!h.app.is_seeking());
    assert_eq!(h.sink.borrow().seeks, vec![Duration::from_secs(100)]);
    h.app.update(Msg::Tick);
    assert_eq!(h.app.progress(), 0.5);
    assert_eq!(h.app.elapsed_text(), "1:40");
    assert_eq!(h.app.duration_text(), "3:20");

    // Releasing again does nothing.
    h.app.update(Msg::SeekCancel);
    assert_eq!(h.sink.borrow().seeks.len(), 1);
}

#[test]
fn ticks_during_drag_keep_the_dragged_ratio() {
    let (store, _ids, _pid) = with_playlist(&["A"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));
    h.app.update(Msg::SeekBegin(0.9));
    h.sink.borrow_mut().position = Duration::from_secs(20);
    h.app.update(Msg::Tick);
    assert_eq!(h.app.progress(), 0.9);

    h.app.update(Msg::SeekCancel);
    h.app.update(Msg::Tick);
    assert_eq!(h.sink.borrow().seeks, vec![Duration::from_secs(180)]);
    assert_eq!(h.app.progress(), 0.9);
}

#[test]
fn seek_without_track_is_ignored() {
    let mut h = Harness::start(MemoryStore::default());
    h.app.update(Msg::SeekBegin(0.5));
    h.app.update(Msg::SeekCommit);
    h.app.update(Msg::ScrubBy(5));
    assert!(h.sink.borrow().seeks.is_empty());
    assert_eq!(h.app.progress(), 0.0);
}

#[test]
fn stale_decode_result_is_not_shown() {
    let (store, ids, _pid) = with_playlist(&["T1", "T2"]);
    let mut h = Harness::start(store);

    h.app.update(Msg::PlayLibrary(0));
    h.app.update(Msg::PlayLibrary(1));
    let jobs = h.app.take_decode_jobs();
    assert_eq!(jobs.len(), 2);

    h.app.update(Msg::WaveformDecoded {
        track_id: ids[0].clone(),
        generation: jobs[0].generation,
        peaks: Some(vec![0.5; 4]),
    });
    assert!(h.app.peaks().is_none());
    assert!(h.app.waveform_cache().get(&ids[0]).is_some());

    h.app.update(Msg::WaveformDecoded {
        track_id: ids[1].clone(),
        generation: jobs[1].generation,
        peaks: Some(vec![0.25; 4]),
    });
    assert_eq!(h.app.peaks(), Some(&[0.25f32; 4][..]));

    // Back to T1: served from the cache, no new decode.
    h.app.update(Msg::PlayLibrary(0));
    assert_eq!(h.app.peaks(), Some(&[0.5f32; 4][..]));
    assert!(h.app.take_decode_jobs().is_empty());
}

#[test]
fn pending_decode_is_not_started_twice() {
    let (store, ids, _pid) = with_playlist(&["T1", "T2"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayLibrary(0));
    h.app.update(Msg::PlayLibrary(1));
    h.app.update(Msg::PlayLibrary(0));
    let jobs = h.app.take_decode_jobs();
    assert_eq!(jobs.len(), 2);
    assert!(h.app.waveform_pending());

    h.app.update(Msg::WaveformDecoded {
        track_id: ids[0].clone(),
        generation: jobs[0].generation,
        peaks: Some(vec![0.75; 2]),
    });
    assert!(!h.app.waveform_pending());
    assert_eq!(h.app.peaks(), Some(&[0.75f32; 2][..]));
}

#[test]
fn failed_decode_falls_back_to_flat_line() {
    let (store, ids, _pid) = with_playlist(&["T1"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayLibrary(0));
    let jobs = h.app.take_decode_jobs();
    h.app.update(Msg::WaveformDecoded {
        track_id: ids[0].clone(),
        generation: jobs[0].generation,
        peaks: None,
    });
    assert!(h.app.peaks().is_none());
    assert!(h.app.waveform_cache().is_empty());
}

#[test]
fn decode_from_before_an_import_never_answers_for_a_reused_id() {
    let (store, ids, _pid) = with_playlist(&["A"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayLibrary(0));
    let before = h.app.take_decode_jobs();
    assert_eq!(before.len(), 1);

    let path = h.dir.path().join("reuse.json");
    fs::write(
        &path,
        r#"{
            "version": 1,
            "playlists": [],
            "tracks": [{ "id": "A", "name": "A again", "createdAt": 1, "blobDataUrl": "data:audio/wav;base64,AAE=" }]
        }"#,
    )
    .unwrap();
    h.app.update(Msg::Import(path));

    h.app.update(Msg::PlayLibrary(0));
    let after = h.app.take_decode_jobs();
    assert_eq!(after.len(), 1);
    assert_ne!(after[0].generation, before[0].generation);

    // The worker is FIFO: the old result lands first.
    h.app.update(Msg::WaveformDecoded {
        track_id: ids[0].clone(),
        generation: before[0].generation,
        peaks: Some(vec![0.9; 4]),
    });
    assert!(h.app.peaks().is_none());
    assert!(h.app.waveform_cache().get(&ids[0]).is_none());
    assert!(h.app.waveform_pending());

    h.app.update(Msg::WaveformDecoded {
        track_id: ids[0].clone(),
        generation: after[0].generation,
        peaks: Some(vec![0.1; 4]),
    });
    assert_eq!(h.app.peaks(), Some(&[0.1f32; 4][..]));
    assert_eq!(
        h.app.waveform_cache().get(&ids[0]).as_deref(),
        Some(&[0.1f32; 4][..])
    );
}

#[test]
fn reorder_keeps_cursor_on_moved_track() {
    let (store, ids, pid) = with_playlist(&["a", "b", "c", "d", "e"]);
    let mut h = Harness::start(store);

    h.app.update(Msg::PlayPlaylist(1));
    h.app.update(Msg::SelectPlaylistRow(0));
    h.app.update(Msg::Reorder { from: 0, to: 3 });

    assert_eq!(h.app.playlist_cursor().index(), Some(3));
    assert_eq!(h.app.playing_index(), Some(0));
    let stored = h.store.playlist(&pid).track_ids;
    assert_eq!(
        stored,
        vec![
            ids[1].clone(),
            ids[2].clone(),
            ids[3].clone(),
            ids[0].clone(),
            ids[4].clone()
        ]
    );
    assert!(h.app.take_events().contains(&CoreEvent::PlaylistReordered {
        playlist: pid,
        from: 0,
        to: 3
    }));
}

#[test]
fn invalid_reorder_is_a_no_op() {
    let (store, ids, pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::Reorder { from: 1, to: 1 });
    h.app.update(Msg::Reorder { from: 0, to: 9 });
    assert_eq!(h.store.playlist(&pid).track_ids, ids);
}

#[test]
fn move_selected_shifts_row() {
    let (store, ids, pid) = with_playlist(&["a", "b", "c"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::SelectPlaylistRow(0));
    h.app.update(Msg::MoveSelected(1));
    assert_eq!(h.app.playlist_cursor().index(), Some(1));
    assert_eq!(h.store.playlist(&pid).track_ids[1], ids[0]);
    h.app.update(Msg::MoveSelected(-1));
    h.app.update(Msg::MoveSelected(-1));
    assert_eq!(h.store.playlist(&pid).track_ids, ids);
}

#[test]
fn playing_from_one_list_clears_the_other() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);

    h.app.update(Msg::PlayPlaylist(1));
    assert_eq!(h.app.playlist_cursor().index(), Some(1));
    assert_eq!(h.app.library_cursor().index(), None);

    h.app.update(Msg::PlayLibrary(0));
    assert_eq!(h.app.library_cursor().index(), Some(0));
    assert_eq!(h.app.playlist_cursor().index(), None);
    assert_eq!(h.app.playing_index(), None);
    assert_eq!(h.app.playing_library_index(), Some(0));
}

#[test]
fn only_one_handle_is_ever_live() {
    let (store, _ids, _pid) = with_playlist(&["a", "b", "c"]);
    let mut h = Harness::start(store);
    for i in [0, 1, 2, 1, 0] {
        h.app.update(Msg::PlayPlaylist(i));
        h.app.update(Msg::PlayLibrary(i));
    }
    let sink = h.sink.borrow();
    assert_eq!(sink.live.len(), 1);
    assert_eq!(sink.bound.len(), 10);
}

#[test]
fn space_plays_selection_or_toggles() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);

    // Cursor starts on the first row; nothing plays yet.
    assert_eq!(h.app.playlist_cursor().index(), Some(0));
    h.app.update(Msg::PlaySelected);
    assert_eq!(h.playing().as_deref(), Some("a"));

    h.app.update(Msg::PlaySelected);
    assert_eq!(h.app.player_state(), PlayerState::Paused);

    h.app.update(Msg::MovePlaylistCursor(1));
    h.app.update(Msg::PlaySelected);
    assert_eq!(h.playing().as_deref(), Some("b"));
    assert_eq!(h.app.player_state(), PlayerState::Playing);
}

#[test]
fn toggle_when_idle_starts_playlist() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::TogglePlay);
    assert_eq!(h.playing().as_deref(), Some("a"));
}

#[test]
fn natural_end_advances_then_pauses_at_last() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));

    h.sink.borrow_mut().finished = true;
    h.app.update(Msg::Tick);
    assert_eq!(h.playing().as_deref(), Some("b"));

    h.sink.borrow_mut().finished = true;
    h.app.update(Msg::Tick);
    assert_eq!(h.playing().as_deref(), Some("b"));
    assert_eq!(h.app.player_state(), PlayerState::Paused);
}

#[test]
fn library_track_ending_starts_playlist_from_top() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayLibrary(1));
    h.sink.borrow_mut().finished = true;
    h.app.update(Msg::Tick);
    assert_eq!(h.playing().as_deref(), Some("a"));
    assert_eq!(h.app.playing_index(), Some(0));
}

#[test]
fn dangling_ids_are_hidden_and_skipped() {
    let store = MemoryStore::default();
    let a = add_track(&store, "a", 1);
    let ghost = TrackId::new("ghost");
    let c = add_track(&store, "c", 3);
    add_playlist(&store, "mix", &[&a, &ghost, &c], 1);
    let mut h = Harness::start(store);

    let shown: Vec<usize> = h.app.playlist_entries().iter().map(|(i, _)| *i).collect();
    assert_eq!(shown, vec![0, 2]);

    h.app.update(Msg::PlayPlaylist(0));
    h.app.update(Msg::Advance(Direction::Next));
    assert_eq!(h.playing().as_deref(), Some("c"));
    assert_eq!(h.app.playing_index(), Some(2));

    h.app.update(Msg::SelectPlaylistRow(0));
    h.app.update(Msg::MovePlaylistCursor(1));
    assert_eq!(h.app.playlist_cursor().index(), Some(2));
}

#[test]
fn adding_twice_keeps_one_entry() {
    let store = MemoryStore::default();
    let a = add_track(&store, "a", 1);
    let pid = add_playlist(&store, "mix", &[], 1);
    let mut h = Harness::start(store);

    h.app.update(Msg::SelectLibraryRow(0));
    h.app.update(Msg::AddSelectedToPlaylist);
    h.app.update(Msg::AddSelectedToPlaylist);
    assert_eq!(h.store.playlist(&pid).track_ids, vec![a]);
}

#[test]
fn adding_without_playlist_asks_for_one() {
    let store = MemoryStore::default();
    add_track(&store, "a", 1);
    let mut h = Harness::start(store);
    h.app.update(Msg::AddSelectedToPlaylist);
    assert!(h.app.status().is_some());
}

#[test]
fn removing_the_playing_row_drops_playlist_position() {
    let (store, _ids, pid) = with_playlist(&["a", "b", "c"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(1));
    h.app.update(Msg::RemoveSelectedFromPlaylist);

    assert_eq!(h.store.playlist(&pid).track_ids.len(), 2);
    assert_eq!(h.playing().as_deref(), Some("b"));
    assert_eq!(h.app.playing_index(), None);
    assert_eq!(h.app.playlist_cursor().index(), Some(1));
}

#[test]
fn removing_an_earlier_row_shifts_playing_index() {
    let (store, _ids, _pid) = with_playlist(&["a", "b", "c"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(2));
    h.app.update(Msg::SelectPlaylistRow(0));
    h.app.update(Msg::RemoveSelectedFromPlaylist);
    assert_eq!(h.app.playing_index(), Some(1));
}

#[test]
fn deleting_playlist_with_current_track_stops_first() {
    let (store, _ids, pid) = with_playlist(&["a", "b"]);
    add_playlist(&store, "zz-other", &[], 2);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));

    h.app.update(Msg::DeleteActivePlaylist);
    assert_eq!(h.app.player_state(), PlayerState::Idle);
    assert!(h.sink.borrow().live.is_empty());
    assert!(h.app.peaks().is_none());
    assert!(h.app.playlists().iter().all(|p| p.id != pid));
    assert_eq!(h.app.active_playlist_id(), Some(&PlaylistId::new("zz-other")));
}

#[test]
fn deleting_track_cascades_to_playlists() {
    let (store, ids, pid) = with_playlist(&["a", "b"]);
    let other = add_playlist(&store, "other", &[&ids[0]], 2);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayLibrary(0));

    h.app.update(Msg::DeleteTrack(ids[0].clone()));
    assert_eq!(h.app.player_state(), PlayerState::Idle);
    assert_eq!(h.app.library().len(), 1);
    assert_eq!(h.store.playlist(&pid).track_ids, vec![ids[1].clone()]);
    assert!(h.store.playlist(&other).track_ids.is_empty());
}

#[test]
fn memo_edit_is_persisted_and_visible() {
    let (store, ids, _pid) = with_playlist(&["a"]);
    let mut h = Harness::start(store.clone());
    h.app.update(Msg::PlayPlaylist(0));
    h.app.update(Msg::SetMemo {
        track_id: ids[0].clone(),
        memo: "intro riff".into(),
    });
    assert_eq!(
        h.app.now_playing().map(|t| t.memo.as_str()),
        Some("intro riff")
    );
    assert_eq!(
        store.get_track_by_id(&ids[0]).unwrap().unwrap().memo,
        "intro riff"
    );
}

#[test]
fn memo_for_a_vanished_track_is_not_written_back() {
    let (store, ids, _pid) = with_playlist(&["a"]);
    let mut h = Harness::start(store.clone());
    store.0.borrow_mut().tracks.remove(&ids[0]);

    h.app.update(Msg::SetMemo {
        track_id: ids[0].clone(),
        memo: "ghost".into(),
    });
    assert!(store.get_track_by_id(&ids[0]).unwrap().is_none());
    assert!(h.app.library().is_empty());
}

#[test]
fn memo_edit_fails_cleanly_when_storage_is_down() {
    let (store, ids, _pid) = with_playlist(&["a"]);
    let mut h = Harness::start(store.clone());
    store.set_failing(true);
    h.app.update(Msg::SetMemo {
        track_id: ids[0].clone(),
        memo: "lost".into(),
    });
    assert_eq!(h.app.track(&ids[0]).map(|t| t.memo.as_str()), Some(""));
    assert!(h.app.status().unwrap().contains("storage unavailable"));
}

#[test]
fn move_selected_steps_over_hidden_entries() {
    let store = MemoryStore::default();
    let a = add_track(&store, "a", 1);
    let ghost = TrackId::new("ghost");
    let c = add_track(&store, "c", 3);
    let pid = add_playlist(&store, "mix", &[&a, &ghost, &c], 1);
    let mut h = Harness::start(store.clone());

    h.app.update(Msg::SelectPlaylistRow(0));
    h.app.update(Msg::MoveSelected(1));
    assert_eq!(
        store.playlist(&pid).track_ids,
        vec![ghost.clone(), c.clone(), a.clone()]
    );
    assert_eq!(h.app.playlist_cursor().index(), Some(2));

    h.app.update(Msg::MoveSelected(-1));
    assert_eq!(
        store.playlist(&pid).track_ids,
        vec![ghost.clone(), a.clone(), c.clone()]
    );
    assert_eq!(h.app.playlist_cursor().index(), Some(1));

    // Only the hidden entry is above: nothing visible to swap with.
    h.app.update(Msg::MoveSelected(-1));
    assert_eq!(store.playlist(&pid).track_ids, vec![ghost, a, c]);
    assert_eq!(h.app.playlist_cursor().index(), Some(1));
}

#[test]
fn create_playlist_becomes_active_and_ignores_blank_names() {
    let mut h = Harness::start(MemoryStore::default());
    h.app.update(Msg::CreatePlaylist("   ".into()));
    assert!(h.app.playlists().is_empty());

    h.app.update(Msg::CreatePlaylist(" road trip ".into()));
    let active = h.app.active_playlist().expect("active playlist");
    assert_eq!(active.name, "road trip");
}

#[test]
fn cycling_playlists_wraps_in_creation_order() {
    let store = MemoryStore::default();
    let first = add_playlist(&store, "one", &[], 1);
    let second = add_playlist(&store, "two", &[], 2);
    let mut h = Harness::start(store);
    assert_eq!(h.app.active_playlist_id(), Some(&first));
    h.app.update(Msg::CyclePlaylist(1));
    assert_eq!(h.app.active_playlist_id(), Some(&second));
    h.app.update(Msg::CyclePlaylist(1));
    assert_eq!(h.app.active_playlist_id(), Some(&first));
    h.app.update(Msg::CyclePlaylist(-1));
    assert_eq!(h.app.active_playlist_id(), Some(&second));
}

#[test]
fn storage_failure_yields_empty_lists_and_status() {
    let store = MemoryStore::default();
    add_track(&store, "a", 1);
    store.set_failing(true);
    let h = Harness::start(store);
    assert!(h.app.library().is_empty());
    assert!(h.app.status().unwrap().contains("storage unavailable"));
}

#[test]
fn storage_failure_while_playing_keeps_state_consistent() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store.clone());
    h.app.update(Msg::PlayPlaylist(0));
    store.set_failing(true);

    h.app.update(Msg::Advance(Direction::Next));
    assert_eq!(h.playing().as_deref(), Some("a"));
    assert_eq!(h.app.player_state(), PlayerState::Paused);
    assert!(h.app.status().is_some());
}

#[test]
fn volume_is_clamped_and_remembered() {
    let mut h = Harness::start(MemoryStore::default());
    h.app.update(Msg::SetVolume(3.0));
    assert_eq!(h.app.volume(), 1.0);
    h.app.update(Msg::SetVolume(0.3));
    h.app.update(Msg::SetVolume(f32::NAN));
    assert_eq!(h.sink.borrow().volume, 0.3);

    let Harness { store, dir, .. } = h;
    let h = Harness::start_in(store, dir);
    assert_eq!(h.app.volume(), 0.3);
    assert_eq!(h.sink.borrow().volume, 0.3);
}

#[test]
fn active_playlist_is_remembered() {
    let store = MemoryStore::default();
    add_playlist(&store, "one", &[], 1);
    let second = add_playlist(&store, "two", &[], 2);
    let mut h = Harness::start(store);
    h.app.update(Msg::ActivatePlaylist(second.clone()));

    let Harness { store, dir, .. } = h;
    let h = Harness::start_in(store, dir);
    assert_eq!(h.app.active_playlist_id(), Some(&second));
}

#[test]
fn import_drops_unknown_ids_and_resets_playback() {
    let (store, _ids, _pid) = with_playlist(&["old"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));
    let jobs = h.app.take_decode_jobs();
    h.app.update(Msg::WaveformDecoded {
        track_id: TrackId::new("old"),
        generation: jobs[0].generation,
        peaks: Some(vec![0.1]),
    });

    let path = h.dir.path().join("import.json");
    fs::write(
        &path,
        r#"{
            "version": 1,
            "activePlaylistId": "p1",
            "playlists": [{ "id": "p1", "name": "mix", "trackIds": ["A", "X"], "createdAt": 1 }],
            "tracks": [{ "id": "A", "name": "a", "createdAt": 1, "blobDataUrl": "data:audio/wav;base64,AAE=" }]
        }"#,
    )
    .unwrap();
    h.app.update(Msg::Import(path));

    assert_eq!(h.app.player_state(), PlayerState::Idle);
    assert!(h.sink.borrow().live.is_empty());
    assert!(h.app.waveform_cache().is_empty());
    assert!(h.app.peaks().is_none());
    assert_eq!(h.app.active_playlist_id(), Some(&PlaylistId::new("p1")));
    assert_eq!(
        h.app.active_playlist().unwrap().track_ids,
        vec![TrackId::new("A")]
    );
    assert_eq!(h.app.library().len(), 1);
}

#[test]
fn invalid_import_changes_nothing() {
    let (store, _ids, _pid) = with_playlist(&["a"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));

    let path = h.dir.path().join("bad.json");
    fs::write(&path, r#"{ "tracks": [] }"#).unwrap();
    h.app.update(Msg::Import(path));

    assert_eq!(h.app.player_state(), PlayerState::Playing);
    assert_eq!(h.app.library().len(), 1);
    assert!(h.app.status().unwrap().starts_with("import failed"));
}

#[test]
fn export_writes_every_track() {
    let (store, _ids, _pid) = with_playlist(&["a", "b"]);
    let mut h = Harness::start(store);
    let path = h.dir.path().join("out.json");
    h.app.update(Msg::Export(path.clone()));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["tracks"].as_array().unwrap().len(), 2);
    assert_eq!(json["activePlaylistId"], "mix");
}

#[test]
fn ingest_adds_files_to_library() {
    let mut h = Harness::start(MemoryStore::default());
    let music = h.dir.path().join("music");
    fs::create_dir_all(&music).unwrap();
    fs::write(music.join("01 first.mp3"), b"x").unwrap();
    fs::write(music.join("notes.txt"), b"x").unwrap();

    h.app.update(Msg::Ingest(vec![music]));
    let names: Vec<&str> = h.app.library().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["01 first"]);
    assert_eq!(h.app.library_cursor().index(), Some(0));
}

#[test]
fn track_selected_event_carries_origin() {
    let (store, ids, pid) = with_playlist(&["a"]);
    let mut h = Harness::start(store);
    h.app.update(Msg::PlayPlaylist(0));
    let events = h.app.take_events();
    assert!(events.contains(&CoreEvent::TrackSelected {
        track_id: ids[0].clone(),
        origin: Origin::Playlist {
            playlist: pid,
            index: 0
        },
    }));
    assert!(events.contains(&CoreEvent::PlaybackStateChanged(PlayerState::Playing)));
}
