use std::path::PathBuf;
use std::time::Duration;

use crate::library::{PlaylistId, TrackId};
use crate::playback::{Direction, Origin, PlayerState};

/// Everything that can change application state. The runtime turns input,
/// timer ticks, MPRIS calls and worker results into these.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Poll the sink for position, end of track and errors.
    Tick,

    /// Play library row `index` ad hoc.
    PlayLibrary(usize),
    /// Play entry `index` of the active playlist.
    PlayPlaylist(usize),
    /// Play the playlist selection if it is not already playing, else toggle.
    PlaySelected,
    TogglePlay,
    Play,
    Pause,
    Stop,
    Advance(Direction),

    SeekBegin(f64),
    SeekUpdate(f64),
    SeekCommit,
    SeekCancel,
    /// Jump to an absolute position.
    SeekTo(Duration),
    /// Jump relative to the current position, in seconds.
    ScrubBy(i64),

    MovePlaylistCursor(isize),
    MoveLibraryCursor(isize),
    SelectPlaylistRow(usize),
    SelectLibraryRow(usize),
    /// Move a playlist entry (indices before removal).
    Reorder { from: usize, to: usize },
    /// Move the selected playlist entry up or down.
    MoveSelected(isize),

    /// A background decode finished. `generation` is the cache generation
    /// the job was requested in.
    WaveformDecoded {
        track_id: TrackId,
        generation: u64,
        peaks: Option<Vec<f32>>,
    },

    AddSelectedToPlaylist,
    RemoveSelectedFromPlaylist,
    SetMemo { track_id: TrackId, memo: String },
    DeleteTrack(TrackId),
    Ingest(Vec<PathBuf>),

    CreatePlaylist(String),
    DeleteActivePlaylist,
    ActivatePlaylist(PlaylistId),
    /// Step through playlists in creation order.
    CyclePlaylist(isize),

    Import(PathBuf),
    Export(PathBuf),

    SetVolume(f32),
    AdjustVolume(f32),
    Reload,
}

/// Notifications for observers (MPRIS, logging). Drained by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    TrackSelected { track_id: TrackId, origin: Origin },
    PlaylistReordered { playlist: PlaylistId, from: usize, to: usize },
    SeekBegan(f64),
    SeekUpdated(f64),
    SeekCommitted(Duration),
    PlaybackStateChanged(PlayerState),
    VolumeChanged(f32),
    LibraryReloaded,
}
