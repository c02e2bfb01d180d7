use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/sonata/config.toml` or `~/.config/sonata/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SONATA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub waveform: WaveformSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume used when no volume preference has been saved yet (0.0 - 1.0).
    pub default_volume: f32,
    /// How long the event loop waits for input before ticking playback (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveformSettings {
    /// Number of amplitude bars extracted per track.
    pub peak_count: usize,
    /// Fraction of each bar slot that is filled (the rest is the gap).
    pub bar_fill: f64,
    /// Color of the part of the waveform that has already played.
    pub played_color: String,
    /// Color of the part that has not played yet.
    pub unplayed_color: String,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            peak_count: 320,
            bar_fill: 0.7,
            played_color: "#ff5500".to_string(),
            unplayed_color: "#2a313d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Shown in place of an empty memo.
    pub memo_placeholder: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ sonata playlist studio ~ ".to_string(),
            memo_placeholder: "add a memo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio when ingesting (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks while walking directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where records, payloads, preferences and the log live.
    /// Defaults to `$XDG_DATA_HOME/sonata` or `~/.local/share/sonata`.
    pub data_dir: Option<PathBuf>,
}
