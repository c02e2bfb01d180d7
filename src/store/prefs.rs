use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::library::PlaylistId;

use super::{Result, StoreError};

/// Small user preferences that survive restarts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefs {
    pub active_playlist_id: Option<PlaylistId>,
    pub volume: Option<f32>,
}

/// `prefs.toml` inside the data directory.
pub struct PrefsFile {
    path: PathBuf,
}

impl PrefsFile {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("prefs.toml"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the preferences. A missing or malformed file yields defaults.
    pub fn load(&self) -> Prefs {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Prefs::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read prefs");
                return Prefs::default();
            }
        };
        toml::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring malformed prefs");
            Prefs::default()
        })
    }

    pub fn save(&self, prefs: &Prefs) -> Result<()> {
        // Serializing a flat struct of options cannot fail.
        let text = toml::to_string(prefs).unwrap_or_default();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
