//! Whole-library JSON export and import.
//!
//! The file format is a single JSON document holding every playlist and every
//! track, with each track's audio embedded as a base64 `data:` URL.

mod export;
mod format;
mod import;

pub use export::{export_library, write_export};
pub use format::{ExportFile, ExportPlaylist, ExportTrack, decode_data_url, encode_data_url};
pub use import::{ImportPlan, ImportSummary, apply_import, parse_import, read_import};

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a library export: {0}")]
    Format(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
