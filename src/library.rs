//! Library records and ingestion.
//!
//! `Track` and `Playlist` are the persisted records; `scan` turns files on
//! disk into new tracks with their audio payload.

mod model;
mod scan;

pub use model::*;
pub use scan::{Ingested, collect_audio_paths, ingest};

#[cfg(test)]
mod tests;
