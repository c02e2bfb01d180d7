//! Settings for playback, the waveform panel, ingestion and storage.
//!
//! [`Settings::load`] merges `config.toml` with `SONATA__*` environment
//! overrides on top of the struct defaults.

mod load;
mod schema;

pub use schema::*;
