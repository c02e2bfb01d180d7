//! Application session.
//!
//! [`App`] owns the library view, both selection cursors, the playback and
//! seek controllers and the displayed waveform. All of it changes only
//! through [`App::update`].

mod model;
mod msg;
mod update;

pub use model::{App, WaveformView};
pub use msg::{CoreEvent, Msg};
pub use update::VOLUME_STEP;

#[cfg(test)]
mod tests;
