//! Audio output.
//!
//! A dedicated thread owns the `rodio` output stream and at most one `Sink`.
//! [`AudioPlayer`] is the handle the rest of the program holds.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;

#[cfg(test)]
mod tests;
