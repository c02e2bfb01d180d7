//! Playback controller.
//!
//! A small state machine over a single [`PlaybackSink`]. The controller
//! issues a fresh [`HandleId`] for every load and always releases the
//! previous one first, so the sink never holds more than one live asset.

mod advance;
mod controller;
mod sink;

pub use advance::{Advance, Direction, plan_advance};
pub use controller::{Origin, PlaybackController, PlayerState, Session, Toggle};
pub use sink::{HandleId, PlaybackSink};
