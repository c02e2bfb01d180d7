//! Waveform data: peak extraction, the per-track cache, the background
//! decode worker and the pure layout used by the renderer.

mod cache;
mod loader;
mod peaks;
mod render;

pub use cache::{Finish, Lookup, Peaks, WaveformCache};
pub use loader::{DecodeJob, DecodeResult, WaveformLoader};
pub use peaks::{DecodeError, decode_first_channel, extract_peaks, peaks_for};
pub use render::{Scene, Shape, Surface, pointer_ratio, render};
