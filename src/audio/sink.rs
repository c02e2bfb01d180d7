//! Building `rodio` sinks from in-memory payloads.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

/// Create a paused `Sink` for `payload` that starts at `start_at`, together
/// with the length the decoder reports (if it knows one).
pub(super) fn create_sink_at(
    stream: &OutputStream,
    payload: &Arc<[u8]>,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), DecoderError> {
    let source = Decoder::new(Cursor::new(payload.clone()))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}
