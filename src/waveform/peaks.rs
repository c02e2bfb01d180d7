use std::io::Cursor;

use rodio::{Decoder, Source};
use thiserror::Error;

/// The payload could not be turned into samples.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported or corrupt audio: {0}")]
    Format(#[from] rodio::decoder::DecoderError),

    #[error("no samples decoded")]
    Empty,
}

/// Decode `payload` and keep only the first channel.
pub fn decode_first_channel(payload: Vec<u8>) -> Result<Vec<f32>, DecodeError> {
    let source = Decoder::new(Cursor::new(payload))?;
    let channels = usize::from(u16::from(source.channels())).max(1);

    let samples: Vec<f32> = source.step_by(channels).collect();
    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(samples)
}

/// Reduce `samples` to `count` amplitude values in `[0, 1]`.
///
/// Every block is `samples.len() / count` long; samples past
/// `count * block` are not looked at. When there are fewer samples than
/// `count` every block is empty and reads as 0.
pub fn extract_peaks(samples: &[f32], count: usize) -> Vec<f32> {
    let block = if count == 0 { 0 } else { samples.len() / count };

    (0..count)
        .map(|i| {
            let start = i * block;
            samples[start..start + block]
                .iter()
                .fold(0.0f32, |acc, s| {
                    let a = s.abs();
                    if a > acc { a } else { acc }
                })
                .min(1.0)
        })
        .collect()
}

/// Decode and extract in one step, as the worker does.
pub fn peaks_for(payload: Vec<u8>, count: usize) -> Result<Vec<f32>, DecodeError> {
    let samples = decode_first_channel(payload)?;
    Ok(extract_peaks(&samples, count))
}
