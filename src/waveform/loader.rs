//! Background decode worker.
//!
//! Decoding a whole file can take a while, so it never runs on the event
//! loop. Jobs go in over one channel, results come back over another, and the
//! event loop polls for them between input events.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::library::TrackId;

use super::peaks::{DecodeError, peaks_for};

/// A request to compute peaks for one track.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub track_id: TrackId,
    /// Cache generation the job was requested in.
    pub generation: u64,
    pub payload: Vec<u8>,
    pub peak_count: usize,
}

/// Finished decode, successful or not.
#[derive(Debug)]
pub struct DecodeResult {
    pub track_id: TrackId,
    pub generation: u64,
    pub result: Result<Vec<f32>, DecodeError>,
}

pub struct WaveformLoader {
    jobs: Option<Sender<DecodeJob>>,
    results: Receiver<DecodeResult>,
    join: Option<JoinHandle<()>>,
}

fn run_job(job: DecodeJob) -> DecodeResult {
    let result = peaks_for(job.payload, job.peak_count);
    match &result {
        Ok(_) => debug!(track = %job.track_id, "waveform decoded"),
        Err(e) => warn!(track = %job.track_id, error = %e, "waveform decode failed"),
    }
    DecodeResult {
        track_id: job.track_id,
        generation: job.generation,
        result,
    }
}

impl WaveformLoader {
    pub fn spawn() -> Self {
        let (job_tx, job_rx) = mpsc::channel::<DecodeJob>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();

        let join = thread::Builder::new()
            .name("waveform".into())
            .spawn(move || {
                for job in job_rx {
                    if result_tx.send(run_job(job)).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| warn!(error = %e, "cannot spawn waveform worker"))
            .ok();

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            join,
        }
    }

    /// Queue a job. Returns `false` if the worker is gone.
    pub fn submit(&self, job: DecodeJob) -> bool {
        match &self.jobs {
            Some(tx) if self.join.is_some() => tx.send(job).is_ok(),
            _ => false,
        }
    }

    /// Every result that is ready right now.
    pub fn drain(&self) -> Vec<DecodeResult> {
        self.results.try_iter().collect()
    }
}

impl Drop for WaveformLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
