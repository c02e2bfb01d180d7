//! Seek/progress controller.
//!
//! Maps the playback position reported by the sink onto a progress ratio in
//! `[0, 1]`, and owns the transient drag gesture that temporarily overrides it.

use std::time::Duration;

/// Progress state for the currently loaded track.
#[derive(Debug, Clone, Default)]
pub struct SeekController {
    duration: Option<f64>,
    position: f64,
    is_seeking: bool,
    seek_ratio: f64,
    progress: f64,
}

fn clamp_ratio(r: f64) -> f64 {
    if r.is_nan() { 0.0 } else { r.clamp(0.0, 1.0) }
}

fn usable(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

impl SeekController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything about the previous track.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a playback position update. Ignored while a gesture is active.
    pub fn on_tick(&mut self, position: Duration, duration: Option<Duration>) {
        if self.is_seeking {
            return;
        }
        self.duration = duration.map(|d| d.as_secs_f64());
        self.position = position.as_secs_f64();
        self.progress = match usable(self.duration) {
            Some(d) => clamp_ratio(self.position / d),
            None => 0.0,
        };
        self.seek_ratio = self.progress;
    }

    /// Start a drag at `ratio`. Does nothing until a duration is known.
    pub fn begin_seek(&mut self, ratio: f64) {
        if usable(self.duration).is_none() {
            return;
        }
        self.is_seeking = true;
        self.seek_ratio = clamp_ratio(ratio);
    }

    pub fn update_seek(&mut self, ratio: f64) {
        if self.is_seeking {
            self.seek_ratio = clamp_ratio(ratio);
        }
    }

    /// End the gesture and return the position to apply to the sink.
    ///
    /// Returns `None` when no gesture was active, so a second call (or a
    /// cancel after a commit) changes nothing.
    pub fn commit_seek(&mut self) -> Option<Duration> {
        if !self.is_seeking {
            return None;
        }
        self.is_seeking = false;
        let duration = usable(self.duration)?;
        let target = self.seek_ratio * duration;
        self.position = target;
        self.progress = self.seek_ratio;
        Some(Duration::from_secs_f64(target))
    }

    /// Gesture cancellation behaves like a release.
    pub fn cancel_seek(&mut self) -> Option<Duration> {
        self.commit_seek()
    }

    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    pub fn seek_ratio(&self) -> f64 {
        self.seek_ratio
    }

    /// What the waveform should show: the drag ratio while seeking.
    pub fn display_ratio(&self) -> f64 {
        if self.is_seeking {
            self.seek_ratio
        } else {
            self.progress
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        usable(self.duration).map(Duration::from_secs_f64)
    }

    pub fn elapsed_text(&self) -> String {
        match usable(self.duration) {
            Some(d) => format_time(self.display_ratio() * d),
            None => format_time(0.0),
        }
    }

    pub fn duration_text(&self) -> String {
        format_time(self.duration.unwrap_or(f64::NAN))
    }
}

/// `m:ss`, with non-finite or negative input shown as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
