use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::library::TrackId;

/// Peaks shared between the cache and the current display.
pub type Peaks = Arc<[f32]>;

/// Outcome of asking the cache for a track's peaks.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Already computed.
    Hit(Peaks),
    /// Nothing cached and nothing pending; the caller must start a decode.
    Started,
    /// A decode for this id is already running; wait for its result.
    Pending,
}

/// What [`WaveformCache::finish`] did with a decode result.
#[derive(Debug, Clone, PartialEq)]
pub enum Finish {
    Stored(Peaks),
    /// The decode failed; nothing was cached.
    Failed,
    /// The result was requested before the last [`clear`](WaveformCache::clear)
    /// and was dropped.
    Stale,
}

/// Per-track peak memo with at most one decode in flight per id.
///
/// Entries are never replaced or evicted one by one; only [`clear`](Self::clear)
/// empties the cache. Every decode is tagged with the generation it was
/// requested in, and `clear` starts a new generation, so a result computed
/// from data that has since been replaced can never be stored, even when
/// the same id is requested again.
#[derive(Debug, Default)]
pub struct WaveformCache {
    entries: HashMap<TrackId, Peaks>,
    in_flight: HashSet<TrackId>,
    generation: u64,
}

impl WaveformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TrackId) -> Option<Peaks> {
        self.entries.get(id).cloned()
    }

    pub fn is_pending(&self, id: &TrackId) -> bool {
        self.in_flight.contains(id)
    }

    /// Tag for decodes started now.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up `id`, marking it in flight when the caller has to decode.
    pub fn request(&mut self, id: &TrackId) -> Lookup {
        if let Some(peaks) = self.get(id) {
            return Lookup::Hit(peaks);
        }
        if self.in_flight.insert(id.clone()) {
            Lookup::Started
        } else {
            Lookup::Pending
        }
    }

    /// Record the outcome of a decode started by [`request`](Self::request)
    /// in `generation`. Failures clear the in-flight marker without caching
    /// anything, so a later request may try again.
    pub fn finish(&mut self, id: &TrackId, generation: u64, peaks: Option<Vec<f32>>) -> Finish {
        if generation != self.generation || !self.in_flight.remove(id) {
            return Finish::Stale;
        }
        let Some(peaks) = peaks else {
            return Finish::Failed;
        };
        let entry = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| Peaks::from(peaks));
        Finish::Stored(entry.clone())
    }

    /// Synchronous cache-or-compute. `decode` runs only on a miss and only
    /// when no other decode for `id` is pending.
    pub fn compute<F>(&mut self, id: &TrackId, decode: F) -> Option<Peaks>
    where
        F: FnOnce() -> Option<Vec<f32>>,
    {
        match self.request(id) {
            Lookup::Hit(peaks) => Some(peaks),
            Lookup::Pending => None,
            Lookup::Started => {
                let generation = self.generation;
                match self.finish(id, generation, decode()) {
                    Finish::Stored(peaks) => Some(peaks),
                    Finish::Failed | Finish::Stale => None,
                }
            }
        }
    }

    /// Drop every entry and forget pending decodes. Results of decodes
    /// started before this call are rejected by [`finish`](Self::finish).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
