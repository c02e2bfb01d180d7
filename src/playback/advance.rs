#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// What `advance` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Load and play the entry at this index.
    Play(usize),
    /// Ran off the end: pause and keep the current track.
    Stop,
    /// Nothing to do.
    Stay,
}

/// Pick the next playlist entry.
///
/// `current` is the index of the playing entry inside the playlist, if
/// playback came from it. Without one, both directions start at the first
/// entry. `Next` never wraps; `Prev` clamps at the first entry. Entries for
/// which `playable` is false (dangling ids) are skipped in the direction of
/// travel.
pub fn plan_advance<F>(len: usize, current: Option<usize>, dir: Direction, playable: F) -> Advance
where
    F: Fn(usize) -> bool,
{
    if len == 0 {
        return Advance::Stay;
    }

    match (current, dir) {
        (None, _) => (0..len)
            .find(|i| playable(*i))
            .map_or(Advance::Stay, Advance::Play),
        (Some(cur), Direction::Next) => (cur.saturating_add(1)..len)
            .find(|i| playable(*i))
            .map_or(Advance::Stop, Advance::Play),
        (Some(cur), Direction::Prev) => {
            let start = cur.saturating_sub(1).min(len - 1);
            (0..=start)
                .rev()
                .find(|i| playable(*i))
                .map_or(Advance::Stay, Advance::Play)
        }
    }
}
