//! Selection cursors and playlist reordering.
//!
//! Two independent cursors exist (library and playlist). Each is either
//! `None` or a valid index into its list; every mutation of the list goes
//! through [`ListCursor::reconcile`] so the cursor never points past the end.

use crate::library::TrackId;

/// A selection cursor over one list, plus the scroll offset used to keep the
/// selected row visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCursor {
    index: Option<usize>,
    offset: usize,
    /// Set when the UI should bring the selection into view on next draw.
    reveal: bool,
}

impl ListCursor {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Select `index` clamped into `0..len`, or clear when the list is empty.
    pub fn set_selected(&mut self, index: usize, len: usize, scroll_into_view: bool) {
        if len == 0 {
            self.index = None;
            self.offset = 0;
            return;
        }
        self.index = Some(index.min(len - 1));
        if scroll_into_view {
            self.reveal = true;
        }
    }

    pub fn clear(&mut self) {
        self.index = None;
        self.reveal = false;
    }

    /// Move by `delta` rows without wrapping. With no selection, movement
    /// starts from `fallback` (or the first row).
    pub fn move_by(&mut self, delta: isize, len: usize, fallback: Option<usize>) {
        if len == 0 {
            self.index = None;
            return;
        }
        let base = self.index.or(fallback).unwrap_or(0) as isize;
        let target = (base + delta).clamp(0, len as isize - 1) as usize;
        self.set_selected(target, len, true);
    }

    /// Re-validate after the list changed length. An empty list clears the
    /// cursor; a missing or out-of-range cursor lands on `fallback` or 0.
    pub fn reconcile(&mut self, len: usize, fallback: Option<usize>) {
        if len == 0 {
            self.index = None;
            self.offset = 0;
            return;
        }
        match self.index {
            Some(i) if i < len => {}
            _ => {
                let target = fallback.filter(|f| *f < len).unwrap_or(0);
                self.index = Some(target);
            }
        }
        if self.offset >= len {
            self.offset = len - 1;
        }
    }

    /// Adjust the scroll offset so the selection is inside a window of
    /// `visible` rows. Called by the renderer.
    pub fn scroll_for(&mut self, visible: usize) -> usize {
        self.scroll_to_row(self.index, visible)
    }

    /// Like [`scroll_for`](Self::scroll_for) when rows on screen are not the
    /// list indices themselves (hidden entries); `row` is the selection's
    /// on-screen row.
    pub fn scroll_to_row(&mut self, row: Option<usize>, visible: usize) -> usize {
        let visible = visible.max(1);
        if let Some(i) = row {
            if i < self.offset {
                self.offset = i;
            } else if i >= self.offset + visible {
                self.offset = i + 1 - visible;
            }
        }
        self.reveal = false;
        self.offset
    }

    pub fn wants_reveal(&self) -> bool {
        self.reveal
    }
}

/// Move the entry at `from` to `to` (indices against the list before removal)
/// and keep `cursor` on the same track id it pointed at before.
///
/// Returns `false` without touching anything when `from == to` or either
/// index is out of range.
pub fn reorder(ids: &mut Vec<TrackId>, from: usize, to: usize, cursor: &mut ListCursor) -> bool {
    let len = ids.len();
    if from == to || from >= len || to >= len {
        return false;
    }

    let selected = cursor.index.and_then(|i| ids.get(i)).cloned();

    let moved = ids.remove(from);
    ids.insert(to, moved);

    if let Some(id) = selected {
        cursor.index = ids.iter().position(|t| *t == id);
        cursor.reveal = true;
    }
    true
}

/// Where the playing entry ends up after the same move, if it moved.
pub fn follow_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
