//! Two-way binding between playback and the occurrence list.
//!
//! Playback drives the list only while playing; the list drives playback only
//! while stopped. The two directions are never active at the same time, so a
//! scroll caused by playback cannot seek playback back.

use catalog::Occurrence;
use foundation::Timestamp;

use crate::driver::DriverState;
use crate::time_scale::{PlaybackPosition, TimeScale};

/// Number of occurrences with `timestamp <= ts`; equivalently the index of
/// the first occurrence strictly after `ts`. `occurrences` must be sorted.
pub fn scroll_row_for(occurrences: &[Occurrence], ts: Timestamp) -> usize {
    occurrences.partition_point(|o| o.timestamp <= ts)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollSync {
    row: Option<usize>,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row the list was last asked to scroll to.
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// Forgets the scroll row, e.g. when the list content changes.
    pub fn reset(&mut self) {
        self.row = None;
    }

    /// Playback → list. Returns the row to scroll to, or `None` when stopped
    /// or when there is nothing to scroll.
    pub fn follow_playback(
        &mut self,
        occurrences: &[Occurrence],
        state: DriverState,
        scale: &TimeScale,
        position: PlaybackPosition,
    ) -> Option<usize> {
        if state != DriverState::Playing || occurrences.is_empty() {
            return None;
        }
        let row = scroll_row_for(occurrences, scale.inverse(position));
        self.row = Some(row);
        Some(row)
    }

    /// List → playback. Returns the position to seek to for a manual scroll
    /// whose topmost visible row is `top_row`, or `None` while playing, for an
    /// empty list, or for a row past the end.
    pub fn follow_list(
        &self,
        occurrences: &[Occurrence],
        state: DriverState,
        scale: &TimeScale,
        top_row: usize,
    ) -> Option<PlaybackPosition> {
        if state != DriverState::Stopped {
            return None;
        }
        let occurrence = occurrences.get(top_row)?;
        Some(scale.forward(occurrence.timestamp))
    }
}
