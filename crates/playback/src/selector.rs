use catalog::{Dataset, Selection};
use foundation::TimeRange;
use tracing::info;

use crate::error::PlaybackError;
use crate::time_scale::TimeScale;

/// Active selection and the time scale derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct VoyageSelector {
    selection: Selection,
    scale: TimeScale,
}

impl VoyageSelector {
    /// Starts with every voyage shown.
    pub fn new(dataset: &Dataset, scale_range: u32) -> Self {
        Self {
            selection: Selection::All,
            scale: TimeScale::new(dataset.metadata().time_range(), scale_range),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn time_range(&self) -> TimeRange {
        self.scale.domain()
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.scale
    }

    /// Switches to `selection` and rebuilds the time scale.
    ///
    /// Returns `Ok(false)` when `selection` is already active; nothing is
    /// rebuilt in that case. Unknown voyages are rejected without changing
    /// state.
    pub fn select(&mut self, dataset: &Dataset, selection: Selection) -> Result<bool, PlaybackError> {
        let range = dataset
            .time_range_for(selection)
            .ok_or(PlaybackError::UnknownSelection(selection))?;
        if selection == self.selection {
            return Ok(false);
        }

        self.selection = selection;
        self.scale = TimeScale::new(range, self.scale.scale_range());
        info!(
            ?selection,
            min = range.min().0,
            max = range.max().0,
            "selection changed"
        );
        Ok(true)
    }
}
