use catalog::Selection;
use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// Playback tuning. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Length of the playback range; positions live in `[0, scale_range]`.
    pub scale_range: u32,
    /// Positions advanced per frame while all voyages are shown.
    pub speed_all: u32,
    /// Positions advanced per frame while a single voyage is shown.
    pub speed_selected: u32,
    /// Granularity of the slider widget.
    pub slider_step: u32,
    /// Lead-in applied when dataset bounds are derived from the tracks.
    pub lead_in_months: u32,
}

impl PlaybackConfig {
    pub const DEFAULT_SCALE_RANGE: u32 = 5000;

    pub fn from_json_str(raw: &str) -> Result<Self, PlaybackError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, PlaybackError> {
        if self.scale_range == 0 {
            return Err(PlaybackError::InvalidConfig(
                "scale_range must be positive".to_string(),
            ));
        }
        if self.speed_all == 0 || self.speed_selected == 0 {
            return Err(PlaybackError::InvalidConfig(
                "speed_all and speed_selected must be positive".to_string(),
            ));
        }
        if self.slider_step == 0 || self.slider_step > self.scale_range {
            return Err(PlaybackError::InvalidConfig(format!(
                "slider_step must be in 1..={}",
                self.scale_range
            )));
        }
        Ok(self)
    }

    pub fn speed_for(&self, selection: Selection) -> u32 {
        match selection {
            Selection::All => self.speed_all,
            Selection::Voyage(_) => self.speed_selected,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            scale_range: Self::DEFAULT_SCALE_RANGE,
            speed_all: 1,
            speed_selected: 2,
            slider_step: 10,
            lead_in_months: catalog::DEFAULT_LEAD_IN_MONTHS,
        }
    }
}
