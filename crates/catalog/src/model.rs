use foundation::calendar;
use foundation::{TimeRange, Timestamp, VoyageId};
use serde::Serialize;

use crate::palette::Rgb;

/// One sample of a voyage track.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoyageMetadata {
    /// Key used by the export pipeline, e.g. `beagle`.
    pub vessel: String,
    pub vessel_name: String,
    pub year_from: i32,
    pub year_to: i32,
    pub occurrence_count: usize,
    pub color: Rgb,
}

/// A historical route. Coordinates are ordered by timestamp and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Voyage {
    id: VoyageId,
    coordinates: Vec<Coordinate>,
    metadata: VoyageMetadata,
}

impl Voyage {
    pub(crate) fn new(id: VoyageId, coordinates: Vec<Coordinate>, metadata: VoyageMetadata) -> Self {
        debug_assert!(!coordinates.is_empty());
        Self {
            id,
            coordinates,
            metadata,
        }
    }

    pub fn id(&self) -> VoyageId {
        self.id
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn metadata(&self) -> &VoyageMetadata {
        &self.metadata
    }

    /// Track extent: first and last sample, not min/max over the track.
    pub fn time_range(&self) -> TimeRange {
        let first = self.coordinates.first().map(|c| c.timestamp);
        let last = self.coordinates.last().map(|c| c.timestamp);
        match (first, last) {
            (Some(first), Some(last)) => TimeRange::new(first, last),
            _ => TimeRange::instant(Timestamp::default()),
        }
    }

    /// `[lon, lat]` pairs for path renderers.
    pub fn path(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.coordinates.iter().map(|c| [c.lon, c.lat])
    }

    /// Selector entry text, e.g. `HMS Beagle 1831-1836`.
    pub fn option_label(&self) -> String {
        format!(
            "{} {}-{}",
            self.metadata.vessel_name, self.metadata.year_from, self.metadata.year_to
        )
    }
}

pub const OCCURRENCE_RECORD_BASE_URL: &str = "https://gbif.org/occurrence/";

/// A specimen-collection record tied to a voyage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub timestamp: Timestamp,
    pub record_id: String,
    pub label: String,
}

impl Occurrence {
    pub fn record_url(&self) -> String {
        format!("{OCCURRENCE_RECORD_BASE_URL}{}", self.record_id)
    }

    /// e.g. `3rd March 1832`
    pub fn date_label(&self) -> Option<String> {
        calendar::ordinal_date(self.timestamp)
    }
}

/// Whole-dataset bounds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub min_timestamp: Timestamp,
    pub max_timestamp: Timestamp,
}

impl DatasetMetadata {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.min_timestamp, self.max_timestamp)
    }

    /// First and last calendar year covered.
    pub fn years(&self) -> Option<(i32, i32)> {
        Some((
            calendar::year_of(self.min_timestamp)?,
            calendar::year_of(self.max_timestamp)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voyage(timestamps: &[f64]) -> Voyage {
        Voyage::new(
            VoyageId::new(0),
            timestamps
                .iter()
                .map(|t| Coordinate {
                    lon: 0.0,
                    lat: 0.0,
                    timestamp: Timestamp(*t),
                })
                .collect(),
            VoyageMetadata {
                vessel: "beagle".to_string(),
                vessel_name: "HMS Beagle".to_string(),
                year_from: 1831,
                year_to: 1836,
                occurrence_count: 0,
                color: Rgb { r: 0, g: 0, b: 0 },
            },
        )
    }

    #[test]
    fn time_range_uses_first_and_last_sample() {
        let v = voyage(&[10.0, 5.0, 30.0]);
        assert_eq!(v.time_range(), TimeRange::new(Timestamp(10.0), Timestamp(30.0)));
    }

    #[test]
    fn option_label_includes_years() {
        assert_eq!(voyage(&[0.0]).option_label(), "HMS Beagle 1831-1836");
    }

    #[test]
    fn occurrence_presentation() {
        let occ = Occurrence {
            timestamp: Timestamp(0.0),
            record_id: "42".to_string(),
            label: "Fucus".to_string(),
        };
        assert_eq!(occ.record_url(), "https://gbif.org/occurrence/42");
        assert_eq!(occ.date_label().as_deref(), Some("1st January 1970"));
    }
}
