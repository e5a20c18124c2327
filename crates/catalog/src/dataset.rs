use foundation::calendar;
use foundation::{TimeRange, Timestamp, VoyageId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::model::{Coordinate, DatasetMetadata, Occurrence, Voyage, VoyageMetadata};
use crate::palette;
use crate::source::{DatasetSource, RawDataset, RawVoyage};
use crate::vessels::vessel_display_name;

/// Months added before the earliest sample when dataset bounds are derived
/// from the voyages.
pub const DEFAULT_LEAD_IN_MONTHS: u32 = 24;

/// Which voyages are on screen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "voyage", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Voyage(VoyageId),
}

impl Selection {
    pub fn voyage(self) -> Option<VoyageId> {
        match self {
            Selection::All => None,
            Selection::Voyage(id) => Some(id),
        }
    }

    pub fn is_voyage(self) -> bool {
        matches!(self, Selection::Voyage(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrepareOptions {
    pub lead_in_months: u32,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            lead_in_months: DEFAULT_LEAD_IN_MONTHS,
        }
    }
}

/// Validated, immutable dataset with all derived data (colours, display
/// names, bounds) computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    voyages: Vec<Voyage>,
    /// Indexed by `VoyageId::index()`; each list sorted by timestamp.
    occurrences: Vec<Vec<Occurrence>>,
    metadata: DatasetMetadata,
}

impl Dataset {
    pub fn load(source: &impl DatasetSource, options: PrepareOptions) -> Result<Self, DatasetError> {
        Self::prepare(source.load()?, options)
    }

    pub fn prepare(raw: RawDataset, options: PrepareOptions) -> Result<Self, DatasetError> {
        let RawDataset {
            voyages: raw_voyages,
            mut occurrences,
            metadata,
        } = raw;

        let colors = palette::assign_colors(raw_voyages.len());
        let mut voyages = Vec::with_capacity(raw_voyages.len());
        let mut voyage_occurrences = Vec::with_capacity(raw_voyages.len());

        for (idx, (raw_voyage, color)) in raw_voyages.into_iter().zip(colors).enumerate() {
            let id = VoyageId::new(idx as u32);
            let vessel = raw_voyage.metadata.vessel.clone();
            let occs = prepare_occurrences(&vessel, occurrences.remove(&vessel).unwrap_or_default())?;
            let voyage = prepare_voyage(id, raw_voyage, color, occs.len())?;
            debug!(
                vessel = %vessel,
                samples = voyage.coordinates().len(),
                occurrences = occs.len(),
                "prepared voyage"
            );
            voyages.push(voyage);
            voyage_occurrences.push(occs);
        }

        for vessel in occurrences.keys() {
            warn!(vessel = %vessel, "occurrences without a matching voyage were dropped");
        }

        let metadata = match metadata {
            Some(raw) => {
                let min = raw.min_timestamp.to_f64(|| "metadata.minTimestamp".to_string())?;
                let max = raw.max_timestamp.to_f64(|| "metadata.maxTimestamp".to_string())?;
                if min > max {
                    return Err(DatasetError::InvertedBounds { min, max });
                }
                DatasetMetadata {
                    min_timestamp: Timestamp(min),
                    max_timestamp: Timestamp(max),
                }
            }
            None => derive_metadata(&voyages, options.lead_in_months)?,
        };

        info!(
            voyages = voyages.len(),
            min = metadata.min_timestamp.0,
            max = metadata.max_timestamp.0,
            "dataset prepared"
        );

        Ok(Self {
            voyages,
            occurrences: voyage_occurrences,
            metadata,
        })
    }

    pub fn voyages(&self) -> &[Voyage] {
        &self.voyages
    }

    pub fn voyage(&self, id: VoyageId) -> Option<&Voyage> {
        self.voyages.get(id.index())
    }

    pub fn find_by_vessel(&self, vessel: &str) -> Option<&Voyage> {
        self.voyages.iter().find(|v| v.metadata().vessel == vessel)
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Occurrences of a voyage, ascending by timestamp. Empty for unknown ids.
    pub fn occurrences_for(&self, id: VoyageId) -> &[Occurrence] {
        self.occurrences
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Occurrence list shown for `selection`: none when all voyages are shown.
    pub fn occurrences_for_selection(&self, selection: Selection) -> &[Occurrence] {
        match selection {
            Selection::All => &[],
            Selection::Voyage(id) => self.occurrences_for(id),
        }
    }

    pub fn contains(&self, selection: Selection) -> bool {
        match selection {
            Selection::All => true,
            Selection::Voyage(id) => self.voyage(id).is_some(),
        }
    }

    /// Dataset bounds for `All`, track extent for a voyage; `None` for unknown
    /// voyages.
    pub fn time_range_for(&self, selection: Selection) -> Option<TimeRange> {
        match selection {
            Selection::All => Some(self.metadata.time_range()),
            Selection::Voyage(id) => self.voyage(id).map(Voyage::time_range),
        }
    }

    /// Voyages to draw for `selection`.
    pub fn visible_voyages(&self, selection: Selection) -> &[Voyage] {
        match selection {
            Selection::All => &self.voyages,
            Selection::Voyage(id) => {
                let idx = id.index();
                self.voyages.get(idx..=idx).unwrap_or(&[])
            }
        }
    }
}

fn prepare_voyage(
    id: VoyageId,
    raw: RawVoyage,
    color: palette::Rgb,
    occurrence_count: usize,
) -> Result<Voyage, DatasetError> {
    let vessel = raw.metadata.vessel;
    if raw.coordinates.is_empty() {
        return Err(DatasetError::EmptyTrack { vessel });
    }

    let coordinates = raw
        .coordinates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let ts = c.2.to_f64(|| format!("voyage {vessel} coordinate {i}"))?;
            Ok(Coordinate {
                lon: c.0,
                lat: c.1,
                timestamp: Timestamp(ts),
            })
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;

    let metadata = VoyageMetadata {
        vessel_name: vessel_display_name(&vessel),
        vessel,
        year_from: raw.metadata.year_from,
        year_to: raw.metadata.year_to,
        occurrence_count,
        color,
    };
    Ok(Voyage::new(id, coordinates, metadata))
}

fn prepare_occurrences(
    vessel: &str,
    raw: Vec<crate::source::RawOccurrence>,
) -> Result<Vec<Occurrence>, DatasetError> {
    let mut occurrences = raw
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let ts = row
                .timestamp()
                .to_f64(|| format!("occurrences of {vessel} row {i}"))?;
            Ok(Occurrence {
                timestamp: Timestamp(ts),
                record_id: row.record_id().to_string(),
                label: row.label().to_string(),
            })
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;

    // Scroll sync binary-searches these.
    occurrences.sort_by(|a, b| a.timestamp.0.total_cmp(&b.timestamp.0));
    Ok(occurrences)
}

fn derive_metadata(voyages: &[Voyage], lead_in_months: u32) -> Result<DatasetMetadata, DatasetError> {
    let range = voyages
        .iter()
        .flat_map(|v| v.coordinates())
        .map(|c| TimeRange::instant(c.timestamp))
        .reduce(|a, b| a.union(&b))
        .ok_or(DatasetError::NoTimeRange)?;

    let lead_in = -(lead_in_months.min(i32::MAX as u32) as i32);
    let min = calendar::shift_months(range.min(), lead_in).unwrap_or(range.min());
    Ok(DatasetMetadata {
        min_timestamp: min,
        max_timestamp: range.max(),
    })
}
