use catalog::{Dataset, Occurrence, Selection};
use foundation::calendar;
use serde::Serialize;

use crate::time_scale::TimeScale;

/// Labels at either end of the slider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeLabels {
    pub min: String,
    pub max: String,
}

/// Year-only for the whole dataset, "Month Year" for a single voyage.
pub fn range_labels(scale: &TimeScale, selection: Selection) -> RangeLabels {
    let domain = scale.domain();
    let label = |ts| match selection {
        Selection::All => calendar::year_of(ts).map(|y| y.to_string()),
        Selection::Voyage(_) => calendar::month_year(ts).map(|my| my.to_string()),
    };
    RangeLabels {
        min: label(domain.min()).unwrap_or_default(),
        max: label(domain.max()).unwrap_or_default(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub title: String,
    pub subtitle: String,
}

pub fn header(dataset: &Dataset, selection: Selection) -> Header {
    if let Some(voyage) = selection.voyage().and_then(|id| dataset.voyage(id)) {
        let meta = voyage.metadata();
        return Header {
            title: format!("Voyage of {}", meta.vessel_name),
            subtitle: format!("{} - {}", meta.year_from, meta.year_to),
        };
    }

    let subtitle = match dataset.metadata().years() {
        Some((from, to)) => format!("Voyages of scientific exploration {from} - {to}"),
        None => "Voyages of scientific exploration".to_string(),
    };
    Header {
        title: "Voyages of discovery".to_string(),
        subtitle,
    }
}

/// One entry of the voyage dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub selection: Selection,
    pub label: String,
}

/// The "all voyages" entry first, then one entry per voyage.
pub fn selector_options(dataset: &Dataset, current: Selection) -> Vec<SelectorOption> {
    let all_label = match current {
        Selection::All => "Select a voyage",
        Selection::Voyage(_) => "View all voyages",
    };
    std::iter::once(SelectorOption {
        selection: Selection::All,
        label: all_label.to_string(),
    })
    .chain(dataset.voyages().iter().map(|v| SelectorOption {
        selection: Selection::Voyage(v.id()),
        label: v.option_label(),
    }))
    .collect()
}

/// Presentation of one occurrence list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceRow {
    pub label: String,
    pub date: String,
    pub record_url: String,
}

impl From<&Occurrence> for OccurrenceRow {
    fn from(occ: &Occurrence) -> Self {
        Self {
            label: occ.label.clone(),
            date: occ.date_label().unwrap_or_default(),
            record_url: occ.record_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use catalog::{Dataset, PrepareOptions, RawDataset, Selection};
    use foundation::{TimeRange, Timestamp, VoyageId};
    use pretty_assertions::assert_eq;

    use super::*;

    // 1831-12-27 .. 1836-10-02
    const BEAGLE: &str = r#"[{"coordinates": [[0, 0, -4355337600], [1, 1, -4204915200]],
        "metadata": {"vessel": "beagle", "year_from": 1831, "year_to": 1836}}]"#;

    fn dataset() -> Dataset {
        let raw = RawDataset::from_json_strs(BEAGLE, "{}", None).unwrap();
        Dataset::prepare(raw, PrepareOptions::default()).unwrap()
    }

    #[test]
    fn range_labels_are_years_for_all_voyages() {
        let scale = TimeScale::new(
            TimeRange::new(Timestamp(-4_355_337_600.0), Timestamp(-4_204_915_200.0)),
            5000,
        );
        assert_eq!(
            range_labels(&scale, Selection::All),
            RangeLabels {
                min: "1831".to_string(),
                max: "1836".to_string()
            }
        );
        assert_eq!(
            range_labels(&scale, Selection::Voyage(VoyageId::new(0))),
            RangeLabels {
                min: "December 1831".to_string(),
                max: "October 1836".to_string()
            }
        );
    }

    #[test]
    fn header_for_selection() {
        let ds = dataset();
        assert_eq!(
            header(&ds, Selection::Voyage(VoyageId::new(0))),
            Header {
                title: "Voyage of HMS Beagle".to_string(),
                subtitle: "1831 - 1836".to_string()
            }
        );
        // derived bounds include a 24 month lead-in
        assert_eq!(
            header(&ds, Selection::All),
            Header {
                title: "Voyages of discovery".to_string(),
                subtitle: "Voyages of scientific exploration 1829 - 1836".to_string()
            }
        );
    }

    #[test]
    fn selector_options_list_all_first() {
        let ds = dataset();
        let labels: Vec<String> = selector_options(&ds, Selection::All)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["Select a voyage", "HMS Beagle 1831-1836"]);

        let with_voyage = selector_options(&ds, Selection::Voyage(VoyageId::new(0)));
        assert_eq!(with_voyage[0].label, "View all voyages");
        assert_eq!(with_voyage[1].selection, Selection::Voyage(VoyageId::new(0)));
    }

    #[test]
    fn occurrence_row_presentation() {
        let occ = catalog::Occurrence {
            timestamp: Timestamp(-4_355_337_600.0),
            record_id: "77".to_string(),
            label: "Fucus".to_string(),
        };
        assert_eq!(
            OccurrenceRow::from(&occ),
            OccurrenceRow {
                label: "Fucus".to_string(),
                date: "27th December 1831".to_string(),
                record_url: "https://gbif.org/occurrence/77".to_string(),
            }
        );
    }
}
