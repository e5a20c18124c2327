//! Raw dataset input as produced by the export pipeline.
//!
//! The pipeline writes timestamps (and sometimes record ids) as JSON strings,
//! so every numeric field accepts either a number or a numeric string.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::DatasetError;

/// A JSON number, or a string holding one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    pub fn to_f64(&self, context: impl FnOnce() -> String) -> Result<f64, DatasetError> {
        let value = match self {
            LenientNumber::Number(v) => Some(*v),
            LenientNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(DatasetError::InvalidTimestamp {
                context: context(),
                value: self.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LenientNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LenientNumber::Number(v) => write!(f, "{v}"),
            LenientNumber::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Record identifiers are integers upstream but only ever displayed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(v) => write!(f, "{v}"),
            RecordId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// `[lon, lat, timestamp]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCoordinate(pub f64, pub f64, pub LenientNumber);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawVoyageMetadata {
    pub vessel: String,
    pub year_from: i32,
    pub year_to: i32,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawVoyage {
    pub coordinates: Vec<RawCoordinate>,
    pub metadata: RawVoyageMetadata,
}

/// `[timestamp, record_id, label]`, optionally followed by `lat, lon`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawOccurrence {
    Located(LenientNumber, RecordId, String, Option<f64>, Option<f64>),
    Bare(LenientNumber, RecordId, String),
}

impl RawOccurrence {
    pub fn timestamp(&self) -> &LenientNumber {
        match self {
            RawOccurrence::Located(ts, ..) | RawOccurrence::Bare(ts, ..) => ts,
        }
    }

    pub fn record_id(&self) -> &RecordId {
        match self {
            RawOccurrence::Located(_, id, ..) | RawOccurrence::Bare(_, id, _) => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RawOccurrence::Located(_, _, label, ..) | RawOccurrence::Bare(_, _, label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMetadata {
    #[serde(rename = "minTimestamp")]
    pub min_timestamp: LenientNumber,
    #[serde(rename = "maxTimestamp")]
    pub max_timestamp: LenientNumber,
}

/// Unvalidated dataset, as read from a [`DatasetSource`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub voyages: Vec<RawVoyage>,
    /// Occurrences keyed by vessel.
    pub occurrences: BTreeMap<String, Vec<RawOccurrence>>,
    pub metadata: Option<RawMetadata>,
}

impl RawDataset {
    pub fn from_json_strs(
        voyages: &str,
        occurrences: &str,
        metadata: Option<&str>,
    ) -> Result<Self, DatasetError> {
        let voyages = serde_json::from_str(voyages).map_err(|source| DatasetError::Parse {
            what: "voyages",
            source,
        })?;
        let occurrences =
            serde_json::from_str(occurrences).map_err(|source| DatasetError::Parse {
                what: "occurrences",
                source,
            })?;
        let metadata = match metadata {
            Some(raw) if !raw.trim().is_empty() => {
                Some(
                    serde_json::from_str(raw).map_err(|source| DatasetError::Parse {
                        what: "metadata",
                        source,
                    })?,
                )
            }
            _ => None,
        };
        Ok(Self {
            voyages,
            occurrences,
            metadata,
        })
    }
}

pub trait DatasetSource {
    fn load(&self) -> Result<RawDataset, DatasetError>;
}

/// Dataset held as JSON text, e.g. fetched over HTTP by a browser host.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub voyages_json: String,
    pub occurrences_json: String,
    pub metadata_json: Option<String>,
}

impl DatasetSource for InMemorySource {
    fn load(&self) -> Result<RawDataset, DatasetError> {
        RawDataset::from_json_strs(
            &self.voyages_json,
            &self.occurrences_json,
            self.metadata_json.as_deref(),
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod fs_source {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{DatasetSource, RawDataset};
    use crate::error::DatasetError;

    pub const VOYAGES_FILE_NAME: &str = "voyages.json";
    pub const OCCURRENCES_FILE_NAME: &str = "occurrences.json";
    pub const METADATA_FILE_NAME: &str = "metadata.json";

    /// Directory holding `voyages.json`, `occurrences.json` and an optional
    /// `metadata.json`.
    #[derive(Debug, Clone)]
    pub struct JsonDirSource {
        root: PathBuf,
    }

    impl JsonDirSource {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        fn read(&self, name: &str) -> Result<String, DatasetError> {
            let path = self.root.join(name);
            fs::read_to_string(&path).map_err(|source| DatasetError::Io { path, source })
        }
    }

    impl DatasetSource for JsonDirSource {
        fn load(&self) -> Result<RawDataset, DatasetError> {
            let voyages = self.read(VOYAGES_FILE_NAME)?;
            let occurrences = self.read(OCCURRENCES_FILE_NAME)?;
            let metadata = if self.root.join(METADATA_FILE_NAME).exists() {
                Some(self.read(METADATA_FILE_NAME)?)
            } else {
                None
            };
            RawDataset::from_json_strs(&voyages, &occurrences, metadata.as_deref())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use fs_source::*;
