use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid timestamp {value:?} in {context}")]
    InvalidTimestamp { context: String, value: String },
    #[error("voyage {vessel} has no coordinates")]
    EmptyTrack { vessel: String },
    #[error("dataset metadata has min timestamp {min} after max timestamp {max}")]
    InvertedBounds { min: f64, max: f64 },
    #[error("dataset has no voyages and no metadata to derive a time range from")]
    NoTimeRange,
}
