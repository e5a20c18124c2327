use catalog::Selection;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("unknown selection {0:?}")]
    UnknownSelection(Selection),
    #[error("invalid playback config: {0}")]
    InvalidConfig(String),
    #[error("malformed playback config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    SessionClosed(#[from] runtime::SchedulerClosed),
}
