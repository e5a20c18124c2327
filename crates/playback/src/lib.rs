pub mod config;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod labels;
pub mod scroll_sync;
pub mod selector;
pub mod session;
pub mod time_scale;

pub use config::PlaybackConfig;
pub use coordinator::{PlaybackCoordinator, PlaybackEvent, PlaybackView};
pub use driver::{AnimationDriver, DriverState, TickOutcome};
pub use error::PlaybackError;
pub use labels::{Header, OccurrenceRow, RangeLabels, SelectorOption};
pub use scroll_sync::{ScrollSync, scroll_row_for};
pub use selector::VoyageSelector;
pub use session::{FrameReport, PlaybackSession};
pub use time_scale::{PlaybackPosition, TimeScale};
