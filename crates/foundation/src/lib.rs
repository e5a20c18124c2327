pub mod calendar;
pub mod ids;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use calendar::MonthYear;
pub use ids::*;
pub use time::*;
