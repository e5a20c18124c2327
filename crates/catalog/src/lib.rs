pub mod dataset;
pub mod error;
pub mod model;
pub mod palette;
pub mod source;
pub mod vessels;

pub use dataset::*;
pub use error::DatasetError;
pub use model::*;
pub use palette::Rgb;
pub use source::*;
