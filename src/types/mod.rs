pub mod dashboard;
pub mod indicator;
pub mod options;
pub mod series;
pub mod snapshot;

pub use dashboard::*;
pub use indicator::*;
pub use options::*;
pub use series::*;
pub use snapshot::*;
