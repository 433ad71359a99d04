pub mod cache;
pub mod dashboard;
pub mod price_history;
pub mod signals;
pub mod snapshots;

pub use cache::{Cache, Clock, ManualClock, SystemClock};
pub use dashboard::DashboardService;
pub use price_history::{
    FallbackChain, JsonFileProvider, PriceHistoryProvider, SourcedSeries, SyntheticSeries,
};
pub use signals::{DashboardEngine, EvaluationContext, Indicator};
pub use snapshots::{collect, MarketSnapshotProvider, StaticSnapshotProvider};
