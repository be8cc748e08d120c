//! The statistics engine.
//!
//! Every stage is a pure function over borrowed records: [`normalize`] derives
//! the per-record scalars, [`stats`], [`percentile`], [`topn`] and [`group`]
//! aggregate them, and [`report`] stitches the results into one [`Report`].

pub mod group;
pub mod normalize;
pub mod percentile;
pub mod report;
pub mod stats;
pub mod topn;

pub use group::GroupCounts;
pub use normalize::{NormalizedRecord, Normalizer, UrlKey, UrlPolicy, url_prefix};
pub use percentile::{PercentileMap, SortedSample, percentile_label, percentiles};
pub use report::{Report, ReportComposer, ReportConfig, compose_report};
pub use stats::{Measure, Stats, StatsAccumulator};
pub use topn::top_n;
