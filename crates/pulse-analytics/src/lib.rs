//! Aggregation and derivation engine for studio analytics
//!
//! Turns raw spreadsheet records into grouped summaries, period-over-period
//! deltas, and rankings. All views are pure functions over an in-memory
//! snapshot; the [`engine`] module is the main entry point and [`cache`]
//! wraps it with a keyed view cache.

pub mod cache;
pub mod comparison;
pub mod dates;
pub mod engine;
pub mod filters;
pub mod grouping;
pub mod metrics;
pub mod ranking;

pub use cache::{CacheConfig, CachedAnalyticsEngine};
pub use comparison::{
    compare, month_over_month, year_on_year, GrowthDirection, MonthPoint, PeriodDelta, YearOnYearRow,
};
pub use dates::{month_year_to_date, parse_date, parse_month_year, parse_parts, CalendarParts};
pub use engine::{
    AnalyticsEngine, ClientDimension, DataSnapshot, ExecutiveSummary, LeadDimension,
    SalesDimension, SessionDimension,
};
pub use filters::{DateRange, FilterOptions};
pub use grouping::{group_by, group_by_or, UNKNOWN_GROUP};
pub use metrics::{
    average, percentage, ClientConversionSummary, DiscountSummary, LeadSourceSummary, SalesSummary,
    SessionSummary, TrainerSummary,
};
pub use ranking::rank_desc;
