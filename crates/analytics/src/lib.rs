//! Derived views and statistics over the loaded marketing tables.

pub mod aggregate;
pub mod calendar;
pub mod classification;
pub mod engine;
pub mod fill;
pub mod nps;
pub mod options;
pub mod regression;
pub mod summary;

pub use aggregate::{
    cumulative_sum_by, filter_eq, filter_in, group_by, percent_of_group, sort_by, top_n, Agg,
};
pub use calendar::{quarter_of, with_calendar_fields, CALENDAR_COLUMNS};
pub use classification::{
    as_label, auc, confusion_matrix, optimal_threshold, predict, roc_curve,
    ClassificationMetrics, RocPoint,
};
pub use engine::DerivedMetrics;
pub use fill::fill_missing_numeric;
pub use nps::{with_nps_category, NPS_CATEGORIES};
pub use options::{channel_options, distinct_values, region_options, year_options};
pub use regression::{ols_fit, LinearFit};
pub use summary::{summary_stats, SummaryStats};
