//! # Weight Trend Workspace
//!
//! Umbrella crate for the weight trend libraries.
//!
//! - [`trend_math`]: least-squares fitting over timestamped measurements
//! - [`weight_trend`]: windowing, milestone trend lines, projections and
//!   summary statistics for a body-weight series
//!
//! ## Example
//!
//! ```
//! use weight_trend_workspace::trend_math::fit;
//!
//! let day: i64 = 86_400_000;
//! let result = fit(&[(0, 200.0), (7 * day, 198.0), (14 * day, 196.0)]);
//! assert!((result.slope_per_day() + 2.0 / 7.0).abs() < 1e-9);
//! ```

pub use trend_math;
pub use weight_trend;

pub use weight_trend::{
    analyze, analyze_records, AnalysisParams, DateWindow, Milestone, Observation,
    ProjectionConfig, TrendAnalysis, TrendPoint, TrendSummary,
};
