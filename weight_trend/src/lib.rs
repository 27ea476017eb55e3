//! # Weight Trend
//!
//! A Rust library for analysing a personal body-weight time series.
//!
//! ## Features
//!
//! - Normalizing stored `{date, weight}` records into a sorted series
//! - Inclusive date windows with "past N months" and "all time" presets
//! - Least-squares trend lines anchored at a chosen milestone, optionally
//!   fitted to only the most recent observations
//! - Forward projection of the trend by whole calendar months
//! - Summary statistics: net change, weekly rates and projected goal
//!
//! ## Quick Start
//!
//! ```rust
//! use weight_trend::{
//!     analyze_records, AnalysisParams, DateWindow, MilestoneRecord, ProjectionConfig,
//!     WeightEntry,
//! };
//!
//! let entries = vec![
//!     WeightEntry::new("2024-01-01", 200.0),
//!     WeightEntry::new("2024-01-08", 198.0),
//!     WeightEntry::new("2024-01-15", 196.0),
//! ];
//! let milestones = vec![MilestoneRecord::new("2024-01-01", "Start")];
//!
//! let window = DateWindow::from_dates("2024-01-01", "2024-01-15")?;
//! let params = AnalysisParams::new(window).with_projection(ProjectionConfig::new(1));
//!
//! let analysis = analyze_records(&entries, &milestones, &params)?;
//! assert_eq!(analysis.summary.net_change, 4.0);
//! assert!(analysis.trend.last().map_or(false, |p| p.is_projected));
//! # Ok::<(), weight_trend::TrendError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod projection;
pub mod store;
pub mod summary;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use crate::config::AnalysisConfig;
pub use crate::data::{Milestone, MilestoneRecord, Observation, WeightEntry, WeightSeries};
pub use crate::error::{Result, TrendError};
pub use crate::pipeline::{
    analyze, analyze_records, select_default_milestone, AnalysisParams, MilestoneChoice,
    TrendAnalysis,
};
pub use crate::projection::{project, project_trend, ProjectionConfig, TrendFit, TrendPoint};
pub use crate::store::StoredData;
pub use crate::summary::{summarize, TrendSummary};
pub use crate::window::{filter, DateWindow};
pub use trend_math::RegressionResult;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
