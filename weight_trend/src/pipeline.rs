//! End-to-end analysis: records and view parameters in, chart data out
//!
//! Every call recomputes from scratch; identical inputs give identical
//! outputs.

use crate::data::{
    normalize_milestones, Milestone, MilestoneRecord, Observation, WeightEntry, WeightSeries,
};
use crate::error::Result;
use crate::projection::{project_trend, ProjectionConfig, TrendFit, TrendPoint};
use crate::summary::{summarize, TrendSummary};
use crate::window::{filter, milestones_in_window, DateWindow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which milestone the trend line starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MilestoneChoice {
    /// The most recent milestone inside the window
    #[default]
    Latest,
    /// The milestone at this timestamp, if one exists
    At(i64),
    /// No trend line
    Disabled,
}

/// View parameters for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParams {
    pub window: DateWindow,
    pub milestone: MilestoneChoice,
    pub projection: ProjectionConfig,
}

impl AnalysisParams {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            milestone: MilestoneChoice::default(),
            projection: ProjectionConfig::default(),
        }
    }

    pub fn with_milestone(mut self, milestone: MilestoneChoice) -> Self {
        self.milestone = milestone;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }
}

/// Everything the presentation layer draws for one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub window: DateWindow,
    /// Observations inside the window
    pub windowed: Vec<Observation>,
    /// Milestones inside the window, for reference markers
    pub visible_milestones: Vec<Milestone>,
    /// Milestone the trend starts from
    pub milestone: Option<Milestone>,
    /// Fit behind the trend line
    pub fit: Option<TrendFit>,
    /// Trend line, observed points first
    pub trend: Vec<TrendPoint>,
    /// End of the projection horizon, when projecting
    pub projection_end: Option<i64>,
    pub summary: TrendSummary,
}

/// Most recent milestone inside `window`, `None` when there is none
pub fn select_default_milestone<'a>(
    milestones: &'a [Milestone],
    window: &DateWindow,
) -> Option<&'a Milestone> {
    milestones
        .iter()
        .filter(|m| window.contains(m.timestamp))
        .max_by_key(|m| m.timestamp)
}

fn resolve_milestone<'a>(
    milestones: &'a [Milestone],
    window: &DateWindow,
    choice: MilestoneChoice,
) -> Option<&'a Milestone> {
    match choice {
        MilestoneChoice::Latest => select_default_milestone(milestones, window),
        MilestoneChoice::At(timestamp) => milestones.iter().find(|m| m.timestamp == timestamp),
        MilestoneChoice::Disabled => None,
    }
}

/// Run the full analysis over a normalized series
pub fn analyze(
    series: &WeightSeries,
    milestones: &[Milestone],
    params: &AnalysisParams,
) -> Result<TrendAnalysis> {
    let window = params.window;
    let windowed = filter(series.observations(), &window);
    let milestone = resolve_milestone(milestones, &window, params.milestone);

    let projection = project_trend(
        &windowed,
        series.observations(),
        milestone,
        &params.projection,
        window.end,
    )?;
    let (fit, trend, projection_end) = match projection {
        Some(projection) => (
            Some(projection.fit),
            projection.points,
            projection.projection_end,
        ),
        None => (None, Vec::new(), None),
    };

    let summary = summarize(&windowed, &window, &trend);
    debug!(
        windowed = windowed.len(),
        trend_points = trend.len(),
        net_change = summary.net_change,
        "analysis complete"
    );

    Ok(TrendAnalysis {
        window,
        windowed,
        visible_milestones: milestones_in_window(milestones, &window),
        milestone: milestone.cloned(),
        fit,
        trend,
        projection_end,
        summary,
    })
}

/// Normalize raw records and run the full analysis
pub fn analyze_records(
    entries: &[WeightEntry],
    milestones: &[MilestoneRecord],
    params: &AnalysisParams,
) -> Result<TrendAnalysis> {
    let series = WeightSeries::from_entries(entries)?;
    let milestones = normalize_milestones(milestones)?;
    analyze(&series, &milestones, params)
}
