//! Milestone-anchored trend lines and their forward projection
//!
//! The fit sample (observations used for slope and intercept) and the display
//! sequence (observations the line is drawn over) are chosen separately. With
//! a recent-count restriction the line drawn over the whole milestone range is
//! the one fitted to the latest few points only, showing where the recent
//! trend is heading rather than what fits all of the history.

use crate::data::{Milestone, Observation};
use crate::error::{Result, TrendError};
use crate::utils::{add_months, future_timestamps};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trend_math::{try_fit, RegressionResult};

/// Number of points generated across a projection horizon
pub const PROJECTION_STEPS: usize = 30;

/// How a trend line is fitted and how far it is extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Calendar months to extend the line past the window end; 0 disables
    pub horizon_months: u32,
    /// Fit only the most recent K observations from the milestone onward
    pub restrict_to_recent_count: Option<usize>,
}

impl ProjectionConfig {
    pub fn new(horizon_months: u32) -> Self {
        Self {
            horizon_months,
            restrict_to_recent_count: None,
        }
    }

    /// Restrict the fit sample to the `count` most recent observations
    pub fn with_recent_count(mut self, count: usize) -> Result<Self> {
        self.restrict_to_recent_count = Some(count);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        match self.restrict_to_recent_count {
            Some(count) if count < 2 => Err(TrendError::InvalidParameter(format!(
                "Recent count must be at least 2 to fit a trend, got {}",
                count
            ))),
            _ => Ok(()),
        }
    }
}

/// One point of a trend line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Value of the fitted line at `timestamp`
    pub fitted_value: f64,
    /// True for extrapolated points past the window end
    pub is_projected: bool,
}

/// The line fitted from a milestone and the sample behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFit {
    pub regression: RegressionResult,
    /// Number of observations in the fit sample
    pub sample_size: usize,
    /// Goodness of fit, absent when the sample values are all equal
    pub r_squared: Option<f64>,
}

/// A fitted trend together with the points to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendProjection {
    pub fit: TrendFit,
    /// Display points followed by projected points, ascending by timestamp
    pub points: Vec<TrendPoint>,
    /// End of the projection horizon when projected points were generated
    pub projection_end: Option<i64>,
}

impl TrendProjection {
    /// Points drawn over observed data
    pub fn observed_points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter().filter(|p| !p.is_projected)
    }

    /// Extrapolated points
    pub fn projected_points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter().filter(|p| p.is_projected)
    }
}

fn at_or_after(series: &[Observation], timestamp: i64) -> Vec<Observation> {
    let mut selected: Vec<Observation> = series
        .iter()
        .filter(|o| o.timestamp >= timestamp)
        .copied()
        .collect();
    selected.sort_by_key(|o| o.timestamp);
    selected
}

/// Fit the trend line for a milestone.
///
/// Returns `None` when no milestone is selected, fewer than two observations
/// exist from the milestone onward, or the sample shares a single timestamp.
pub fn fit_trend(
    all_from_milestone: &[Observation],
    milestone: Option<&Milestone>,
    config: &ProjectionConfig,
) -> Result<Option<TrendFit>> {
    config.validate()?;

    let Some(milestone) = milestone else {
        debug!("no milestone selected, skipping trend");
        return Ok(None);
    };

    let candidates = at_or_after(all_from_milestone, milestone.timestamp);
    if candidates.len() < 2 {
        debug!(
            milestone = %milestone.label,
            observations = candidates.len(),
            "not enough observations since milestone for a trend"
        );
        return Ok(None);
    }

    let sample = match config.restrict_to_recent_count {
        Some(count) if candidates.len() > count => &candidates[candidates.len() - count..],
        _ => &candidates[..],
    };

    let regression = match try_fit(sample) {
        Ok(regression) => regression,
        Err(err) => {
            warn!(milestone = %milestone.label, reason = %err, "trend fit is degenerate");
            return Ok(None);
        }
    };

    debug!(
        milestone = %milestone.label,
        sample_size = sample.len(),
        slope_per_day = regression.slope_per_day(),
        "fitted trend"
    );

    Ok(Some(TrendFit {
        regression,
        sample_size: sample.len(),
        r_squared: regression.r_squared(sample).ok(),
    }))
}

/// Fit a trend from `milestone` and lay it out over the window and horizon.
///
/// The line is drawn over the windowed observations at or after the milestone
/// and no later than `window_end`. When `config.horizon_months` is positive
/// and there is something to draw, [`PROJECTION_STEPS`] evenly spaced points
/// follow in `(window_end, window_end + horizon]`.
pub fn project_trend(
    windowed: &[Observation],
    all_from_milestone: &[Observation],
    milestone: Option<&Milestone>,
    config: &ProjectionConfig,
    window_end: i64,
) -> Result<Option<TrendProjection>> {
    let Some(fit) = fit_trend(all_from_milestone, milestone, config)? else {
        return Ok(None);
    };
    let regression = fit.regression;
    let anchor = milestone.map_or(i64::MIN, |m| m.timestamp);

    let mut points: Vec<TrendPoint> = at_or_after(windowed, anchor)
        .into_iter()
        .filter(|o| o.timestamp <= window_end)
        .map(|o| TrendPoint {
            timestamp: o.timestamp,
            fitted_value: regression.value_at(o.timestamp),
            is_projected: false,
        })
        .collect();

    let mut projection_end = None;
    if config.horizon_months > 0 && !points.is_empty() {
        let end = match add_months(window_end, config.horizon_months) {
            Ok(end) => end,
            Err(err) => {
                warn!(window_end, reason = %err, "projection horizon out of range, skipping");
                return Ok(Some(TrendProjection {
                    fit,
                    points,
                    projection_end,
                }));
            }
        };
        points.extend(
            future_timestamps(window_end, end, PROJECTION_STEPS)
                .into_iter()
                .map(|timestamp| TrendPoint {
                    timestamp,
                    fitted_value: regression.value_at(timestamp),
                    is_projected: true,
                }),
        );
        projection_end = Some(end);
    }

    Ok(Some(TrendProjection {
        fit,
        points,
        projection_end,
    }))
}

/// Trend points for a milestone, empty when no trend can be drawn
pub fn project(
    windowed: &[Observation],
    all_from_milestone: &[Observation],
    milestone: Option<&Milestone>,
    config: &ProjectionConfig,
    window_end: i64,
) -> Result<Vec<TrendPoint>> {
    Ok(
        project_trend(windowed, all_from_milestone, milestone, config, window_end)?
            .map(|projection| projection.points)
            .unwrap_or_default(),
    )
}
