//! Summary statistics over a window and its trend line
//!
//! Changes are reported as "amount lost": a positive number means the value
//! went down over the period.

use crate::data::Observation;
use crate::projection::TrendPoint;
use crate::window::DateWindow;
use serde::{Deserialize, Serialize};
use trend_math::MS_PER_WEEK;

/// Derived statistics for the current window and trend
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    /// First windowed value minus last windowed value
    pub net_change: f64,
    /// `net_change` per started week of the window
    pub avg_weekly_rate: f64,
    /// Weekly change along the observed part of the trend line
    pub trend_weekly_rate: f64,
    /// First minus last observed trend value
    pub trend_change: f64,
    /// Value at the end of the trend line
    pub projected_goal: Option<f64>,
    /// First trend value minus `projected_goal`
    pub projected_total_change: Option<f64>,
}

/// First minus last windowed value, 0 with fewer than two observations
pub fn net_change(windowed: &[Observation]) -> f64 {
    match windowed {
        [first, .., last] => first.value - last.value,
        _ => 0.0,
    }
}

/// Started weeks covered by the window, 0 for a non-positive duration
pub fn weeks_in_window(window: &DateWindow) -> i64 {
    let duration = window.duration_ms();
    if duration <= 0 {
        return 0;
    }
    duration / MS_PER_WEEK + i64::from(duration % MS_PER_WEEK != 0)
}

/// Net change divided by the started weeks in the window
pub fn avg_weekly_rate(windowed: &[Observation], window: &DateWindow) -> f64 {
    let weeks = weeks_in_window(window);
    if weeks <= 0 {
        return 0.0;
    }
    net_change(windowed) / weeks as f64
}

fn observed_bounds(trend: &[TrendPoint]) -> Option<(&TrendPoint, &TrendPoint)> {
    let mut observed = trend.iter().filter(|p| !p.is_projected);
    let first = observed.next()?;
    let last = observed.last()?;
    Some((first, last))
}

/// First minus last observed trend value, 0 with fewer than two such points
pub fn trend_change(trend: &[TrendPoint]) -> f64 {
    observed_bounds(trend).map_or(0.0, |(first, last)| first.fitted_value - last.fitted_value)
}

/// Weekly change along the observed trend points.
///
/// Projected points are ignored. Zero with fewer than two observed points or
/// when they share a timestamp.
pub fn trend_weekly_rate(trend: &[TrendPoint]) -> f64 {
    let Some((first, last)) = observed_bounds(trend) else {
        return 0.0;
    };

    let elapsed = i128::from(last.timestamp) - i128::from(first.timestamp);
    let weeks = elapsed as f64 / MS_PER_WEEK as f64;
    if weeks == 0.0 {
        return 0.0;
    }
    (first.fitted_value - last.fitted_value) / weeks
}

/// Fitted value of the last trend point, projected or not
pub fn projected_goal(trend: &[TrendPoint]) -> Option<f64> {
    trend.last().map(|p| p.fitted_value)
}

/// Compute every statistic for a window and its trend line
pub fn summarize(windowed: &[Observation], window: &DateWindow, trend: &[TrendPoint]) -> TrendSummary {
    let goal = projected_goal(trend);
    TrendSummary {
        net_change: net_change(windowed),
        avg_weekly_rate: avg_weekly_rate(windowed, window),
        trend_weekly_rate: trend_weekly_rate(trend),
        trend_change: trend_change(trend),
        projected_goal: goal,
        projected_total_change: trend
            .first()
            .zip(goal)
            .map(|(first, goal)| first.fitted_value - goal),
    }
}

impl std::fmt::Display for TrendSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trend Summary:")?;
        writeln!(f, "  Net change:        {:.1}", self.net_change)?;
        writeln!(f, "  Weekly average:    {:.1}/week", self.avg_weekly_rate)?;
        writeln!(f, "  Trend change:      {:.1}", self.trend_change)?;
        writeln!(f, "  Trend weekly rate: {:.1}/week", self.trend_weekly_rate)?;
        match self.projected_goal {
            Some(goal) => writeln!(f, "  Projected goal:    {:.1}", goal)?,
            None => writeln!(f, "  Projected goal:    n/a")?,
        }
        if let Some(total) = self.projected_total_change {
            writeln!(f, "  Projected change:  {:.1}", total)?;
        }
        Ok(())
    }
}
