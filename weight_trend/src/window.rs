//! Date windows and the filter that restricts a series to one

use crate::data::{Milestone, Observation};
use crate::error::Result;
use crate::utils::{parse_timestamp, sub_months};
use serde::{Deserialize, Serialize};

/// An inclusive range of epoch-millisecond timestamps.
///
/// A window whose `start` lies after its `end` is allowed and simply contains
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: i64,
    pub end: i64,
}

impl DateWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window spanning two calendar dates, both days included from their start
    pub fn from_dates(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_timestamp(start)?, parse_timestamp(end)?))
    }

    /// The `months` calendar months leading up to `now`
    pub fn last_months(now: i64, months: u32) -> Result<Self> {
        Ok(Self::new(sub_months(now, months)?, now))
    }

    /// From the first to the last observation, `None` for an empty series
    pub fn all_time(series: &[Observation]) -> Option<Self> {
        match (series.first(), series.last()) {
            (Some(first), Some(last)) => Some(Self::new(first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// Length of the window in milliseconds, negative for an inverted window.
    ///
    /// Saturates at the `i64` bounds for windows spanning most of the timeline.
    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

/// Keep the observations that fall inside `window`, preserving order
pub fn filter(series: &[Observation], window: &DateWindow) -> Vec<Observation> {
    series
        .iter()
        .filter(|o| window.contains(o.timestamp))
        .copied()
        .collect()
}

/// Keep the milestones that fall inside `window`, preserving order
pub fn milestones_in_window(milestones: &[Milestone], window: &DateWindow) -> Vec<Milestone> {
    milestones
        .iter()
        .filter(|m| window.contains(m.timestamp))
        .cloned()
        .collect()
}
