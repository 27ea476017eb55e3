//! Weight records and their normalized time series form

use crate::error::{Result, TrendError};
use crate::utils::parse_timestamp;
use serde::{Deserialize, Serialize};
use trend_math::TimedValue;

/// A raw weight measurement as stored: a calendar date and a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Measured weight
    #[serde(alias = "value")]
    pub weight: f64,
}

impl WeightEntry {
    pub fn new(date: impl Into<String>, weight: f64) -> Self {
        Self {
            date: date.into(),
            weight,
        }
    }
}

/// A raw milestone as stored: a calendar date and a free-text description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// What happened on that date
    #[serde(alias = "label")]
    pub description: String,
}

impl MilestoneRecord {
    pub fn new(date: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
        }
    }
}

/// A single timestamped measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl TimedValue for Observation {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// A labeled anchor date that a trend line can start from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub label: String,
}

impl Milestone {
    pub fn new(timestamp: i64, label: impl Into<String>) -> Self {
        Self {
            timestamp,
            label: label.into(),
        }
    }
}

/// Convert raw entries into observations sorted by timestamp.
///
/// Entries sharing a date keep their input order. Fails on the first date
/// that cannot be parsed or weight that is not finite.
pub fn normalize_entries(entries: &[WeightEntry]) -> Result<Vec<Observation>> {
    let mut observations = entries
        .iter()
        .map(|entry| {
            if !entry.weight.is_finite() {
                return Err(TrendError::ParseError(format!(
                    "Weight on {} is not a finite number",
                    entry.date
                )));
            }
            Ok(Observation::new(parse_timestamp(&entry.date)?, entry.weight))
        })
        .collect::<Result<Vec<_>>>()?;

    observations.sort_by_key(|o| o.timestamp);
    Ok(observations)
}

/// Convert raw milestone records into milestones sorted by timestamp
pub fn normalize_milestones(records: &[MilestoneRecord]) -> Result<Vec<Milestone>> {
    let mut milestones = records
        .iter()
        .map(|record| -> Result<Milestone> {
            Ok(Milestone::new(
                parse_timestamp(&record.date)?,
                record.description.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    milestones.sort_by_key(|m| m.timestamp);
    Ok(milestones)
}

/// A weight time series that is always sorted by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightSeries {
    observations: Vec<Observation>,
}

impl WeightSeries {
    /// Build a series from raw stored entries
    pub fn from_entries(entries: &[WeightEntry]) -> Result<Self> {
        Ok(Self {
            observations: normalize_entries(entries)?,
        })
    }

    /// Build a series from observations in any order
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.timestamp);
        Self { observations }
    }

    /// Get the observations, oldest first
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observations at or after `timestamp`
    pub fn since(&self, timestamp: i64) -> &[Observation] {
        let start = self.observations.partition_point(|o| o.timestamp < timestamp);
        &self.observations[start..]
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.observations.len()
    }
}
