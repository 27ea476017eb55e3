//! The persisted JSON shape for entries and milestones
//!
//! Current format: `{"entries": [{"date", "weight"}], "milestones": [{"date", "description"}]}`.
//! Older stores hold a bare array of entries; those are migrated on load to the
//! current format with no milestones.

use crate::data::{normalize_milestones, Milestone, MilestoneRecord, WeightEntry, WeightSeries};
use crate::error::{Result, TrendError};
use crate::utils::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Stored entries and milestones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredData {
    #[serde(default)]
    pub entries: Vec<WeightEntry>,
    #[serde(default)]
    pub milestones: Vec<MilestoneRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFormat {
    Legacy(Vec<WeightEntry>),
    Current(StoredData),
}

/// Stable sort by parsed date; fails if any date is malformed
fn sort_by_date<T>(items: &mut Vec<T>, date: impl Fn(&T) -> &str) -> Result<()> {
    let keys = items
        .iter()
        .map(|item| parse_timestamp(date(item)))
        .collect::<Result<Vec<i64>>>()?;

    let mut keyed: Vec<(i64, T)> = keys.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by_key(|(key, _)| *key);
    items.extend(keyed.into_iter().map(|(_, item)| item));
    Ok(())
}

impl StoredData {
    /// Parse stored JSON in either the current or the legacy format
    pub fn from_json(json: &str) -> Result<Self> {
        let format: StoredFormat = serde_json::from_str(json).map_err(|e| {
            TrendError::SerializationError(format!(
                "Stored data is neither {{entries, milestones}} nor an entry array: {}",
                e
            ))
        })?;

        Ok(match format {
            StoredFormat::Current(data) => data,
            StoredFormat::Legacy(entries) => {
                debug!(entries = entries.len(), "migrating legacy entry array");
                Self {
                    entries,
                    milestones: Vec::new(),
                }
            }
        })
    }

    /// Serialize in the current format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a store file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            entries = data.entries.len(),
            milestones = data.milestones.len(),
            "loaded store"
        );
        Ok(data)
    }

    /// Write the store file in the current format
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        debug!(path = %path.as_ref().display(), "saved store");
        Ok(())
    }

    /// Add an entry, keeping entries ordered by date
    pub fn add_entry(&mut self, entry: WeightEntry) -> Result<()> {
        if !entry.weight.is_finite() {
            return Err(TrendError::ParseError(format!(
                "Weight on {} is not a finite number",
                entry.date
            )));
        }
        parse_timestamp(&entry.date)?;
        self.entries.push(entry);
        sort_by_date(&mut self.entries, |e| &e.date)
    }

    /// Add a milestone, keeping milestones ordered by date
    pub fn add_milestone(&mut self, milestone: MilestoneRecord) -> Result<()> {
        parse_timestamp(&milestone.date)?;
        self.milestones.push(milestone);
        sort_by_date(&mut self.milestones, |m| &m.date)
    }

    /// Remove the entry at `index`, if there is one
    pub fn remove_entry(&mut self, index: usize) -> Option<WeightEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Replace the contents with imported data, both lists ordered by date
    pub fn replace_with(&mut self, mut imported: StoredData) -> Result<()> {
        sort_by_date(&mut imported.entries, |e| &e.date)?;
        sort_by_date(&mut imported.milestones, |m| &m.date)?;
        *self = imported;
        Ok(())
    }

    /// Append entries read from CSV, keeping entries ordered by date
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let imported = read_entries_csv(reader)?;
        let count = imported.len();
        self.entries.extend(imported);
        sort_by_date(&mut self.entries, |e| &e.date)?;
        info!(imported = count, total = self.entries.len(), "imported csv entries");
        Ok(count)
    }

    /// Entries as a normalized series
    pub fn series(&self) -> Result<WeightSeries> {
        WeightSeries::from_entries(&self.entries)
    }

    /// Milestones normalized and ordered by timestamp
    pub fn normalized_milestones(&self) -> Result<Vec<Milestone>> {
        normalize_milestones(&self.milestones)
    }
}

/// Read `date,weight` rows (with a header) into entries.
///
/// Every row is checked so a bad date fails the whole import.
pub fn read_entries_csv<R: Read>(reader: R) -> Result<Vec<WeightEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut entries = Vec::new();
    for (row, record) in csv_reader.deserialize::<WeightEntry>().enumerate() {
        let entry = record?;
        parse_timestamp(&entry.date).map_err(|e| {
            TrendError::CsvError(format!("Row {}: {}", row + 1, e))
        })?;
        if !entry.weight.is_finite() {
            return Err(TrendError::CsvError(format!(
                "Row {}: weight is not a finite number",
                row + 1
            )));
        }
        entries.push(entry);
    }
    Ok(entries)
}
