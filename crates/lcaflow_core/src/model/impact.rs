//! Demand vectors and impact result tables.
//!
//! # Responsibility
//! - Describe the functional unit handed to a calculation engine.
//! - Hold per-method scores in the order methods were requested.
//!
//! # Invariants
//! - `FunctionalUnit` keeps insertion order and one entry per activity.
//! - `ImpactTable` rows are never reordered after assembly.

use crate::model::activity::ActivityKey;
use crate::model::method::MethodKey;
use serde::{Deserialize, Serialize};

/// Requested output amounts per activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionalUnit {
    entries: Vec<(ActivityKey, f64)>,
}

impl FunctionalUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demand for a single activity.
    pub fn single(activity: ActivityKey, amount: f64) -> Self {
        Self::new().with(activity, amount)
    }

    /// Adds a demand entry, replacing the amount when `activity` is already present.
    pub fn with(mut self, activity: ActivityKey, amount: f64) -> Self {
        match self.entries.iter_mut().find(|(key, _)| *key == activity) {
            Some(entry) => entry.1 = amount,
            None => self.entries.push((activity, amount)),
        }
        self
    }

    pub fn amount(&self, activity: &ActivityKey) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == activity)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActivityKey, f64)> {
        self.entries.iter().map(|(key, amount)| (key, *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One scored method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRow {
    pub score: f64,
    pub unit: String,
    pub method: MethodKey,
}

/// Column-addressable table of impact scores, one row per method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactTable {
    rows: Vec<ImpactRow>,
}

impl ImpactTable {
    pub fn from_rows(rows: Vec<ImpactRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ImpactRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `score` column.
    pub fn scores(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.score).collect()
    }

    /// `unit` column.
    pub fn units(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.unit.as_str()).collect()
    }

    /// `method` column.
    pub fn methods(&self) -> Vec<&MethodKey> {
        self.rows.iter().map(|row| &row.method).collect()
    }

    /// Score of the first row scored with `method`.
    pub fn score_for(&self, method: &MethodKey) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| &row.method == method)
            .map(|row| row.score)
    }

    /// Serializes rows as a JSON array of `{score, unit, method}` records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rows)
    }
}

impl IntoIterator for ImpactTable {
    type Item = ImpactRow;
    type IntoIter = std::vec::IntoIter<ImpactRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImpactTable {
    type Item = &'a ImpactRow;
    type IntoIter = std::slice::Iter<'a, ImpactRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
