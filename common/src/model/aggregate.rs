//! Chart-ready series produced by the aggregation reducers.

use serde::{Deserialize, Serialize};

/// A labelled count (commune, village, reason or sex bucket).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub label: String,
    pub count: usize,
}

/// A time bucket keyed by its canonical start (`yyyy-MM-dd` or `yyyy-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBucket {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInterval {
    #[default]
    Day,
    Week,
    Month,
}

/// Headline counters shown above the charts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub sensitive: usize,
    pub non_sensitive: usize,
    pub communes: usize,
}
