//! Pure reducers turning a result set into chart series.
//!
//! Every reducer is a function of its input only. Count series keep
//! first-seen order among equal counts, so repeated calls on the same result
//! set produce identical output. Commune and village labels are the raw
//! stored values: case variants such as `Dakar` and `DAKAR` stay separate
//! buckets even though the filter options fold them together.

use chrono::{Datelike, Duration, NaiveDate};
use common::model::aggregate::{CountBucket, DateBucket, Summary, TimeInterval};
use common::model::complaint::{Complaint, Sex};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::timestamps::parse_timestamp;

/// Label for records with no commune, village or reason.
pub const UNSPECIFIED: &str = "Non spécifié";
pub const COMMUNE_LIMIT: usize = 15;
pub const DEFAULT_VILLAGE_LIMIT: usize = 10;

fn label_or_unspecified(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNSPECIFIED,
    }
}

/// Counts records per label, most frequent first.
fn count_by<'a, F>(records: &'a [Complaint], label: F) -> Vec<CountBucket>
where
    F: Fn(&'a Complaint) -> &'a str,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<CountBucket> = Vec::new();
    for complaint in records {
        let key = label(complaint);
        match slots.get(key) {
            Some(&slot) => buckets[slot].count += 1,
            None => {
                slots.insert(key, buckets.len());
                buckets.push(CountBucket {
                    label: key.to_string(),
                    count: 1,
                });
            }
        }
    }
    // stable: ties keep first-seen order
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

pub fn by_commune(records: &[Complaint]) -> Vec<CountBucket> {
    let mut buckets = count_by(records, |c| label_or_unspecified(c.commune.as_deref()));
    buckets.truncate(COMMUNE_LIMIT);
    buckets
}

pub fn by_village_top_n(records: &[Complaint], n: usize) -> Vec<CountBucket> {
    let mut buckets = count_by(records, |c| label_or_unspecified(c.village.as_deref()));
    buckets.truncate(n);
    buckets
}

/// Raw reasons, no normalisation, no truncation.
pub fn by_reason(records: &[Complaint]) -> Vec<CountBucket> {
    count_by(records, |c| label_or_unspecified(c.complaint_reason.as_deref()))
}

/// Always the three buckets male, female, unknown, in that order.
pub fn by_sex(records: &[Complaint]) -> Vec<CountBucket> {
    let mut counts = [0usize; 3];
    for complaint in records {
        let slot = match complaint.sex() {
            Sex::Male => 0,
            Sex::Female => 1,
            Sex::Unknown => 2,
        };
        counts[slot] += 1;
    }
    [Sex::Male, Sex::Female, Sex::Unknown]
        .iter()
        .zip(counts)
        .map(|(sex, count)| CountBucket {
            label: sex.label().to_string(),
            count,
        })
        .collect()
}

/// Canonical bucket key of `day`. Weeks start on Monday.
pub fn bucket_key(day: NaiveDate, interval: TimeInterval) -> String {
    match interval {
        TimeInterval::Day => day.format("%Y-%m-%d").to_string(),
        TimeInterval::Week => {
            let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
            monday.format("%Y-%m-%d").to_string()
        }
        TimeInterval::Month => day.format("%Y-%m").to_string(),
    }
}

/// Time series in ascending key order. Records without a usable date are
/// left out.
pub fn by_date(records: &[Complaint], interval: TimeInterval) -> Vec<DateBucket> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for complaint in records {
        let Some(when) = complaint.date.as_deref().and_then(parse_timestamp) else {
            continue;
        };
        *counts.entry(bucket_key(when.date(), interval)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DateBucket { date, count })
        .collect()
}

pub fn summary(records: &[Complaint]) -> Summary {
    let sensitive = records.iter().filter(|c| c.is_sensitive()).count();
    let communes: HashSet<Option<&str>> = records.iter().map(|c| c.commune.as_deref()).collect();
    Summary {
        total: records.len(),
        sensitive,
        non_sensitive: records.len() - sensitive,
        communes: communes.len(),
    }
}
