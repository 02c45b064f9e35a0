//! In-process query service over a fixed set of records.
//!
//! Serves offline runs from a JSON dump (`XAMLEYDI_SOURCE=json`) and is the
//! fake remote service in tests: it counts requests and can be told to fail
//! a given request.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::model::complaint::Complaint;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use super::{Column, ComplaintQuery, ComplaintSource, OrderBy, Predicate};
use crate::error::QueryError;
use crate::timestamps::parse_timestamp;

#[derive(Default)]
pub struct MemorySource {
    records: Vec<Complaint>,
    requests: AtomicUsize,
    /// 1-based request number that should be rejected.
    fail_on: Mutex<Option<usize>>,
}

enum Matcher {
    Gte(Column, String),
    Lte(Column, String),
    Pattern(Column, Regex),
    Eq(Column, String),
}

/// Turns a LIKE pattern into an anchored, case-insensitive regex.
fn like_to_regex(pattern: &str) -> Result<Regex, QueryError> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    RegexBuilder::new(&expr)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| QueryError::Rejected(format!("invalid pattern '{}': {}", pattern, e)))
}

/// Compares a stored value with a bound; dates compare chronologically and
/// never match when either side does not parse.
fn compare(column: Column, stored: &str, bound: &str) -> Option<Ordering> {
    if column == Column::Date {
        let stored = parse_timestamp(stored)?;
        let bound = parse_timestamp(bound)?;
        Some(stored.cmp(&bound))
    } else {
        Some(stored.cmp(bound))
    }
}

impl Matcher {
    fn compile(predicate: &Predicate) -> Result<Self, QueryError> {
        Ok(match predicate {
            Predicate::Gte(c, v) => Matcher::Gte(*c, v.clone()),
            Predicate::Lte(c, v) => Matcher::Lte(*c, v.clone()),
            Predicate::ILike(c, p) => Matcher::Pattern(*c, like_to_regex(p)?),
            Predicate::Eq(c, v) => Matcher::Eq(*c, v.clone()),
        })
    }

    fn matches(&self, complaint: &Complaint) -> bool {
        match self {
            Matcher::Gte(c, bound) => c
                .value_of(complaint)
                .and_then(|v| compare(*c, &v, bound))
                .is_some_and(|o| o != Ordering::Less),
            Matcher::Lte(c, bound) => c
                .value_of(complaint)
                .and_then(|v| compare(*c, &v, bound))
                .is_some_and(|o| o != Ordering::Greater),
            Matcher::Pattern(c, re) => c.value_of(complaint).is_some_and(|v| re.is_match(&v)),
            Matcher::Eq(c, expected) => c.value_of(complaint).as_deref() == Some(expected.as_str()),
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Time(NaiveDateTime),
    Text(String),
}

/// Orders like a relational store: nulls sort above every value, so they
/// come last ascending and first descending.
fn order_records(records: &mut [&Complaint], order: OrderBy) {
    let key = |c: &Complaint| {
        order.column.value_of(c).map(|v| match order.column {
            Column::Date => parse_timestamp(&v).map(SortKey::Time).unwrap_or(SortKey::Text(v)),
            _ => SortKey::Text(v),
        })
    };
    records.sort_by(|a, b| {
        let ord = match (key(*a), key(*b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(&y),
        };
        if order.ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

/// Loads a JSON array of complaints, as exported by the remote table.
pub fn read_json_records(path: &Path) -> Result<Vec<Complaint>, QueryError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

impl MemorySource {
    pub fn new(records: Vec<Complaint>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, QueryError> {
        Ok(Self::new(read_json_records(path)?))
    }

    /// Number of page/column requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    /// Makes the `n`-th request from now on (1-based) fail.
    pub fn fail_on_request(&self, n: usize) {
        let current = self.requests();
        if let Ok(mut slot) = self.fail_on.lock() {
            *slot = Some(current + n);
        }
    }

    fn select(&self, query: &ComplaintQuery) -> Result<Vec<&Complaint>, QueryError> {
        let served = self.requests.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let should_fail = self
            .fail_on
            .lock()
            .map(|slot| *slot == Some(served))
            .unwrap_or(false);
        if should_fail {
            return Err(QueryError::Rejected(format!("request {} rejected", served)));
        }

        let matchers = query
            .predicates
            .iter()
            .map(Matcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let mut hits: Vec<&Complaint> = self
            .records
            .iter()
            .filter(|c| matchers.iter().all(|m| m.matches(c)))
            .collect();
        order_records(&mut hits, query.order);
        Ok(hits
            .into_iter()
            .skip(query.window.offset)
            .take(query.window.limit)
            .collect())
    }
}

#[async_trait]
impl ComplaintSource for MemorySource {
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>, QueryError> {
        Ok(self.select(query)?.into_iter().cloned().collect())
    }

    async fn fetch_column(
        &self,
        column: Column,
        query: &ComplaintQuery,
    ) -> Result<Vec<Option<String>>, QueryError> {
        Ok(self
            .select(query)?
            .into_iter()
            .map(|c| column.value_of(c))
            .collect())
    }
}
