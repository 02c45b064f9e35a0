//! Query constraints for one fetch cycle.
//!
//! `FilterSpec` is a plain value: two filters are the same query exactly when
//! they compare equal field by field. Normalisation (empty text to `None`,
//! absent choice to `All`) happens on construction so that structural
//! equality never distinguishes "unset" spellings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sex constraint; `All` is the same as no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SexFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    M,
    F,
}

impl SexFilter {
    /// Stored `complainant_sex` code to match, `None` when unconstrained.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            SexFilter::All => None,
            SexFilter::M => Some("M"),
            SexFilter::F => Some("F"),
        }
    }
}

/// Category constraint; `All` is the same as no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "sensible")]
    Sensible,
    #[serde(rename = "non_sensible")]
    NonSensible,
}

impl CategoryFilter {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Sensible => Some("sensible"),
            CategoryFilter::NonSensible => Some("non_sensible"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Inclusive lower bound on `date` (whole day).
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `date` (whole day).
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive match on `commune`.
    pub commune: Option<String>,
    /// Exact match on `village`. Only meaningful together with `commune`,
    /// but a lone village is still pushed down as given.
    pub village: Option<String>,
    /// Case-insensitive substring of `complaint_reason`.
    pub motif: Option<String>,
    pub sex: SexFilter,
    pub category: CategoryFilter,
}

/// One edit coming from the filter surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FilterChange {
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    Commune(Option<String>),
    Village(Option<String>),
    Motif(Option<String>),
    Sex(SexFilter),
    Category(CategoryFilter),
    Clear,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FilterSpec {
    /// Returns the filter with empty text fields collapsed to `None`.
    pub fn normalized(self) -> Self {
        Self {
            commune: non_empty(self.commune),
            village: non_empty(self.village),
            motif: non_empty(self.motif),
            ..self
        }
    }

    /// Applies a single edit and returns the resulting filter.
    ///
    /// Picking a different commune drops the village, since a village is only
    /// valid under its owning commune. Re-selecting the current commune keeps
    /// the village.
    pub fn apply(&self, change: FilterChange) -> Self {
        let mut next = self.clone();
        match change {
            FilterChange::StartDate(d) => next.start_date = d,
            FilterChange::EndDate(d) => next.end_date = d,
            FilterChange::Commune(c) => {
                let c = non_empty(c);
                if c != next.commune {
                    next.village = None;
                }
                next.commune = c;
            }
            FilterChange::Village(v) => next.village = v,
            FilterChange::Motif(m) => next.motif = m,
            FilterChange::Sex(s) => next.sex = s,
            FilterChange::Category(c) => next.category = c,
            FilterChange::Clear => next = FilterSpec::default(),
        }
        next.normalized()
    }
}
