//! Paged retrieval of complete result sets.
//!
//! The query service only hands out bounded windows, so a full result set is
//! assembled by requesting page after page (strictly in index order, one at a
//! time) until a page comes back shorter than the page size. Any failed page
//! aborts the cycle and the pages gathered so far are dropped with it.

use chrono::NaiveDate;
use common::model::complaint::Complaint;
use common::model::filter::FilterSpec;
use log::debug;
use std::collections::BTreeSet;

use crate::error::QueryError;
use crate::source::{Column, ComplaintQuery, ComplaintSource, OrderBy, PageWindow, Predicate};

pub const PAGE_SIZE: usize = 1000;

/// Transient position of a fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub index: usize,
    pub size: usize,
}

impl PageCursor {
    pub fn first() -> Self {
        Self {
            index: 0,
            size: PAGE_SIZE,
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: self.index * self.size,
            limit: self.size,
        }
    }

    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }
}

fn start_of_day(day: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", day.format("%Y-%m-%d"))
}

fn end_of_day(day: NaiveDate) -> String {
    format!("{}T23:59:59.999Z", day.format("%Y-%m-%d"))
}

/// Translates every set constraint of `filter` into a native predicate.
pub fn predicates_for(filter: &FilterSpec) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(start) = filter.start_date {
        predicates.push(Predicate::Gte(Column::Date, start_of_day(start)));
    }
    if let Some(end) = filter.end_date {
        predicates.push(Predicate::Lte(Column::Date, end_of_day(end)));
    }
    if let Some(commune) = &filter.commune {
        predicates.push(Predicate::ILike(Column::Commune, commune.clone()));
    }
    if let Some(village) = &filter.village {
        predicates.push(Predicate::Eq(Column::Village, village.clone()));
    }
    if let Some(motif) = &filter.motif {
        predicates.push(Predicate::ILike(Column::ComplaintReason, format!("%{}%", motif)));
    }
    if let Some(sex) = filter.sex.code() {
        predicates.push(Predicate::Eq(Column::ComplainantSex, sex.to_string()));
    }
    if let Some(category) = filter.category.code() {
        predicates.push(Predicate::Eq(Column::ComplaintCategory, category.to_string()));
    }
    predicates
}

/// Fetches every complaint matching `filter`, newest first.
pub async fn fetch_all(
    source: &dyn ComplaintSource,
    filter: &FilterSpec,
) -> Result<Vec<Complaint>, QueryError> {
    fetch_all_with_progress(source, filter, |_| {}).await
}

/// Same as [`fetch_all`], calling `on_page` with the number of pages
/// received after each one lands.
pub async fn fetch_all_with_progress<F>(
    source: &dyn ComplaintSource,
    filter: &FilterSpec,
    mut on_page: F,
) -> Result<Vec<Complaint>, QueryError>
where
    F: FnMut(usize) + Send,
{
    let predicates = predicates_for(filter);
    let mut records = Vec::new();
    let mut cursor = PageCursor::first();

    loop {
        let query = ComplaintQuery {
            predicates: predicates.clone(),
            order: OrderBy {
                column: Column::Date,
                ascending: false,
            },
            window: cursor.window(),
        };
        let page = source.fetch_page(&query).await?;
        let received = page.len();
        debug!("page {} returned {} records", cursor.index, received);
        records.extend(page);
        on_page(cursor.index + 1);

        if received < cursor.size {
            break;
        }
        cursor = cursor.next();
    }

    Ok(records)
}

/// Pages through one projected column and returns its distinct values,
/// upper-cased, trimmed and sorted. Blank values are skipped.
async fn distinct_values(
    source: &dyn ComplaintSource,
    column: Column,
    predicates: Vec<Predicate>,
) -> Result<Vec<String>, QueryError> {
    let mut values = BTreeSet::new();
    let mut cursor = PageCursor::first();

    loop {
        let query = ComplaintQuery {
            predicates: predicates.clone(),
            order: OrderBy {
                column: Column::Id,
                ascending: true,
            },
            window: cursor.window(),
        };
        let page = source.fetch_column(column, &query).await?;
        let received = page.len();
        for value in page.into_iter().flatten() {
            let value = value.trim().to_uppercase();
            if !value.is_empty() {
                values.insert(value);
            }
        }
        if received < cursor.size {
            break;
        }
        cursor = cursor.next();
    }

    Ok(values.into_iter().collect())
}

/// Selectable communes. Case variants of one commune collapse into a single
/// upper-case entry here, while the aggregations keep raw stored values.
pub async fn distinct_communes(source: &dyn ComplaintSource) -> Result<Vec<String>, QueryError> {
    distinct_values(source, Column::Commune, Vec::new()).await
}

/// Selectable villages under `commune`; no commune means no villages and no
/// request.
pub async fn distinct_villages(
    source: &dyn ComplaintSource,
    commune: Option<&str>,
) -> Result<Vec<String>, QueryError> {
    match commune.filter(|c| !c.is_empty()) {
        Some(commune) => {
            distinct_values(
                source,
                Column::Village,
                vec![Predicate::ILike(Column::Commune, commune.to_string())],
            )
            .await
        }
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;
    use common::model::filter::{CategoryFilter, SexFilter};

    fn numbered(n: usize) -> Vec<Complaint> {
        (0..n)
            .map(|i| Complaint {
                id: format!("c{:05}", i),
                // distinct, strictly decreasing with i
                date: Some(
                    (NaiveDate::from_ymd_opt(2030, 1, 1).unwrap() - chrono::Days::new(i as u64))
                        .format("%Y-%m-%d")
                        .to_string(),
                ),
                commune: Some(if i % 2 == 0 { "Dakar" } else { "DAKAR" }.to_string()),
                village: Some(format!("v{}", i % 3)),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn stops_on_short_page() {
        let source = MemorySource::new(numbered(2500));
        let records = fetch_all(&source, &FilterSpec::default()).await.unwrap();
        assert_eq!(records.len(), 2500);
        assert_eq!(source.requests(), 3);
        let ids: Vec<_> = records.iter().map(|c| c.id.clone()).collect();
        let expected: Vec<_> = (0..2500).map(|i| format!("c{:05}", i)).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn exact_multiple_needs_a_final_empty_page() {
        let source = MemorySource::new(numbered(2000));
        let records = fetch_all(&source, &FilterSpec::default()).await.unwrap();
        assert_eq!(records.len(), 2000);
        assert_eq!(source.requests(), 3);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let source = MemorySource::new(Vec::new());
        let records = fetch_all(&source, &FilterSpec::default()).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn failed_page_discards_everything() {
        let source = MemorySource::new(numbered(2500));
        source.fail_on_request(2);
        let err = fetch_all(&source, &FilterSpec::default()).await.unwrap_err();
        assert!(matches!(err, QueryError::Rejected(_)));
        assert_eq!(source.requests(), 2);
    }

    #[tokio::test]
    async fn reports_progress_per_page() {
        let source = MemorySource::new(numbered(1500));
        let mut seen = Vec::new();
        fetch_all_with_progress(&source, &FilterSpec::default(), |p| seen.push(p))
            .await
            .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn translates_only_set_constraints() {
        assert!(predicates_for(&FilterSpec::default()).is_empty());

        let filter = FilterSpec {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            commune: Some("Dakar".into()),
            village: Some("Yoff".into()),
            motif: Some("bornage".into()),
            sex: SexFilter::F,
            category: CategoryFilter::NonSensible,
        };
        assert_eq!(
            predicates_for(&filter),
            vec![
                Predicate::Gte(Column::Date, "2024-01-01T00:00:00.000Z".into()),
                Predicate::Lte(Column::Date, "2024-01-31T23:59:59.999Z".into()),
                Predicate::ILike(Column::Commune, "Dakar".into()),
                Predicate::Eq(Column::Village, "Yoff".into()),
                Predicate::ILike(Column::ComplaintReason, "%bornage%".into()),
                Predicate::Eq(Column::ComplainantSex, "F".into()),
                Predicate::Eq(Column::ComplaintCategory, "non_sensible".into()),
            ]
        );
    }

    #[tokio::test]
    async fn village_without_commune_still_fetches() {
        let source = MemorySource::new(numbered(30));
        let filter = FilterSpec {
            village: Some("v1".into()),
            ..Default::default()
        };
        let records = fetch_all(&source, &filter).await.unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn commune_options_fold_case_variants() {
        let source = MemorySource::new(numbered(2100));
        let communes = distinct_communes(&source).await.unwrap();
        assert_eq!(communes, vec!["DAKAR".to_string()]);
        assert_eq!(source.requests(), 3);
    }

    #[tokio::test]
    async fn village_options_need_a_commune() {
        let source = MemorySource::new(numbered(9));
        assert!(distinct_villages(&source, None).await.unwrap().is_empty());
        assert_eq!(source.requests(), 0);

        let villages = distinct_villages(&source, Some("dakar")).await.unwrap();
        assert_eq!(villages, vec!["V0", "V1", "V2"]);
    }
}
