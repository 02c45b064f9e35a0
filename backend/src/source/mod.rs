//! The remote query service, seen as an opaque paginated filtered-query
//! interface over one logical `complaints` table.
//!
//! Callers describe a query with [`ComplaintQuery`] (predicates, one ordering
//! column and an offset/limit window) and hand it to a [`ComplaintSource`].
//! The source is passed explicitly into the fetcher, so tests substitute
//! [`memory::MemorySource`] for the real backends.

use async_trait::async_trait;
use common::model::complaint::Complaint;

use crate::error::QueryError;

pub mod memory;
pub mod rest;
pub mod sqlite;

/// Columns that queries can filter, order or project on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Date,
    Commune,
    Village,
    ComplaintReason,
    ComplainantSex,
    ComplaintCategory,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Date => "date",
            Column::Commune => "commune",
            Column::Village => "village",
            Column::ComplaintReason => "complaint_reason",
            Column::ComplainantSex => "complainant_sex",
            Column::ComplaintCategory => "complaint_category",
        }
    }

    /// Reads the column out of a fetched record.
    pub fn value_of(&self, complaint: &Complaint) -> Option<String> {
        match self {
            Column::Id => Some(complaint.id.clone()),
            Column::Date => complaint.date.clone(),
            Column::Commune => complaint.commune.clone(),
            Column::Village => complaint.village.clone(),
            Column::ComplaintReason => complaint.complaint_reason.clone(),
            Column::ComplainantSex => complaint.complainant_sex.clone(),
            Column::ComplaintCategory => complaint.complaint_category.clone(),
        }
    }
}

/// A single pushed-down constraint, in the service's native form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Gte(Column, String),
    Lte(Column, String),
    /// Case-insensitive pattern; `%` matches any run, `_` one character.
    ILike(Column, String),
    Eq(Column, String),
}

impl Predicate {
    pub fn column(&self) -> Column {
        match self {
            Predicate::Gte(c, _)
            | Predicate::Lte(c, _)
            | Predicate::ILike(c, _)
            | Predicate::Eq(c, _) => *c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub ascending: bool,
}

/// Offset/length window of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintQuery {
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
    pub window: PageWindow,
}

#[async_trait]
pub trait ComplaintSource: Send + Sync {
    /// Returns one window of full records matching `query`.
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>, QueryError>;

    /// Returns one window of a single-column projection. Null cells are
    /// kept as `None` so the window length still reflects the row count.
    async fn fetch_column(
        &self,
        column: Column,
        query: &ComplaintQuery,
    ) -> Result<Vec<Option<String>>, QueryError>;
}
