use serde::{Deserialize, Serialize};

use crate::model::complaint::Complaint;
use crate::model::sort::SortSpec;

/// One rendered page of the complaints table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    /// 1-based page number that was requested.
    pub page: usize,
    pub total_pages: usize,
    /// Number of records in the whole result set.
    pub total: usize,
    /// 1-based display range ("showing 11 to 20 of 25").
    pub first_index: usize,
    pub last_index: usize,
    /// Page numbers offered by the pager around `page`.
    pub window: Vec<usize>,
    pub sort: SortSpec,
    /// Record whose detail row is open, if any.
    pub expanded_id: Option<String>,
    pub records: Vec<Complaint>,
}
