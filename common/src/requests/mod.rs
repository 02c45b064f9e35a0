use serde::Deserialize;

use crate::model::aggregate::TimeInterval;
use crate::model::sort::{SortDirection, SortField};

#[derive(Deserialize)]
/// Query string of the table endpoint. Missing values fall back to the
/// table's current page and sort.
pub struct TableQuery {
    pub page: Option<usize>,
    pub field: Option<SortField>,
    pub direction: Option<SortDirection>,
}

#[derive(Deserialize)]
pub struct SortRequest {
    pub field: SortField,
}

#[derive(Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

#[derive(Deserialize)]
pub struct ExpandRequest {
    pub id: String,
}

#[derive(Deserialize)]
pub struct VillagesQuery {
    pub commune: Option<String>,
}

#[derive(Deserialize)]
pub struct TopVillagesQuery {
    pub n: Option<usize>,
}

#[derive(Deserialize)]
pub struct DateSeriesQuery {
    #[serde(default)]
    pub interval: TimeInterval,
}
