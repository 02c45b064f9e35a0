//! Client-side sorting and fixed-size pagination of the loaded result set.
//!
//! Sorting happens over the whole result set before slicing, so a page is
//! always a window of the fully sorted sequence. The sort is stable in both
//! directions: records with equal keys keep their fetch order.

use common::model::complaint::Complaint;
use common::model::sort::{SortDirection, SortField, SortSpec};
use common::model::table::TablePage;

pub const PAGE_SIZE: usize = 10;
const WINDOW_LEN: usize = 5;

/// Per-view table state: current page, sort, and the single expanded row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub page: usize,
    pub sort: SortSpec,
    pub expanded_id: Option<String>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 1,
            sort: SortSpec::default(),
            expanded_id: None,
        }
    }
}

impl TableState {
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = self.sort.toggled(field);
    }

    /// Opens `id`, or closes it when it is already the open row.
    pub fn toggle_expand(&mut self, id: &str) {
        if self.expanded_id.as_deref() == Some(id) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id.to_string());
        }
    }

    /// Back to the first page with every row collapsed; the sort is kept.
    pub fn reset_position(&mut self) {
        self.page = 1;
        self.expanded_id = None;
    }
}

/// Sort key of `field`; absent values sort as the empty string.
pub fn sort_key(complaint: &Complaint, field: SortField) -> &str {
    let value = match field {
        SortField::Date => complaint.date.as_deref(),
        SortField::Commune => complaint.commune.as_deref(),
        SortField::Village => complaint.village.as_deref(),
        SortField::ComplainantName => complaint.complainant_name.as_deref(),
        SortField::Category => complaint.complaint_category.as_deref(),
    };
    value.unwrap_or("")
}

pub fn sorted(records: &[Complaint], sort: SortSpec) -> Vec<&Complaint> {
    let mut rows: Vec<&Complaint> = records.iter().collect();
    rows.sort_by(|a, b| {
        let (ka, kb) = (sort_key(a, sort.field), sort_key(b, sort.field));
        match sort.direction {
            SortDirection::Asc => ka.cmp(kb),
            SortDirection::Desc => kb.cmp(ka),
        }
    });
    rows
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Returns page `page` (1-based) of the sorted records and the page count.
///
/// Out-of-range pages yield an empty slice; keeping `page` inside
/// `1..=total_pages` is the caller's job.
pub fn view<'a>(records: &'a [Complaint], sort: SortSpec, page: usize) -> (Vec<&'a Complaint>, usize) {
    let rows = sorted(records, sort);
    let start = page.saturating_sub(1) * PAGE_SIZE;
    let slice = rows.into_iter().skip(start).take(PAGE_SIZE).collect();
    (slice, total_pages(records.len()))
}

/// Page numbers shown by the pager around `current`.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    let first = if total_pages > WINDOW_LEN && current > 3 {
        current - 2
    } else {
        1
    };
    (first..first + WINDOW_LEN.min(total_pages))
        .filter(|p| *p <= total_pages)
        .collect()
}

/// Renders the table for `state` over `records`.
pub fn render_page(records: &[Complaint], state: &TableState) -> TablePage {
    let (rows, total_pages) = view(records, state.sort, state.page);
    let (first_index, last_index) = if rows.is_empty() {
        (0, 0)
    } else {
        let start = state.page.saturating_sub(1) * PAGE_SIZE;
        (start + 1, start + rows.len())
    };
    TablePage {
        page: state.page,
        total_pages,
        total: records.len(),
        first_index,
        last_index,
        window: page_window(state.page, total_pages),
        sort: state.sort,
        expanded_id: state.expanded_id.clone(),
        records: rows.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint(id: usize, commune: Option<&str>) -> Complaint {
        Complaint {
            id: format!("r{:02}", id),
            commune: commune.map(str::to_string),
            ..Default::default()
        }
    }

    /// 25 records, 12 of them in DAKAR.
    fn scenario() -> Vec<Complaint> {
        let others = ["THIES", "KAOLACK", "ZIGUINCHOR", "LOUGA", "MBOUR", "FATICK", "TOUBA", "ALMADIES", "BAMBEY", "PIKINE", "RUFISQUE", "YEUMBEUL", "GUEDIAWAYE"];
        let mut records: Vec<_> = (0..12).map(|i| complaint(i, Some("DAKAR"))).collect();
        records.extend(others.iter().enumerate().map(|(i, c)| complaint(12 + i, Some(c))));
        records
    }

    fn asc(field: SortField) -> SortSpec {
        SortSpec {
            field,
            direction: SortDirection::Asc,
        }
    }

    #[test]
    fn first_page_holds_the_smallest_values() {
        let records = scenario();
        let (page, total) = view(&records, asc(SortField::Commune), 1);
        assert_eq!(total, 3);
        assert_eq!(page.len(), PAGE_SIZE);
        let mut all: Vec<_> = records.iter().map(|c| c.commune.clone().unwrap()).collect();
        all.sort();
        let communes: Vec<_> = page.iter().map(|c| c.commune.clone().unwrap()).collect();
        assert_eq!(communes, all[..10].to_vec());
        assert_eq!(communes[0], "ALMADIES");
    }

    #[test]
    fn pages_concatenate_to_the_sorted_sequence() {
        let records = scenario();
        let sort = asc(SortField::Commune);
        let total = total_pages(records.len());
        assert_eq!(total, 25usize.div_ceil(10));
        let mut joined = Vec::new();
        for p in 1..=total {
            joined.extend(view(&records, sort, p).0);
        }
        assert_eq!(joined, sorted(&records, sort));
        assert!(view(&records, sort, total + 1).0.is_empty());
    }

    #[test]
    fn reversing_direction_reverses_distinct_keys() {
        let records = scenario();
        let up: Vec<_> = sorted(&records, asc(SortField::Commune));
        let down: Vec<_> = sorted(
            &records,
            SortSpec {
                field: SortField::Commune,
                direction: SortDirection::Desc,
            },
        );
        let pos = |rows: &[&Complaint], id: &str| rows.iter().position(|c| c.id == id).unwrap();
        for a in &records {
            for b in &records {
                if sort_key(a, SortField::Commune) < sort_key(b, SortField::Commune) {
                    assert!(pos(&up, &a.id) < pos(&up, &b.id));
                    assert!(pos(&down, &a.id) > pos(&down, &b.id));
                }
            }
        }
    }

    #[test]
    fn ties_keep_fetch_order_in_both_directions() {
        let records = scenario();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let rows = sorted(&records, SortSpec { field: SortField::Commune, direction });
            let dakar: Vec<_> = rows
                .iter()
                .filter(|c| c.commune.as_deref() == Some("DAKAR"))
                .map(|c| c.id.as_str())
                .collect();
            let expected: Vec<_> = (0..12).map(|i| format!("r{:02}", i)).collect();
            assert_eq!(dakar, expected);
        }
    }

    #[test]
    fn missing_values_sort_low() {
        let mut records = vec![complaint(0, Some("B")), complaint(1, None), complaint(2, Some("A"))];
        records[0].complaint_category = Some("sensible".into());
        records[2].complaint_category = Some("non_sensible".into());
        let ids: Vec<_> = sorted(&records, asc(SortField::Commune))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r01", "r02", "r00"]);
        let ids: Vec<_> = sorted(&records, asc(SortField::Category))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r01", "r02", "r00"]);
    }

    #[test]
    fn pager_window_follows_current_page() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 12), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(12, 12), vec![10, 11, 12]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn single_expanded_row() {
        let mut state = TableState::default();
        state.toggle_expand("a");
        state.toggle_expand("b");
        assert_eq!(state.expanded_id.as_deref(), Some("b"));
        state.toggle_expand("b");
        assert_eq!(state.expanded_id, None);
    }

    #[test]
    fn rendered_page_reports_display_range() {
        let records = scenario();
        let state = TableState {
            page: 3,
            sort: asc(SortField::Commune),
            expanded_id: None,
        };
        let page = render_page(&records, &state);
        assert_eq!((page.first_index, page.last_index, page.total), (21, 25, 25));
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.window, vec![1, 2, 3]);

        let empty = render_page(&[], &TableState::default());
        assert_eq!((empty.first_index, empty.last_index, empty.total_pages), (0, 0, 0));
    }
}
