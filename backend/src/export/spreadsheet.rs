use common::model::complaint::Complaint;
use rust_xlsxwriter::{Format, Workbook};

use super::{row, HEADERS};
use crate::error::ExportError;

pub const SHEET_NAME: &str = "Plaintes";

/// Longest text a single worksheet cell may hold, in characters.
pub const CELL_LIMIT: usize = 32_767;

/// Cuts `value` to [`CELL_LIMIT`] characters.
fn fit_cell(value: &str) -> &str {
    match value.char_indices().nth(CELL_LIMIT) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// One sheet named [`SHEET_NAME`]: a bold header row of French labels, then
/// one row per record. Empty values leave the cell blank; values over the
/// worksheet cell limit are truncated.
pub fn to_spreadsheet(records: &[Complaint]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }
    for (idx, complaint) in records.iter().enumerate() {
        let line = (idx + 1) as u32;
        for (col, value) in row(complaint).iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(line, col as u16, fit_cell(value))?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
