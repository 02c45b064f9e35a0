use common::model::complaint::Complaint;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{row, HEADERS};
use crate::error::ExportError;

/// UTF-8, comma separated, header first, every field quoted and inner
/// quotes doubled.
pub fn to_delimited_text(records: &[Complaint]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for complaint in records {
        writer.write_record(row(complaint))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
