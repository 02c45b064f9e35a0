//! Flat-file encodings of the loaded result set.
//!
//! Both encodings share one ordered, 23-column contract ([`HEADERS`] and
//! [`row`]) and always cover the full result set, never the current table
//! page.

use chrono::NaiveDate;
use common::model::complaint::Complaint;
use common::model::filter::FilterSpec;

mod delimited;
mod spreadsheet;

pub use delimited::to_delimited_text;
pub use spreadsheet::{to_spreadsheet, SHEET_NAME};

pub const COLUMN_COUNT: usize = 23;

pub const HEADERS: [&str; COLUMN_COUNT] = [
    "ID",
    "Date",
    "Commune",
    "Village",
    "Nom Plaignant",
    "Sexe",
    "ID Plaignant",
    "Contact",
    "Motif",
    "Catégorie",
    "Description",
    "Resolution Attendue",
    "Mode Reception",
    "Utilisation",
    "Nature Parcelle",
    "Activité",
    "N° Parcelle",
    "Fonction",
    "Date Création",
    "Source",
    "Envoyé",
    "Données Supplémentaires",
    "Réponse Serveur",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Xlsx => ".xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// One record laid out along [`HEADERS`]. Missing values become empty cells,
/// opaque payloads are written as compact JSON.
pub fn row(c: &Complaint) -> [String; COLUMN_COUNT] {
    [
        c.id.clone(),
        text(&c.date),
        text(&c.commune),
        text(&c.village),
        text(&c.complainant_name),
        text(&c.complainant_sex),
        text(&c.complainant_id),
        text(&c.complainant_contact),
        text(&c.complaint_reason),
        text(&c.complaint_category),
        text(&c.complaint_description),
        text(&c.expected_resolution),
        text(&c.complaint_reception_mode),
        text(&c.type_usage),
        text(&c.nature_parcelle),
        text(&c.activity),
        text(&c.parcel_number),
        text(&c.complaint_function),
        text(&c.created_at),
        text(&c.source),
        if c.sent_remote == Some(true) { "Oui" } else { "Non" }.to_string(),
        c.data.as_ref().map(|v| v.to_string()).unwrap_or_default(),
        c.remote_response.as_ref().map(|v| v.to_string()).unwrap_or_default(),
    ]
}

/// `<prefix>[_<commune>]_<yyyy-MM-dd><ext>`; the commune part only appears
/// while a commune filter is active.
pub fn filename(prefix: &str, filter: &FilterSpec, today: NaiveDate, format: ExportFormat) -> String {
    let commune = filter
        .commune
        .as_deref()
        .map(|c| format!("_{}", c))
        .unwrap_or_default();
    format!(
        "{}{}_{}{}",
        prefix,
        commune,
        today.format("%Y-%m-%d"),
        format.extension()
    )
}
