use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two recognised values of the free-text `complaint_category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "sensible")]
    Sensible,
    #[serde(rename = "non_sensible")]
    NonSensible,
}

impl Category {
    /// The value as stored remotely, also used as the sort key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sensible => "sensible",
            Category::NonSensible => "non_sensible",
        }
    }

    /// Recognises a stored value; anything else is no category.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sensible" => Some(Category::Sensible),
            "non_sensible" => Some(Category::NonSensible),
            _ => None,
        }
    }
}

/// Complainant sex as it is bucketed for charts.
///
/// The store keeps a free `complainant_sex` code; only `M` and `F` are
/// recognised, everything else (including null) is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("M") => Sex::Male,
            Some("F") => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    /// Human-readable chart label.
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Masculin",
            Sex::Female => "Féminin",
            Sex::Unknown => "Inconnu",
        }
    }
}

/// One citizen-filed grievance, exactly as the remote `complaints` table
/// returns it.
///
/// Apart from `id` every column is nullable upstream, so every field is
/// optional and defaults to `None` when the column is missing from the row.
/// Timestamps stay raw strings; parsing happens where a calendar value is
/// actually needed (time bucketing). `complaint_category` is kept as stored
/// too, so an unexpected value never breaks decoding and is exported as is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Complaint {
    pub id: String,
    pub parcel_number: Option<String>,
    pub date: Option<String>,
    pub activity: Option<String>,
    pub commune: Option<String>,
    pub village: Option<String>,
    pub complainant_name: Option<String>,
    pub complainant_sex: Option<String>,
    pub complainant_id: Option<String>,
    pub complainant_contact: Option<String>,
    pub complaint_reason: Option<String>,
    pub complaint_category: Option<String>,
    pub complaint_description: Option<String>,
    pub expected_resolution: Option<String>,
    pub complaint_reception_mode: Option<String>,
    pub created_at: Option<String>,
    pub complaint_function: Option<String>,
    pub type_usage: Option<String>,
    pub nature_parcelle: Option<String>,
    pub source: Option<String>,
    pub sent_remote: Option<bool>,
    pub data: Option<Value>,
    pub remote_response: Option<Value>,
}

impl Complaint {
    pub fn sex(&self) -> Sex {
        Sex::from_code(self.complainant_sex.as_deref())
    }

    pub fn category(&self) -> Option<Category> {
        self.complaint_category.as_deref().and_then(Category::parse)
    }

    pub fn is_sensitive(&self) -> bool {
        self.category() == Some(Category::Sensible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_rows() {
        let row = r#"{"id":"c1","commune":"Dakar","complaint_category":"non_sensible","data":{"k":1},"complainant_sex":null}"#;
        let c: Complaint = serde_json::from_str(row).unwrap();
        assert_eq!(c.id, "c1");
        assert_eq!(c.commune.as_deref(), Some("Dakar"));
        assert_eq!(c.category(), Some(Category::NonSensible));
        assert_eq!(c.sex(), Sex::Unknown);
        assert!(c.date.is_none());
        assert_eq!(c.data, Some(serde_json::json!({"k": 1})));
    }

    #[test]
    fn unknown_categories_decode_and_are_kept() {
        let page = r#"[
            {"id":"c1","complaint_category":"sensible"},
            {"id":"c2","complaint_category":""},
            {"id":"c3","complaint_category":"Sensible"},
            {"id":"c4","complaint_category":null}
        ]"#;
        let rows: Vec<Complaint> = serde_json::from_str(page).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_sensitive());
        assert_eq!(rows[1].complaint_category.as_deref(), Some(""));
        assert_eq!(rows[2].complaint_category.as_deref(), Some("Sensible"));
        assert_eq!(rows[2].category(), None);
        assert!(!rows[2].is_sensitive());
        assert_eq!(rows[3].complaint_category, None);
    }

    #[test]
    fn only_m_and_f_are_recognised() {
        assert_eq!(Sex::from_code(Some("M")), Sex::Male);
        assert_eq!(Sex::from_code(Some("F")), Sex::Female);
        assert_eq!(Sex::from_code(Some("m")), Sex::Unknown);
        assert_eq!(Sex::from_code(None), Sex::Unknown);
    }
}
