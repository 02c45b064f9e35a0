//! SQLite-backed query service.
//!
//! Every request opens its own connection on a blocking thread
//! (`spawn_blocking`), the same way the rest of the backend talks to SQLite.
//! Dates are compared through `julianday()` so that mixed ISO spellings
//! (`T` or space separator, `Z` or offset suffix) order correctly.

use async_trait::async_trait;
use common::model::complaint::Complaint;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{Column, ComplaintQuery, ComplaintSource, OrderBy, Predicate};
use crate::error::QueryError;

const COLUMNS: &str = "id, parcel_number, date, activity, commune, village, complainant_name, \
     complainant_sex, complainant_id, complainant_contact, complaint_reason, complaint_category, \
     complaint_description, expected_resolution, complaint_reception_mode, created_at, \
     complaint_function, type_usage, nature_parcelle, source, sent_remote, data, remote_response";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS complaints (
    id TEXT PRIMARY KEY,
    parcel_number TEXT,
    date TEXT,
    activity TEXT,
    commune TEXT,
    village TEXT,
    complainant_name TEXT,
    complainant_sex TEXT,
    complainant_id TEXT,
    complainant_contact TEXT,
    complaint_reason TEXT,
    complaint_category TEXT,
    complaint_description TEXT,
    expected_resolution TEXT,
    complaint_reception_mode TEXT,
    created_at TEXT,
    complaint_function TEXT,
    type_usage TEXT,
    nature_parcelle TEXT,
    source TEXT,
    sent_remote INTEGER,
    data TEXT,
    remote_response TEXT
)";

#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the `complaints` table when it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), QueryError> {
        let conn = Connection::open(&self.path)?;
        conn.execute(SCHEMA, [])?;
        Ok(())
    }

    /// Inserts (or replaces) records, used to seed a local database.
    pub fn insert_complaints(&self, complaints: &[Complaint]) -> Result<usize, QueryError> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO complaints ({COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
            ))?;
            for c in complaints {
                stmt.execute(params![
                    c.id,
                    c.parcel_number,
                    c.date,
                    c.activity,
                    c.commune,
                    c.village,
                    c.complainant_name,
                    c.complainant_sex,
                    c.complainant_id,
                    c.complainant_contact,
                    c.complaint_reason,
                    c.complaint_category,
                    c.complaint_description,
                    c.expected_resolution,
                    c.complaint_reception_mode,
                    c.created_at,
                    c.complaint_function,
                    c.type_usage,
                    c.nature_parcelle,
                    c.source,
                    c.sent_remote,
                    c.data.as_ref().map(Value::to_string),
                    c.remote_response.as_ref().map(Value::to_string),
                ])?;
            }
        }
        tx.commit()?;
        Ok(complaints.len())
    }

    async fn run_blocking<T, F>(&self, job: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, QueryError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || job(&path))
            .await
            .map_err(|e| QueryError::Join(e.to_string()))?
    }
}

/// Builds `WHERE ... ORDER BY ... LIMIT ... OFFSET ...` and its bound values.
fn build_clauses(query: &ComplaintQuery) -> (String, Vec<SqlValue>) {
    let mut conditions = Vec::with_capacity(query.predicates.len());
    let mut values = Vec::with_capacity(query.predicates.len() + 2);

    for predicate in &query.predicates {
        let idx = values.len() + 1;
        let column = predicate.column();
        let condition = match predicate {
            Predicate::Gte(_, v) | Predicate::Lte(_, v) => {
                let op = if matches!(predicate, Predicate::Gte(..)) { ">=" } else { "<=" };
                values.push(SqlValue::Text(v.clone()));
                if column == Column::Date {
                    format!("julianday(date) {op} julianday(?{idx})")
                } else {
                    format!("{} {op} ?{idx}", column.as_str())
                }
            }
            Predicate::ILike(_, pattern) => {
                values.push(SqlValue::Text(pattern.clone()));
                format!("lower({}) LIKE lower(?{idx})", column.as_str())
            }
            Predicate::Eq(_, v) => {
                values.push(SqlValue::Text(v.clone()));
                format!("{} = ?{idx}", column.as_str())
            }
        };
        conditions.push(condition);
    }

    let mut sql = String::new();
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&order_clause(query.order));

    let idx = values.len() + 1;
    sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", idx, idx + 1));
    values.push(SqlValue::Integer(query.window.limit as i64));
    values.push(SqlValue::Integer(query.window.offset as i64));
    (sql, values)
}

fn order_clause(order: OrderBy) -> String {
    let direction = if order.ascending { "ASC" } else { "DESC" };
    let expr = match order.column {
        Column::Date => "julianday(date)".to_string(),
        other => other.as_str().to_string(),
    };
    // `id` keeps offset windows stable across requests when keys tie.
    if order.column == Column::Id {
        format!(" ORDER BY {expr} {direction}")
    } else {
        format!(" ORDER BY {expr} {direction}, id ASC")
    }
}

fn opaque_json(raw: Option<String>) -> Option<Value> {
    raw.map(|s| serde_json::from_str(&s).unwrap_or(Value::String(s)))
}

fn complaint_from_row(row: &Row) -> rusqlite::Result<Complaint> {
    Ok(Complaint {
        id: row.get(0)?,
        parcel_number: row.get(1)?,
        date: row.get(2)?,
        activity: row.get(3)?,
        commune: row.get(4)?,
        village: row.get(5)?,
        complainant_name: row.get(6)?,
        complainant_sex: row.get(7)?,
        complainant_id: row.get(8)?,
        complainant_contact: row.get(9)?,
        complaint_reason: row.get(10)?,
        complaint_category: row.get(11)?,
        complaint_description: row.get(12)?,
        expected_resolution: row.get(13)?,
        complaint_reception_mode: row.get(14)?,
        created_at: row.get(15)?,
        complaint_function: row.get(16)?,
        type_usage: row.get(17)?,
        nature_parcelle: row.get(18)?,
        source: row.get(19)?,
        sent_remote: row.get(20)?,
        data: opaque_json(row.get(21)?),
        remote_response: opaque_json(row.get(22)?),
    })
}

#[async_trait]
impl ComplaintSource for SqliteSource {
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>, QueryError> {
        let (clauses, values) = build_clauses(query);
        let sql = format!("SELECT {COLUMNS} FROM complaints{clauses}");
        debug!("sqlite page query: {}", sql);
        self.run_blocking(move |path| {
            let conn = Connection::open(path)?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), complaint_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn fetch_column(
        &self,
        column: Column,
        query: &ComplaintQuery,
    ) -> Result<Vec<Option<String>>, QueryError> {
        let (clauses, values) = build_clauses(query);
        let sql = format!("SELECT {} FROM complaints{clauses}", column.as_str());
        self.run_blocking(move |path| {
            let conn = Connection::open(path)?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| row.get::<_, Option<String>>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }
}
