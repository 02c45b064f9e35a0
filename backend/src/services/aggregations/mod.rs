//! Chart series derived from the loaded result set.
//!
//! Every route reads the current result set snapshot and never triggers a
//! fetch. While a cycle is loading, the previous result set is served.
//!
//! The provided routes are:
//! - `GET /api/aggregations/communes`: top communes by complaint count.
//! - `GET /api/aggregations/villages?n=`: top `n` villages (default 10).
//! - `GET /api/aggregations/reasons`: complaints per reason.
//! - `GET /api/aggregations/sex`: complaints per complainant sex.
//! - `GET /api/aggregations/dates?interval=day|week|month`: date series.
//! - `GET /api/aggregations/summary`: headline counters.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod series;

const API_PATH: &str = "/api/aggregations";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/communes", get().to(series::communes))
        .route("/villages", get().to(series::villages))
        .route("/reasons", get().to(series::reasons))
        .route("/sex", get().to(series::sex))
        .route("/dates", get().to(series::dates))
        .route("/summary", get().to(series::summary))
}
