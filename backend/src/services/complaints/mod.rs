//! Filters, fetch status, option lists and the complaints table.
//!
//! The provided routes are:
//! - `GET /api/complaints/status`: the `FetchStatus` of the latest issued cycle.
//! - `GET /api/complaints/filters` and `PUT /api/complaints/filters`: read or
//!   replace the active `FilterSpec`. Replacing it with an equal filter does
//!   not start a cycle.
//! - `POST /api/complaints/filters/change`: applies one `FilterChange`
//!   (e.g. `{"field": "commune", "value": "DAKAR"}`).
//! - `POST /api/complaints/refresh`: starts a new cycle for the active filter.
//! - `GET /api/complaints/options/communes` and
//!   `GET /api/complaints/options/villages?commune=`: distinct values for the
//!   filter selects.
//! - `GET /api/complaints/table`, `POST /api/complaints/table/sort`,
//!   `POST /api/complaints/table/page`, `POST /api/complaints/table/expand`:
//!   the sorted, paginated table over the loaded result set.

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

mod filters;
mod options;
mod status;
mod table;

const API_PATH: &str = "/api/complaints";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/status", get().to(status::process))
        .route("/filters", get().to(filters::current))
        .route("/filters", put().to(filters::replace))
        .route("/filters/change", post().to(filters::change))
        .route("/refresh", post().to(filters::refresh))
        .route("/options/communes", get().to(options::communes))
        .route("/options/villages", get().to(options::villages))
        .route("/table", get().to(table::process))
        .route("/table/sort", post().to(table::sort))
        .route("/table/page", post().to(table::page))
        .route("/table/expand", post().to(table::expand))
}
