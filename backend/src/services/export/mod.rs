//! Downloads of the full loaded result set.
//!
//! - `GET /api/export/csv`: every field double-quoted, UTF-8.
//! - `GET /api/export/xlsx`: one worksheet named `Plaintes`.
//!
//! Both are attachments named `<prefix>[_<commune>]_<yyyy-MM-dd>.<ext>`, the
//! prefix coming from `AppConfig::export_prefix`.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod download;

const API_PATH: &str = "/api/export";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/csv", get().to(download::csv))
        .route("/xlsx", get().to(download::xlsx))
}
