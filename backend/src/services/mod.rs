use actix_web::HttpResponse;
use log::error;

use crate::error::{ExportError, QueryError};

pub mod aggregations;
pub mod complaints;
pub mod export;

/// A query service failure, reported as 503 with its message.
pub(crate) fn query_failure(e: QueryError) -> HttpResponse {
    error!("query failed: {}", e);
    HttpResponse::ServiceUnavailable().body(e.to_string())
}

pub(crate) fn export_failure(e: ExportError) -> HttpResponse {
    error!("export failed: {}", e);
    HttpResponse::InternalServerError().body(e.to_string())
}
