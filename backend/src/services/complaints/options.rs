use crate::fetcher::{distinct_communes, distinct_villages};
use crate::job_controller::state::DashboardState;
use crate::services::query_failure;
use actix_web::{web, HttpResponse, Responder};
use common::requests::VillagesQuery;

pub(crate) async fn communes(state: web::Data<DashboardState>) -> impl Responder {
    match distinct_communes(state.source.as_ref()).await {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => query_failure(e),
    }
}

/// Villages of `commune`; empty when no commune is given.
pub(crate) async fn villages(
    state: web::Data<DashboardState>,
    query: web::Query<VillagesQuery>,
) -> impl Responder {
    let commune = query.commune.as_deref().filter(|c| !c.trim().is_empty());
    match distinct_villages(state.source.as_ref(), commune).await {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => query_failure(e),
    }
}
