use crate::analytics;
use crate::job_controller::state::DashboardState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{DateSeriesQuery, TopVillagesQuery};

pub(crate) async fn communes(state: web::Data<DashboardState>) -> impl Responder {
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::by_commune(&results))
}

pub(crate) async fn villages(
    state: web::Data<DashboardState>,
    query: web::Query<TopVillagesQuery>,
) -> impl Responder {
    let n = query.n.unwrap_or(analytics::DEFAULT_VILLAGE_LIMIT);
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::by_village_top_n(&results, n))
}

pub(crate) async fn reasons(state: web::Data<DashboardState>) -> impl Responder {
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::by_reason(&results))
}

pub(crate) async fn sex(state: web::Data<DashboardState>) -> impl Responder {
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::by_sex(&results))
}

pub(crate) async fn dates(
    state: web::Data<DashboardState>,
    query: web::Query<DateSeriesQuery>,
) -> impl Responder {
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::by_date(&results, query.interval))
}

pub(crate) async fn summary(state: web::Data<DashboardState>) -> impl Responder {
    let results = state.results().await;
    HttpResponse::Ok().json(analytics::summary(&results))
}
