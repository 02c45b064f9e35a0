use crate::job_controller::state::DashboardState;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::CycleTicket;
use common::model::filter::{FilterChange, FilterSpec};

pub(crate) async fn current(state: web::Data<DashboardState>) -> impl Responder {
    HttpResponse::Ok().json(state.filter().await)
}

pub(crate) async fn replace(
    state: web::Data<DashboardState>,
    filter: web::Json<FilterSpec>,
) -> impl Responder {
    let started = state.issue(filter.into_inner()).await.is_some();
    ticket(&state, started).await
}

pub(crate) async fn change(
    state: web::Data<DashboardState>,
    change: web::Json<FilterChange>,
) -> impl Responder {
    let started = state.change(change.into_inner()).await.is_some();
    ticket(&state, started).await
}

pub(crate) async fn refresh(state: web::Data<DashboardState>) -> impl Responder {
    state.refresh().await;
    ticket(&state, true).await
}

async fn ticket(state: &DashboardState, started: bool) -> HttpResponse {
    HttpResponse::Accepted().json(CycleTicket {
        started,
        status: state.status().await,
    })
}
