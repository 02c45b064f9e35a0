use crate::job_controller::state::DashboardState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(state: web::Data<DashboardState>) -> impl Responder {
    HttpResponse::Ok().json(state.status().await)
}
