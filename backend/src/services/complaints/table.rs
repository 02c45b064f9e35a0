use crate::job_controller::state::DashboardState;
use crate::table::{render_page, TableState};
use actix_web::{web, HttpResponse, Responder};
use common::model::sort::SortSpec;
use common::requests::{ExpandRequest, PageRequest, SortRequest, TableQuery};

/// Renders the table; query parameters override the stored page and sort
/// for this response only.
pub(crate) async fn process(
    state: web::Data<DashboardState>,
    query: web::Query<TableQuery>,
) -> impl Responder {
    let view = state.view.read().await;
    let stored = &view.table;
    let table = TableState {
        page: query.page.unwrap_or(stored.page),
        sort: SortSpec {
            field: query.field.unwrap_or(stored.sort.field),
            direction: query.direction.unwrap_or(stored.sort.direction),
        },
        expanded_id: stored.expanded_id.clone(),
    };
    HttpResponse::Ok().json(render_page(&view.results, &table))
}

pub(crate) async fn sort(
    state: web::Data<DashboardState>,
    body: web::Json<SortRequest>,
) -> impl Responder {
    let field = body.field;
    HttpResponse::Ok().json(state.update_table(|t| t.toggle_sort(field)).await)
}

/// Moves to `page`, clamped to the existing pages.
pub(crate) async fn page(
    state: web::Data<DashboardState>,
    body: web::Json<PageRequest>,
) -> impl Responder {
    HttpResponse::Ok().json(state.go_to_page(body.page).await)
}

pub(crate) async fn expand(
    state: web::Data<DashboardState>,
    body: web::Json<ExpandRequest>,
) -> impl Responder {
    HttpResponse::Ok().json(state.update_table(|t| t.toggle_expand(&body.id)).await)
}
