use crate::config::AppConfig;
use crate::error::ExportError;
use crate::export::{filename, to_delimited_text, to_spreadsheet, ExportFormat};
use crate::job_controller::state::DashboardState;
use crate::services::export_failure;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse, Responder};
use log::info;

pub(crate) async fn csv(
    state: web::Data<DashboardState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    download(&state, &config, ExportFormat::Csv).await
}

pub(crate) async fn xlsx(
    state: web::Data<DashboardState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    download(&state, &config, ExportFormat::Xlsx).await
}

async fn download(state: &DashboardState, config: &AppConfig, format: ExportFormat) -> HttpResponse {
    let (records, filter) = state.snapshot().await;
    let count = records.len();

    // runs on the blocking pool
    let encoded = web::block(move || match format {
        ExportFormat::Csv => to_delimited_text(&records),
        ExportFormat::Xlsx => to_spreadsheet(&records),
    })
    .await;
    let bytes = match encoded {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => return export_failure(e),
        Err(e) => return export_failure(ExportError::Io(std::io::Error::other(e.to_string()))),
    };

    let today = chrono::Local::now().date_naive();
    let name = filename(&config.export_prefix, &filter, today, format);
    info!("exporting {} complaints as {}", count, name);
    HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header(ContentDisposition::attachment(name))
        .body(bytes)
}
