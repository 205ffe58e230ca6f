use crate::catalog::Category;
use crate::output::{encode_csv, export_file_name, write_export};
use crate::server::{AppError, AppState};
use crate::HarvestError;
use axum::{
    extract::{Path, State},
    http::header::{self, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

pub async fn health_check() -> &'static str {
    "ok"
}

/// Lists every configured category as `{ id, name }`
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog.iter().cloned().collect())
}

/// Crawls one category and returns the CSV as an attachment
///
/// A copy is written to the export directory when one is configured; failing
/// to write it does not fail the download.
pub async fn category_courses(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Response, AppError> {
    let category = state
        .catalog
        .get(&category_id)
        .ok_or_else(|| HarvestError::UnknownCategory(category_id.clone()))?;

    tracing::info!("Crawling category {} ({})", category.id, category.listing_url);
    let result = state
        .orchestrator
        .crawl(&category.crawl_request(&state.config))
        .await?;

    let csv = encode_csv(
        &state.config.header_labels(),
        &result.records,
        &state.config.field_order(),
    );
    let file_name = export_file_name(&category.id, Utc::now());

    if let Some(dir) = &state.config.output.export_dir {
        if let Err(e) = write_export(std::path::Path::new(dir), &file_name, &csv) {
            tracing::warn!("Failed to persist export {}: {}", file_name, e);
        }
    }

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
        (
            HeaderName::from_static("x-crawl-failures"),
            result.failures.len().to_string(),
        ),
    ];

    Ok((headers, csv).into_response())
}
