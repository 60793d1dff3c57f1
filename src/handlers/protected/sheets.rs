use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::database::PersistedSheet;
use crate::google::RecentDocument;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ProcessedSheet;
use crate::sheets::CellValue;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    /// Kept as text so a bad value falls back to the default instead of a 400.
    pub max_results: Option<String>,
}

/// GET /api/sheets/recent?maxResults=
pub async fn recent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Vec<RecentDocument>> {
    let documents = state
        .sheets
        .list_recent(user.user_id, query.max_results.as_deref())
        .await?;
    Ok(ApiResponse::success(documents))
}

/// GET /api/sheets/:id - a stored grouped sheet
pub async fn sheet_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PersistedSheet> {
    let sheet = state.sheets.get_sheet(&id).await?;
    Ok(ApiResponse::success(sheet))
}

/// GET /api/sheets/:sheet_id/headers - first row of the document
pub async fn headers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(sheet_id): Path<String>,
) -> ApiResult<Vec<CellValue>> {
    let headers = state.sheets.headers(user.user_id, &sheet_id).await?;
    Ok(ApiResponse::success(headers))
}

/// GET /api/sheets/:sheet_id/process-raw/:group_name
pub async fn process_raw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((sheet_id, group_name)): Path<(String, String)>,
) -> ApiResult<ProcessedSheet> {
    let processed = state
        .sheets
        .process(user.user_id, &sheet_id, &group_name)
        .await?;
    Ok(ApiResponse::success(processed))
}

/// GET /api/sheets/:sheet_id/process-raw - no group name given
///
/// Still answers from the store when a sheet was saved under an empty group
/// column; otherwise this is a validation error.
pub async fn process_raw_without_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(sheet_id): Path<String>,
) -> ApiResult<ProcessedSheet> {
    let processed = state.sheets.process(user.user_id, &sheet_id, "").await?;
    Ok(ApiResponse::success(processed))
}
