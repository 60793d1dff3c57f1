use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::Profile;
use crate::state::AppState;

/// GET /api/auth/profile - the signed-in administrator and their sheets
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let profile = state.auth.profile(user.user_id).await?;
    Ok(ApiResponse::success(profile))
}
