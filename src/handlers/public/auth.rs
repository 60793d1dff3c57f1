use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::services::ServiceError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /auth/google - send the browser to Google's consent page
pub async fn google_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.auth.authorize_url())
}

/// GET /auth/google/callback - finish sign-in and hand the session to the frontend
///
/// Unknown or non-admin accounts are redirected to the frontend's
/// unauthorized page rather than receiving an error body.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Authorization code not provided"))?;

    let outcome = state.auth.complete_login(&code).await.map_err(login_failure)?;
    let location = state.auth.redirect_for(&outcome).map_err(login_failure)?;

    info!("OAuth callback finished, redirecting");
    Ok(Redirect::to(&location))
}

fn login_failure(err: ServiceError) -> ApiError {
    tracing::error!("Authentication failed: {}", err);
    ApiError::internal_server_error("Authentication failed")
}
