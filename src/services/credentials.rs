use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::{TokenUpdate, UserStore};
use crate::google::{AccessToken, IdentityProvider};

/// Tokens are refreshed this long before Google would reject them.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Resolves the Google access token stored for a user, refreshing it when it
/// is about to expire.
#[derive(Clone)]
pub struct Credentials {
    users: Arc<dyn UserStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl Credentials {
    pub fn new(users: Arc<dyn UserStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    pub async fn for_user(&self, user_id: Uuid) -> ServiceResult<AccessToken> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .inspect_err(|e| error!("Failed to load user {} for credentials: {}", user_id, e))?
            .ok_or_else(|| ServiceError::Unauthorized(format!("Unknown user {}", user_id)))?;

        let Some(access_token) = user.access_token.clone() else {
            warn!("User {} has no Google access token on file", user_id);
            return Err(ServiceError::Unauthorized(
                "No Google credentials on file, sign in again".to_string(),
            ));
        };

        if !needs_refresh(user.token_expires_at, Utc::now()) {
            return Ok(AccessToken(access_token));
        }

        let Some(refresh_token) = user.refresh_token.as_deref() else {
            warn!("Access token for user {} is stale and there is no refresh token", user_id);
            return Ok(AccessToken(access_token));
        };

        let tokens = self
            .identity
            .refresh(refresh_token)
            .await
            .inspect_err(|e| error!("Token refresh failed for user {}: {}", user_id, e))?;

        self.users
            .update_tokens(
                user_id,
                TokenUpdate {
                    access_token: tokens.access_token.clone(),
                    refresh_token: tokens.refresh_token,
                    expires_at: tokens.expires_at,
                    name: None,
                    picture: None,
                },
            )
            .await
            .inspect_err(|e| error!("Failed to store refreshed token for user {}: {}", user_id, e))?;

        info!("Refreshed Google access token for user {}", user_id);
        Ok(AccessToken(tokens.access_token))
    }
}

/// Unknown expiry is trusted; the API call will fail loudly if it is wrong.
fn needs_refresh(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(at) => at <= now + Duration::seconds(REFRESH_MARGIN_SECS),
        None => false,
    }
}
