use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::{generate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::database::{Role, SheetRef, TokenUpdate, User, UserStore};
use crate::google::IdentityProvider;

/// Where a finished OAuth callback leaves the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authorized { token: String, user: User },
    Rejected { email: String },
}

/// Signed-in administrator as returned by `/api/auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub role: Role,
    pub sheets: Vec<SheetRef>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            picture: user.picture,
            role: user.role,
            sheets: user.sheets,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    identity: Arc<dyn IdentityProvider>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityProvider>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            users,
            identity,
            security,
        }
    }

    pub fn authorize_url(&self) -> String {
        self.identity.authorize_url()
    }

    /// Exchange an authorization code and sign in a known administrator.
    ///
    /// Only users already on file with the admin role get a session token.
    pub async fn complete_login(&self, code: &str) -> ServiceResult<LoginOutcome> {
        if code.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Authorization code not provided".to_string(),
            ));
        }

        let tokens = self
            .identity
            .exchange_code(code)
            .await
            .inspect_err(|e| error!("Authorization code exchange failed: {}", e))?;

        let access = crate::google::AccessToken(tokens.access_token.clone());
        let profile = self
            .identity
            .user_info(&access)
            .await
            .inspect_err(|e| error!("Failed to load Google profile: {}", e))?;

        let user = match self.users.find_by_email(&profile.email).await? {
            Some(user) if user.is_admin() => user,
            Some(_) => {
                warn!("Rejected login for non-admin {}", profile.email);
                return Ok(LoginOutcome::Rejected { email: profile.email });
            }
            None => {
                warn!("Rejected login for unknown user {}", profile.email);
                return Ok(LoginOutcome::Rejected { email: profile.email });
            }
        };

        let user = self
            .users
            .update_tokens(
                user.id,
                TokenUpdate {
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                    expires_at: tokens.expires_at,
                    name: profile.name,
                    picture: profile.picture,
                },
            )
            .await
            .inspect_err(|e| error!("Failed to store tokens for {}: {}", user.email, e))?;

        let claims = Claims::for_user(&user, self.security.jwt_expiry_hours);
        let token = generate_jwt(&claims, &self.security)?;

        info!("Administrator {} signed in", user.email);
        Ok(LoginOutcome::Authorized { token, user })
    }

    /// Frontend location for a finished login.
    pub fn redirect_for(&self, outcome: &LoginOutcome) -> ServiceResult<String> {
        let base = self.security.frontend_url.trim_end_matches('/');

        match outcome {
            LoginOutcome::Authorized { token, .. } => {
                let url = Url::parse_with_params(base, &[("token", token.as_str())]).map_err(|e| {
                    error!("Invalid frontend URL '{}': {}", base, e);
                    ServiceError::Internal(format!("Invalid frontend URL '{}'", base))
                })?;
                Ok(url.to_string())
            }
            LoginOutcome::Rejected { .. } => Ok(format!("{}/admin/unauthorized", base)),
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<Profile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(Profile::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validate_jwt;
    use crate::config::AppConfig;
    use crate::database::MemoryUserStore;
    use crate::testing::{admin_user, StubIdentity};

    fn security() -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.jwt_secret = "test-secret".into();
        security.frontend_url = "http://localhost:5173".into();
        security
    }

    async fn service_with(user: Option<User>, identity: StubIdentity) -> (AuthService, MemoryUserStore) {
        let users = MemoryUserStore::new();
        if let Some(user) = user {
            users.put(user).await;
        }
        let service = AuthService::new(Arc::new(users.clone()), Arc::new(identity), security());
        (service, users)
    }

    #[tokio::test]
    async fn admin_login_stores_tokens_and_issues_jwt() {
        let admin = admin_user("admin@example.com");
        let (service, users) = service_with(Some(admin.clone()), StubIdentity::issuing("fresh")).await;

        let outcome = service.complete_login("code-123").await.unwrap();
        let LoginOutcome::Authorized { token, user } = &outcome else {
            panic!("expected an authorized login, got {:?}", outcome);
        };

        let claims = validate_jwt(token, &security()).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(user.picture.as_deref(), Some("https://example.com/avatar.png"));

        let stored = users.find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("fresh"));
        // no refresh token came back, the old one stays
        assert_eq!(stored.refresh_token.as_deref(), Some("test-refresh-token"));

        let location = service.redirect_for(&outcome).unwrap();
        assert!(location.starts_with("http://localhost:5173/?token="));
    }

    #[tokio::test]
    async fn non_admin_is_rejected() {
        let mut user = admin_user("viewer@example.com");
        user.role = Role::User;
        let identity = StubIdentity::issuing("fresh").for_email("viewer@example.com");
        let (service, users) = service_with(Some(user.clone()), identity).await;

        let outcome = service.complete_login("code").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected { email: "viewer@example.com".into() });
        assert_eq!(
            service.redirect_for(&outcome).unwrap(),
            "http://localhost:5173/admin/unauthorized"
        );

        let stored = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("test-access-token"));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let (service, _) = service_with(None, StubIdentity::issuing("fresh")).await;

        let outcome = service.complete_login("code").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn missing_code_and_provider_failure() {
        let (service, _) = service_with(None, StubIdentity::failing()).await;

        assert!(matches!(
            service.complete_login("").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.complete_login("code").await,
            Err(ServiceError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn profile_lists_linked_sheets() {
        let mut admin = admin_user("admin@example.com");
        admin.sheets.push(SheetRef { id: Uuid::new_v4(), title: "Orders".into() });
        let (service, _) = service_with(Some(admin.clone()), StubIdentity::failing()).await;

        let profile = service.profile(admin.id).await.unwrap();
        assert_eq!(profile.email, "admin@example.com");
        assert_eq!(profile.sheets, admin.sheets);

        assert!(matches!(
            service.profile(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
