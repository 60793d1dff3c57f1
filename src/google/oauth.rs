use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{check_status, AccessToken, GoogleError, IdentityProvider, TokenSet, UserProfile};
use crate::config::GoogleConfig;

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URI: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// OAuth 2.0 web-server flow against Google's endpoints.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl From<TokenResponse> for TokenSet {
    fn from(resp: TokenResponse) -> Self {
        TokenSet {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_at: resp.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

impl GoogleOAuthClient {
    pub fn new(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self { http, config }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, GoogleError> {
        let resp = self.http.post(TOKEN_URI).form(form).send().await?;
        let token: TokenResponse = check_status(resp).await?.json().await?;
        Ok(token.into())
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorize_url(&self) -> String {
        let scope = self.config.scopes.join(" ");
        Url::parse_with_params(
            AUTH_URI,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map(String::from)
        .unwrap_or_else(|_| AUTH_URI.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, GoogleError> {
        debug!("Exchanging authorization code");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, GoogleError> {
        debug!("Refreshing Google access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }

    async fn user_info(&self, access_token: &AccessToken) -> Result<UserProfile, GoogleError> {
        let resp = self
            .http
            .get(USERINFO_URI)
            .bearer_auth(access_token.as_str())
            .send()
            .await?;
        let profile: UserProfile = check_status(resp).await?.json().await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(
            reqwest::Client::new(),
            GoogleConfig {
                client_id: "client-123".into(),
                client_secret: "secret".into(),
                redirect_uri: "http://localhost:3000/auth/google/callback".into(),
                scopes: vec!["openid".into(), "email".into()],
            },
        )
    }

    #[test]
    fn authorize_url_requests_offline_consent() {
        let url = Url::parse(&client().authorize_url()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/auth/google/callback");
        assert_eq!(params["scope"], "openid email");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["response_type"], "code");
    }

    #[test]
    fn token_response_computes_expiry() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.a","expires_in":3599,"token_type":"Bearer"}"#,
        )
        .unwrap();
        let tokens = TokenSet::from(resp);
        assert_eq!(tokens.access_token, "ya29.a");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.expires_at.unwrap() > Utc::now());
    }
}
