//! Google identity and document collaborators.
//!
//! The rest of the crate talks to [`IdentityProvider`] and [`DocumentSource`];
//! the `oauth` and `sheets` modules implement them over the REST APIs.

pub mod oauth;
pub mod sheets;

pub use oauth::GoogleOAuthClient;
pub use sheets::GoogleSheetsClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sheets::RawGrid;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Google response: {0}")]
    InvalidResponse(String),
}

/// Bearer token for the Sheets and Drive APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tokens returned by a code exchange or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// One tab of a document with its cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTab {
    pub name: String,
    pub rows: RawGrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocument {
    pub id: String,
    pub name: String,
    pub modified_time: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page URL requesting offline access.
    fn authorize_url(&self) -> String;

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, GoogleError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, GoogleError>;

    async fn user_info(&self, access_token: &AccessToken) -> Result<UserProfile, GoogleError>;
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Every tab of the document, in document order.
    async fn fetch_tabs(
        &self,
        credential: &AccessToken,
        document_id: &str,
    ) -> Result<Vec<SheetTab>, GoogleError>;

    /// Spreadsheets ordered by most recent modification.
    async fn list_recent(
        &self,
        credential: &AccessToken,
        max_results: u32,
    ) -> Result<Vec<RecentDocument>, GoogleError>;

    async fn fetch_range(
        &self,
        credential: &AccessToken,
        document_id: &str,
        range: &str,
    ) -> Result<RawGrid, GoogleError>;
}

/// Turn a non-2xx response into [`GoogleError::Api`], keeping Google's message.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GoogleError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(GoogleError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error_description"))
                .or_else(|| v.get("error"))
        })
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect())
}
