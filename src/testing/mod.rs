//! Test doubles for the Google collaborators.
//!
//! Shared by the unit tests and the `tests/` integration suite.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::database::{Role, User};
use crate::google::{
    AccessToken, DocumentSource, GoogleError, IdentityProvider, RecentDocument, SheetTab,
    TokenSet, UserProfile,
};
use crate::sheets::{CellValue, RawGrid};

/// Build a grid from string literals; `""` cells stay as empty text.
pub fn grid(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| row.iter().map(|c| CellValue::text(*c)).collect())
        .collect()
}

/// An admin whose Google token is valid for another hour.
pub fn admin_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: "Test Admin".to_string(),
        role: Role::Admin,
        picture: None,
        access_token: Some("test-access-token".to_string()),
        refresh_token: Some("test-refresh-token".to_string()),
        token_expires_at: Some(Utc::now() + Duration::hours(1)),
        sheets: Vec::new(),
    }
}

fn stub_failure(what: &str) -> GoogleError {
    GoogleError::Api {
        status: 500,
        message: format!("stub {} was not expected to be called", what),
    }
}

/// Document source serving fixed tabs, or failing on every call.
#[derive(Default)]
pub struct StubDocuments {
    tabs: Vec<SheetTab>,
    recent: Vec<RecentDocument>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubDocuments {
    pub fn with_tabs(tabs: Vec<(&str, RawGrid)>) -> Self {
        Self {
            tabs: tabs
                .into_iter()
                .map(|(name, rows)| SheetTab { name: name.to_string(), rows })
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_recent(mut self, recent: Vec<RecentDocument>) -> Self {
        self.recent = recent;
        self
    }

    /// Fails any call, for paths that must not reach the document API.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self, what: &str) -> Result<(), GoogleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(stub_failure(what))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentSource for StubDocuments {
    async fn fetch_tabs(
        &self,
        _credential: &AccessToken,
        _document_id: &str,
    ) -> Result<Vec<SheetTab>, GoogleError> {
        self.record_call("fetch_tabs")?;
        Ok(self.tabs.clone())
    }

    async fn list_recent(
        &self,
        _credential: &AccessToken,
        max_results: u32,
    ) -> Result<Vec<RecentDocument>, GoogleError> {
        self.record_call("list_recent")?;
        Ok(self.recent.iter().take(max_results as usize).cloned().collect())
    }

    async fn fetch_range(
        &self,
        _credential: &AccessToken,
        _document_id: &str,
        _range: &str,
    ) -> Result<RawGrid, GoogleError> {
        self.record_call("fetch_range")?;
        Ok(self
            .tabs
            .first()
            .and_then(|tab| tab.rows.first())
            .map(|row| vec![row.clone()])
            .unwrap_or_default())
    }
}

/// Identity provider that either issues a fixed token or fails.
pub struct StubIdentity {
    access_token: Option<String>,
    email: String,
    refresh_calls: AtomicUsize,
}

impl StubIdentity {
    pub fn issuing(access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            email: "admin@example.com".to_string(),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            access_token: None,
            email: "admin@example.com".to_string(),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Email reported by `user_info`.
    pub fn for_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn tokens(&self, what: &str) -> Result<TokenSet, GoogleError> {
        let access_token = self.access_token.clone().ok_or_else(|| stub_failure(what))?;
        Ok(TokenSet {
            access_token,
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorize_url(&self) -> String {
        "https://accounts.google.com/o/oauth2/v2/auth?client_id=stub".to_string()
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenSet, GoogleError> {
        self.tokens("exchange_code")
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet, GoogleError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens("refresh")
    }

    async fn user_info(&self, _access_token: &AccessToken) -> Result<UserProfile, GoogleError> {
        self.access_token.as_ref().ok_or_else(|| stub_failure("user_info"))?;
        Ok(UserProfile {
            email: self.email.clone(),
            name: Some("Test Admin".to_string()),
            picture: Some("https://example.com/avatar.png".to_string()),
        })
    }
}
