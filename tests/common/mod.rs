#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use sheet_groups_api::auth::{generate_jwt, Claims};
use sheet_groups_api::config::AppConfig;
use sheet_groups_api::database::{MemorySheetStore, MemoryUserStore, Role, User};
use sheet_groups_api::google::RecentDocument;
use sheet_groups_api::sheets::RawGrid;
use sheet_groups_api::testing::{admin_user, grid, StubDocuments, StubIdentity};
use sheet_groups_api::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const DOCUMENT_ID: &str = "1AbCdEfGhIjKlMnOp";

/// One in-process server per test, backed by memory stores and stub Google clients.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
    pub admin: User,
    pub admin_token: String,
    pub sheets: MemorySheetStore,
    pub users: MemoryUserStore,
    pub documents: Arc<StubDocuments>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(StubDocuments::with_tabs(vec![("Orders", orders_grid())])
            .with_recent(recent_documents()))
        .await
    }

    pub async fn spawn_with(documents: StubDocuments) -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "integration-secret".to_string();
        config.security.frontend_url = "http://frontend.test".to_string();

        let sheets = MemorySheetStore::new();
        let users = MemoryUserStore::new();
        let admin = admin_user(ADMIN_EMAIL);
        users.put(admin.clone()).await;

        let documents = Arc::new(documents);
        let state = AppState::new(
            config.clone(),
            Arc::new(sheets.clone()),
            Arc::new(users.clone()),
            Arc::new(StubIdentity::issuing("fresh-google-token")),
            documents.clone(),
        );

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let admin_token = token_for(&admin, &config)?;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client,
            config,
            admin,
            admin_token,
            sheets,
            users,
            documents,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_as_admin(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(&self.admin_token)
            .send()
            .await?)
    }

    /// Store a non-admin user and return a session token for them.
    pub async fn viewer_token(&self) -> Result<String> {
        let mut viewer = admin_user("viewer@example.com");
        viewer.role = Role::User;
        self.users.put(viewer.clone()).await;
        token_for(&viewer, &self.config)
    }
}

pub fn token_for(user: &User, config: &AppConfig) -> Result<String> {
    let claims = Claims::for_user(user, 1);
    Ok(generate_jwt(&claims, &config.security)?)
}

pub fn orders_grid() -> RawGrid {
    grid(&[
        &["Region", "Product", "Units"],
        &["North", "Widget", "3"],
        &["South", "Gadget", "5"],
        &["North", "Gadget", "1"],
        &["", "Widget", "2"],
    ])
}

pub fn recent_documents() -> Vec<RecentDocument> {
    (1..=3)
        .map(|i| RecentDocument {
            id: format!("doc-{}", i),
            name: format!("Report {}", i),
            modified_time: Some(Utc::now()),
        })
        .collect()
}
