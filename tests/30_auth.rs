mod common;

use anyhow::Result;
use reqwest::{header::LOCATION, StatusCode};
use serde_json::Value;

use common::{TestApp, ADMIN_EMAIL, DOCUMENT_ID};
use sheet_groups_api::auth::validate_jwt;
use sheet_groups_api::database::UserStore;

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn sign_in_redirects_to_google() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/auth/google")).send().await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("https://accounts.google.com/"));
    Ok(())
}

#[tokio::test]
async fn callback_without_code_is_a_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/auth/google/callback")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Authorization code not provided");
    Ok(())
}

#[tokio::test]
async fn callback_hands_a_session_token_to_the_frontend() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .get(app.url("/auth/google/callback?code=abc123"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let location = location(&res);
    let url = url::Url::parse(&location)?;
    assert_eq!(url.host_str(), Some("frontend.test"));
    let token = url
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .expect("token in redirect");

    let claims = validate_jwt(&token, &app.config.security)?;
    assert_eq!(claims.email, ADMIN_EMAIL);

    let stored = app.users.find_by_id(app.admin.id).await?.expect("admin");
    assert_eq!(stored.access_token.as_deref(), Some("fresh-google-token"));
    Ok(())
}

#[tokio::test]
async fn profile_lists_processed_sheets() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.get_as_admin(&format!("/api/sheets/{}/process-raw/Region", DOCUMENT_ID))
        .await?;

    let res = app.get_as_admin("/api/auth/profile").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["sheets"][0]["title"], "Orders");
    assert!(body["data"].get("access_token").is_none());
    Ok(())
}
