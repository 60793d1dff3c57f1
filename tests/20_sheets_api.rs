mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestApp, DOCUMENT_ID};
use sheet_groups_api::database::UserStore;
use sheet_groups_api::testing::StubDocuments;

#[tokio::test]
async fn sheet_routes_require_a_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .get(app.url(&format!("/api/sheets/{}/process-raw/Region", DOCUMENT_ID)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = app
        .client
        .get(app.url("/api/sheets/recent"))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_admin_tokens_are_forbidden() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.viewer_token().await?;

    let res = app
        .client
        .get(app.url("/api/sheets/recent"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn process_raw_groups_then_serves_from_store() -> Result<()> {
    let app = TestApp::spawn().await?;
    let path = format!("/api/sheets/{}/process-raw/Region", DOCUMENT_ID);

    let res = app.get_as_admin(&path).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let first: Value = res.json().await?;
    let data = &first["data"];

    assert_eq!(data["cached"], false);
    assert_eq!(data["sheetId"], DOCUMENT_ID);
    assert_eq!(data["sheetName"], "Orders");
    assert_eq!(data["groupTab"], "Region");
    assert_eq!(data["headers"], json!(["Region", "Product", "Units"]));

    let groups = data["groups"].as_object().expect("groups object");
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["North", "South", ""]);
    assert_eq!(
        groups["North"],
        json!([
            {"id": 0, "Region": "North", "Product": "Widget", "Units": "3"},
            {"id": 2, "Region": "North", "Product": "Gadget", "Units": "1"}
        ])
    );

    let second: Value = app.get_as_admin(&path).await?.json().await?;
    assert_eq!(second["data"]["cached"], true);
    assert_eq!(second["data"]["id"], data["id"]);
    assert_eq!(second["data"]["groups"], data["groups"]);
    assert_eq!(app.documents.calls(), 1);

    let admin = app.users.find_by_id(app.admin.id).await?.expect("admin");
    assert_eq!(admin.sheets.len(), 1);
    assert_eq!(admin.sheets[0].title, "Orders");
    Ok(())
}

#[tokio::test]
async fn unknown_column_is_a_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .get_as_admin(&format!("/api/sheets/{}/process-raw/Owner", DOCUMENT_ID))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Column 'Owner' does not exist in the sheet.");
    assert!(app.sheets.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn missing_group_name_is_a_bad_request() -> Result<()> {
    let app = TestApp::spawn_with(StubDocuments::failing()).await?;

    let res = app
        .get_as_admin(&format!("/api/sheets/{}/process-raw", DOCUMENT_ID))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.documents.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn google_failures_surface_as_bad_gateway() -> Result<()> {
    let app = TestApp::spawn_with(StubDocuments::failing()).await?;

    let res = app
        .get_as_admin(&format!("/api/sheets/{}/process-raw/Region", DOCUMENT_ID))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "BAD_GATEWAY");
    Ok(())
}

#[tokio::test]
async fn stored_sheet_is_fetched_by_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let processed: Value = app
        .get_as_admin(&format!("/api/sheets/{}/process-raw/Product", DOCUMENT_ID))
        .await?
        .json()
        .await?;
    let id = processed["data"]["id"].as_str().expect("sheet id").to_string();

    let res = app.get_as_admin(&format!("/api/sheets/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["groupTab"], "Product");
    assert!(body["data"].get("cached").is_none());

    let res = app
        .get_as_admin("/api/sheets/00000000-0000-0000-0000-000000000000")
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.get_as_admin("/api/sheets/not-a-uuid").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn recent_sheets_honour_max_results() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = app
        .get_as_admin("/api/sheets/recent?maxResults=2")
        .await?
        .json()
        .await?;
    let docs = body["data"].as_array().expect("list");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["id"], "doc-1");
    assert!(docs[0]["modifiedTime"].is_string());

    let body: Value = app
        .get_as_admin("/api/sheets/recent?maxResults=lots")
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().expect("list").len(), 3);
    Ok(())
}

#[tokio::test]
async fn headers_return_the_first_row() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = app
        .get_as_admin(&format!("/api/sheets/{}/headers", DOCUMENT_ID))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"], json!(["Region", "Product", "Units"]));
    Ok(())
}

#[tokio::test]
async fn headers_of_an_empty_sheet_are_not_found() -> Result<()> {
    let app = TestApp::spawn_with(StubDocuments::with_tabs(vec![("Empty", vec![])])).await?;

    let res = app
        .get_as_admin(&format!("/api/sheets/{}/headers", DOCUMENT_ID))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "No data found in the sheet.");
    Ok(())
}
