use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{check_status, AccessToken, DocumentSource, GoogleError, RecentDocument, SheetTab};
use crate::sheets::RawGrid;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const UNTITLED_TAB: &str = "Untitled Sheet";

/// Sheets v4 and Drive v3 over plain REST.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Deserialize)]
struct SheetMetadata {
    properties: Option<SheetProperties>,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: Option<String>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: RawGrid,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RecentDocument>,
}

impl GoogleSheetsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn spreadsheet_url(document_id: &str, tail: &[&str]) -> Result<Url, GoogleError> {
        let mut url = Url::parse(SHEETS_API)
            .map_err(|e| GoogleError::InvalidResponse(format!("bad API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GoogleError::InvalidResponse("API base cannot hold a path".to_string()))?
            .push(document_id)
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        credential: &AccessToken,
        url: Url,
    ) -> Result<T, GoogleError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(credential.as_str())
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn tab_titles(
        &self,
        credential: &AccessToken,
        document_id: &str,
    ) -> Result<Vec<String>, GoogleError> {
        let mut url = Self::spreadsheet_url(document_id, &[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let metadata: SpreadsheetMetadata = self.get_json(credential, url).await?;
        Ok(metadata.sheets.into_iter().map(tab_title).collect())
    }
}

fn tab_title(sheet: SheetMetadata) -> String {
    sheet
        .properties
        .and_then(|p| p.title)
        .unwrap_or_else(|| UNTITLED_TAB.to_string())
}

/// A1 notation for a whole tab. Titles are always quoted so names such as
/// `A1` or `Q1 2024` are not read as cell references.
pub fn tab_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[async_trait]
impl DocumentSource for GoogleSheetsClient {
    async fn fetch_tabs(
        &self,
        credential: &AccessToken,
        document_id: &str,
    ) -> Result<Vec<SheetTab>, GoogleError> {
        let titles = self.tab_titles(credential, document_id).await?;
        debug!("Document {} has {} tabs", document_id, titles.len());

        let mut tabs = Vec::with_capacity(titles.len());
        for name in titles {
            let rows = self.fetch_range(credential, document_id, &tab_range(&name)).await?;
            tabs.push(SheetTab { name, rows });
        }
        Ok(tabs)
    }

    async fn list_recent(
        &self,
        credential: &AccessToken,
        max_results: u32,
    ) -> Result<Vec<RecentDocument>, GoogleError> {
        let mut url = Url::parse(DRIVE_FILES_API)
            .map_err(|e| GoogleError::InvalidResponse(format!("bad API base: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("pageSize", &max_results.to_string())
            .append_pair("fields", "files(id, name, modifiedTime)")
            .append_pair("orderBy", "modifiedTime desc")
            .append_pair("q", &format!("mimeType='{}'", SPREADSHEET_MIME));

        let list: FileList = self.get_json(credential, url).await?;
        Ok(list.files)
    }

    async fn fetch_range(
        &self,
        credential: &AccessToken,
        document_id: &str,
        range: &str,
    ) -> Result<RawGrid, GoogleError> {
        let url = Self::spreadsheet_url(document_id, &["values", range])?;
        let values: ValueRange = self.get_json(credential, url).await?;
        Ok(values.values)
    }
}
