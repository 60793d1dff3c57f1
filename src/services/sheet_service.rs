use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Credentials, ServiceError, ServiceResult};
use crate::config::SheetsConfig;
use crate::database::{NewSheet, PersistedSheet, SheetRef, SheetStore, UserStore};
use crate::google::{DocumentSource, RecentDocument};
use crate::sheets::{group_by_column, normalize, CellValue};

/// Result of a process request, flagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSheet {
    #[serde(flatten)]
    pub sheet: PersistedSheet,
    pub cached: bool,
}

/// Cache-or-fetch processing plus the read-only sheet operations.
#[derive(Clone)]
pub struct SheetService {
    sheets: Arc<dyn SheetStore>,
    users: Arc<dyn UserStore>,
    documents: Arc<dyn DocumentSource>,
    credentials: Credentials,
    config: SheetsConfig,
}

impl SheetService {
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        users: Arc<dyn UserStore>,
        documents: Arc<dyn DocumentSource>,
        credentials: Credentials,
        config: SheetsConfig,
    ) -> Self {
        Self {
            sheets,
            users,
            documents,
            credentials,
            config,
        }
    }

    /// Group the first tab of `document_id` by `group_column`.
    ///
    /// A stored result for the same pair is returned as-is. Otherwise the
    /// document is fetched, reshaped, saved and linked to the user. The
    /// empty-name check runs after the stored lookup.
    pub async fn process(
        &self,
        user_id: Uuid,
        document_id: &str,
        group_column: &str,
    ) -> ServiceResult<ProcessedSheet> {
        let stored = self
            .sheets
            .find_for_document(document_id)
            .await
            .inspect_err(|e| error!("Sheet lookup failed for document {}: {}", document_id, e))?;

        if let Some(hit) = stored.into_iter().find(|s| s.group_column == group_column) {
            debug!("Serving stored sheet {} for {} / '{}'", hit.id, document_id, group_column);
            return Ok(ProcessedSheet { sheet: hit, cached: true });
        }

        if group_column.is_empty() {
            return Err(ServiceError::Validation(
                "groupName is required in the request.".to_string(),
            ));
        }

        let credential = self.credentials.for_user(user_id).await?;
        let tabs = self
            .documents
            .fetch_tabs(&credential, document_id)
            .await
            .inspect_err(|e| error!("Failed to fetch document {}: {}", document_id, e))?;

        let Some(tab) = tabs.into_iter().next() else {
            warn!("Document {} has no tabs", document_id);
            return Err(ServiceError::NotFound(format!(
                "Document '{}' has no sheets.",
                document_id
            )));
        };

        let normalized = normalize(&tab.rows);
        if !normalized.has_header(group_column) {
            warn!(
                "Column '{}' not found in '{}' of document {}",
                group_column, tab.name, document_id
            );
            return Err(ServiceError::Validation(format!(
                "Column '{}' does not exist in the sheet.",
                group_column
            )));
        }

        let groups = group_by_column(&normalized.records, group_column);

        let sheet = self
            .sheets
            .insert(NewSheet {
                document_id: document_id.to_string(),
                sheet_name: tab.name,
                group_column: group_column.to_string(),
                headers: normalized.headers,
                groups,
            })
            .await
            .inspect_err(|e| error!("Failed to save grouped sheet for {}: {}", document_id, e))?;

        let linked = self
            .users
            .add_sheet_ref(
                user_id,
                SheetRef {
                    id: sheet.id,
                    title: sheet.sheet_name.clone(),
                },
            )
            .await
            .inspect_err(|e| error!("Failed to link sheet {} to user {}: {}", sheet.id, user_id, e))?;
        if !linked {
            warn!("User {} no longer exists, sheet {} left unlinked", user_id, sheet.id);
        }

        info!(
            "Processed document {} tab '{}' into {} groups by '{}'",
            document_id,
            sheet.sheet_name,
            sheet.groups.len(),
            group_column
        );
        Ok(ProcessedSheet { sheet, cached: false })
    }

    pub async fn get_sheet(&self, id: &str) -> ServiceResult<PersistedSheet> {
        let id = Uuid::parse_str(id)
            .map_err(|_| ServiceError::Validation(format!("Invalid sheet id '{}'", id)))?;

        self.sheets
            .find_by_id(id)
            .await
            .inspect_err(|e| error!("Failed to load sheet {}: {}", id, e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Sheet {} not found", id)))
    }

    pub async fn list_recent(
        &self,
        user_id: Uuid,
        max_results: Option<&str>,
    ) -> ServiceResult<Vec<RecentDocument>> {
        let max_results = self.resolve_max_results(max_results);
        let credential = self.credentials.for_user(user_id).await?;

        self.documents
            .list_recent(&credential, max_results)
            .await
            .inspect_err(|e| error!("Failed to list recent sheets for user {}: {}", user_id, e))
            .map_err(Into::into)
    }

    /// First row of the configured header range.
    pub async fn headers(&self, user_id: Uuid, document_id: &str) -> ServiceResult<Vec<CellValue>> {
        let credential = self.credentials.for_user(user_id).await?;
        let rows = self
            .documents
            .fetch_range(&credential, document_id, &self.config.header_range)
            .await
            .inspect_err(|e| error!("Failed to fetch headers of {}: {}", document_id, e))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("No data found in the sheet.".to_string()))
    }

    fn resolve_max_results(&self, raw: Option<&str>) -> u32 {
        match raw.and_then(|s| s.trim().parse::<u32>().ok()) {
            Some(0) | None => self.config.default_recent_results,
            Some(n) => n.min(self.config.max_recent_results),
        }
    }
}
