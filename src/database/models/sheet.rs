use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sheets::GroupedRecords;

/// A grouped sheet saved after its first successful processing.
///
/// Field names on the wire follow the frontend's existing contract
/// (`sheetId`, `sheetName`, `groupTab`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSheet {
    pub id: Uuid,
    #[serde(rename = "sheetId")]
    pub document_id: String,
    pub sheet_name: String,
    #[serde(rename = "groupTab")]
    pub group_column: String,
    pub headers: Vec<String>,
    pub groups: GroupedRecords,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::database::SheetStore::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSheet {
    pub document_id: String,
    pub sheet_name: String,
    pub group_column: String,
    pub headers: Vec<String>,
    pub groups: GroupedRecords,
}

impl NewSheet {
    pub fn into_persisted(self, id: Uuid, created_at: DateTime<Utc>) -> PersistedSheet {
        PersistedSheet {
            id,
            document_id: self.document_id,
            sheet_name: self.sheet_name,
            group_column: self.group_column,
            headers: self.headers,
            groups: self.groups,
            created_at,
        }
    }
}
