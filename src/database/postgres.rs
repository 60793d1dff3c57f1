use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::manager::DatabaseManager;
use super::models::{NewSheet, PersistedSheet, Role, SheetRef, TokenUpdate, User};
use super::{SheetStore, StoreError, UserStore};
use crate::sheets::GroupedRecords;

const SHEET_COLUMNS: &str =
    "id, document_id, sheet_name, group_column, headers, groups, created_at";

const USER_COLUMNS: &str =
    "id, email, name, role, picture, access_token, refresh_token, token_expires_at";

#[derive(FromRow)]
struct SheetRow {
    id: Uuid,
    document_id: String,
    sheet_name: String,
    group_column: String,
    headers: Json<Vec<String>>,
    groups: Json<GroupedRecords>,
    created_at: DateTime<Utc>,
}

impl From<SheetRow> for PersistedSheet {
    fn from(row: SheetRow) -> Self {
        PersistedSheet {
            id: row.id,
            document_id: row.document_id,
            sheet_name: row.sheet_name,
            group_column: row.group_column,
            headers: row.headers.0,
            groups: row.groups.0,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    picture: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct SheetRefRow {
    sheet_id: Uuid,
    title: String,
}

/// Sheets table access
#[derive(Clone)]
pub struct PgSheetStore {
    pool: PgPool,
}

impl PgSheetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_pair(
        &self,
        document_id: &str,
        group_column: &str,
    ) -> Result<Option<PersistedSheet>, StoreError> {
        let sql = format!(
            "SELECT {} FROM sheets WHERE document_id = $1 AND group_column = $2",
            SHEET_COLUMNS
        );
        let row = sqlx::query_as::<_, SheetRow>(&sql)
            .bind(document_id)
            .bind(group_column)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl SheetStore for PgSheetStore {
    async fn find_for_document(&self, document_id: &str) -> Result<Vec<PersistedSheet>, StoreError> {
        let sql = format!(
            "SELECT {} FROM sheets WHERE document_id = $1 ORDER BY created_at, id",
            SHEET_COLUMNS
        );
        let rows = sqlx::query_as::<_, SheetRow>(&sql)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PersistedSheet>, StoreError> {
        let sql = format!("SELECT {} FROM sheets WHERE id = $1", SHEET_COLUMNS);
        let row = sqlx::query_as::<_, SheetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert(&self, sheet: NewSheet) -> Result<PersistedSheet, StoreError> {
        // Bound as text and cast, so Postgres keeps the JSON exactly as written.
        let headers = serde_json::to_string(&sheet.headers)
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?;
        let groups = serde_json::to_string(&sheet.groups)
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?;

        let sql = format!(
            r#"
            INSERT INTO sheets (id, document_id, sheet_name, group_column, headers, groups)
            VALUES ($1, $2, $3, $4, $5::json, $6::json)
            ON CONFLICT (document_id, group_column) DO NOTHING
            RETURNING {}
            "#,
            SHEET_COLUMNS
        );

        let inserted = sqlx::query_as::<_, SheetRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&sheet.document_id)
            .bind(&sheet.sheet_name)
            .bind(&sheet.group_column)
            .bind(headers)
            .bind(groups)
            .fetch_optional(&self.pool)
            .await?;

        match inserted {
            Some(row) => Ok(row.into()),
            None => self
                .find_pair(&sheet.document_id, &sheet.group_column)
                .await?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "sheet for '{}' grouped by '{}' vanished after conflict",
                        sheet.document_id, sheet.group_column
                    ))
                }),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }
}

/// Users and their sheet references
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: UserRow) -> Result<User, StoreError> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| StoreError::CorruptRow(format!("user {}: {}", row.id, e)))?;

        let refs = sqlx::query_as::<_, SheetRefRow>(
            "SELECT sheet_id, title FROM user_sheets WHERE user_id = $1 ORDER BY added_at, sheet_id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            role,
            picture: row.picture,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            token_expires_at: row.token_expires_at,
            sheets: refs
                .into_iter()
                .map(|r| SheetRef { id: r.sheet_id, title: r.title })
                .collect(),
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        match sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        match sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn update_tokens(&self, id: Uuid, update: TokenUpdate) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users SET
                access_token = $2,
                refresh_token = COALESCE($3, refresh_token),
                token_expires_at = $4,
                name = COALESCE($5, name),
                picture = COALESCE($6, picture),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&update.access_token)
            .bind(&update.refresh_token)
            .bind(update.expires_at)
            .bind(&update.name)
            .bind(&update.picture)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        self.hydrate(row).await
    }

    async fn add_sheet_ref(&self, user_id: Uuid, sheet: SheetRef) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO user_sheets (user_id, sheet_id, title)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, sheet_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(sheet.id)
        .bind(&sheet.title)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    async fn upsert_admin(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, name, role)
            VALUES ($1, $2, $3, 'admin')
            ON CONFLICT (email) DO UPDATE SET
                role = 'admin',
                name = EXCLUDED.name,
                updated_at = now()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        self.hydrate(row).await
    }
}
