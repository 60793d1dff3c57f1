//! In-process stores for `serve --memory` and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewSheet, PersistedSheet, Role, SheetRef, TokenUpdate, User};
use super::{SheetStore, StoreError, UserStore};

#[derive(Clone, Default)]
pub struct MemorySheetStore {
    sheets: Arc<RwLock<Vec<PersistedSheet>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sheets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sheets.read().await.is_empty()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn find_for_document(&self, document_id: &str) -> Result<Vec<PersistedSheet>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PersistedSheet>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets.iter().find(|s| s.id == id).cloned())
    }

    async fn insert(&self, sheet: NewSheet) -> Result<PersistedSheet, StoreError> {
        let mut sheets = self.sheets.write().await;
        if let Some(existing) = sheets
            .iter()
            .find(|s| s.document_id == sheet.document_id && s.group_column == sheet.group_column)
        {
            return Ok(existing.clone());
        }

        let persisted = sheet.into_persisted(Uuid::new_v4(), Utc::now());
        sheets.push(persisted.clone());
        Ok(persisted)
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user as-is, replacing any with the same id.
    pub async fn put(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_tokens(&self, id: Uuid, update: TokenUpdate) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        user.access_token = Some(update.access_token);
        if update.refresh_token.is_some() {
            user.refresh_token = update.refresh_token;
        }
        user.token_expires_at = update.expires_at;
        if let Some(name) = update.name {
            user.name = name;
        }
        if update.picture.is_some() {
            user.picture = update.picture;
        }
        Ok(user.clone())
    }

    async fn add_sheet_ref(&self, user_id: Uuid, sheet: SheetRef) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(false);
        };
        if !user.sheets.iter().any(|s| s.id == sheet.id) {
            user.sheets.push(sheet);
        }
        Ok(true)
    }

    async fn upsert_admin(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.role = Role::Admin;
            user.name = name.to_string();
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            role: Role::Admin,
            picture: None,
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
            sheets: Vec::new(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
