pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use manager::DatabaseManager;
pub use memory::{MemorySheetStore, MemoryUserStore};
pub use models::{NewSheet, PersistedSheet, Role, SheetRef, TokenUpdate, User};
pub use postgres::{PgSheetStore, PgUserStore};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the sheet and user stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Database(#[from] manager::DatabaseError),
}

/// Persisted grouped sheets.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All sheets saved for a document, oldest first.
    async fn find_for_document(&self, document_id: &str) -> Result<Vec<PersistedSheet>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PersistedSheet>, StoreError>;

    /// Create the sheet, or return the one already stored for the same
    /// (document, group column) pair.
    async fn insert(&self, sheet: NewSheet) -> Result<PersistedSheet, StoreError>;

    /// Connectivity check for `/health`.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Administrator and user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn update_tokens(&self, id: Uuid, update: TokenUpdate) -> Result<User, StoreError>;

    /// Add a sheet reference unless one with the same id is present.
    /// Returns `false` when the user does not exist.
    async fn add_sheet_ref(&self, user_id: Uuid, sheet: SheetRef) -> Result<bool, StoreError>;

    /// Create the user as an admin, or promote an existing one.
    async fn upsert_admin(&self, email: &str, name: &str) -> Result<User, StoreError>;
}
