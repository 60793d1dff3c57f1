pub mod auth_service;
pub mod credentials;
pub mod sheet_service;

pub use auth_service::{AuthService, LoginOutcome, Profile};
pub use credentials::Credentials;
pub use sheet_service::{ProcessedSheet, SheetService};

use thiserror::Error;

use crate::auth::JwtError;
use crate::database::StoreError;
use crate::google::GoogleError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Upstream(#[from] GoogleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
