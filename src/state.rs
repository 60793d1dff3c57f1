use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{SheetStore, UserStore};
use crate::google::{DocumentSource, IdentityProvider};
use crate::services::{AuthService, Credentials, SheetService};

/// Everything a request handler can reach. Built once in `main` (or a test
/// harness) and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sheets: SheetService,
    pub auth: AuthService,
    pub store: Arc<dyn SheetStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        sheet_store: Arc<dyn SheetStore>,
        user_store: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentSource>,
    ) -> Self {
        let credentials = Credentials::new(user_store.clone(), identity.clone());
        let sheets = SheetService::new(
            sheet_store.clone(),
            user_store.clone(),
            documents,
            credentials,
            config.sheets.clone(),
        );
        let auth = AuthService::new(user_store, identity, config.security.clone());

        Self {
            config: Arc::new(config),
            sheets,
            auth,
            store: sheet_store,
        }
    }
}
