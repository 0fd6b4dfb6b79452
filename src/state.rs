//! State shared by the BookShare route handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use bookshare_authz::Authenticator;
use bookshare_db::Store;
use bookshare_kernel::settings::{PolicySettings, Settings, UploadSettings};

use crate::uploads::{CoverStore, LocalCoverStore};

/// Cloneable handle given to every module router.
#[derive(Clone)]
pub struct AppState {
    store: Store,
    auth: Authenticator,
    covers: Arc<dyn CoverStore>,
    settings: Arc<Settings>,
}

impl AppState {
    /// State over `store` with the local cover store from `settings.uploads`.
    pub fn new(store: Store, settings: &Settings) -> Self {
        let covers = Arc::new(LocalCoverStore::new(&settings.uploads));
        Self::with_cover_store(store, settings, covers)
    }

    pub fn with_cover_store(
        store: Store,
        settings: &Settings,
        covers: Arc<dyn CoverStore>,
    ) -> Self {
        Self {
            auth: Authenticator::new(store.clone(), &settings.auth),
            store,
            covers,
            settings: Arc::new(settings.clone()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn covers(&self) -> &dyn CoverStore {
        self.covers.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn policy(&self) -> &PolicySettings {
        &self.settings.policy
    }

    pub fn uploads(&self) -> &UploadSettings {
        &self.settings.uploads
    }
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
