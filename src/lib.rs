//! BookShare application library
//!
//! Wires the document store, the authenticator and the feature modules into a
//! [`ModuleRegistry`] and serves them over HTTP.

pub mod modules;
pub mod state;
pub mod uploads;
pub mod validators;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use bookshare_db::{DbModule, Store};
use bookshare_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use state::AppState;
use uploads::UploadsModule;

/// A fully registered BookShare instance.
pub struct Application {
    settings: Settings,
    state: AppState,
    registry: ModuleRegistry,
}

impl Application {
    /// Application over the snapshot at `storage.snapshot_path`.
    pub fn new(settings: Settings) -> Self {
        let store = Store::open(&settings.storage.snapshot_path);
        Self::with_state(settings.clone(), AppState::new(store, &settings))
    }

    /// Application over explicitly constructed state, e.g. an in-memory store.
    pub fn with_state(settings: Settings, state: AppState) -> Self {
        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(DbModule::new(state.store().clone())));
        registry.register_core(Arc::new(UploadsModule::new(&settings.uploads)));
        modules::register_all(&mut registry, &state);

        Self {
            settings,
            state,
            registry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Initialize and start every module.
    pub async fn boot(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.boot(&ctx).await
    }

    /// The complete HTTP router: module routes, static covers, docs and middleware.
    pub fn router(&self) -> Router {
        bookshare_http::build_router(&self.registry, &self.settings)
    }

    /// Stop every module, flushing the store.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.shutdown().await
    }

    /// Boot, serve until `shutdown` resolves, then stop the modules.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.boot().await?;
        let served = bookshare_http::start_server(&self.registry, &self.settings, shutdown).await;
        let stopped = self.shutdown().await;
        served?;
        stopped
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}
