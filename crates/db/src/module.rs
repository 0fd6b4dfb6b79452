use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bookshare_kernel::{InitCtx, Module};
use crate::seed::seed_sample_data;
use crate::store::{Autosave, Store};

/// Core module owning the store lifecycle: load and seed on init, autosave
/// while running, final flush on stop.
pub struct DbModule {
    store: Store,
    autosave: Mutex<Option<Autosave>>,
}

impl DbModule {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            autosave: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if !self.store.is_loaded().await {
            self.store
                .load()
                .await
                .context("failed to load store snapshot")?;
        }

        if ctx.settings.storage.seed_sample_data {
            seed_sample_data(&self.store)
                .await
                .context("failed to seed sample data")?;
        }

        tracing::info!(
            module = self.name(),
            snapshot = ?self.store.snapshot_path(),
            "db module initialized"
        );
        Ok(())
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.store.snapshot_path().is_some() {
            let interval = Duration::from_millis(ctx.settings.storage.autosave_interval_ms.max(1));
            let autosave = self.store.spawn_autosave(interval);
            *self.autosave.lock().unwrap_or_else(PoisonError::into_inner) = Some(autosave);
        }
        tracing::info!(module = self.name(), "db module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let autosave = self
            .autosave
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(autosave) = autosave {
            autosave.stop().await;
        }

        let written = self
            .store
            .flush()
            .await
            .context("failed to flush store snapshot")?;
        tracing::info!(module = self.name(), flushed = written, "db module stopped");
        Ok(())
    }
}
