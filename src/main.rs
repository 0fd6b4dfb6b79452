use anyhow::Context;
use bookshare_app::{shutdown_signal, Application};
use bookshare_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load BookShare settings")?;
    bookshare_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        snapshot = %settings.storage.snapshot_path.display(),
        "bookshare-app bootstrap starting"
    );

    Application::new(settings).run(shutdown_signal()).await
}
