use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshare_app::{shutdown_signal, Application};
use bookshare_db::{seed::seed_sample_data, Store};
use bookshare_kernel::settings::Settings;

const REDACTED: &str = "<redacted>";

#[derive(Debug, Parser)]
#[command(name = "bookshare", version, about = "BookShare marketplace API")]
struct Cli {
    /// Snapshot file to use instead of `storage.snapshot_path`
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (the default)
    Serve {
        /// Port to listen on instead of `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Insert sample users and books into an empty snapshot
    Seed,
    /// Print the resolved configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load BookShare settings")?;
    if let Some(path) = cli.snapshot {
        settings.storage.snapshot_path = path;
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshare_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                env = ?settings.environment,
                snapshot = %settings.storage.snapshot_path.display(),
                "bookshare serve starting"
            );
            Application::new(settings).run(shutdown_signal()).await
        }
        Command::Seed => {
            bookshare_telemetry::init(&settings.telemetry)?;
            seed(&settings).await
        }
        Command::Config => print_config(settings),
    }
}

async fn seed(settings: &Settings) -> anyhow::Result<()> {
    let path = &settings.storage.snapshot_path;
    let store = Store::open(path);
    store
        .load()
        .await
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;

    let report = seed_sample_data(&store).await?;
    store
        .flush()
        .await
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;

    println!(
        "seeded {} users and {} books into {}",
        report.users,
        report.books,
        path.display()
    );
    Ok(())
}

fn print_config(mut settings: Settings) -> anyhow::Result<()> {
    if !settings.auth.token_secret.is_empty() {
        settings.auth.token_secret = REDACTED.to_string();
    }
    let rendered = serde_json::to_string_pretty(&settings).context("failed to render settings")?;
    println!("{rendered}");
    Ok(())
}
