use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHARE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHARE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHARE";

/// Placeholder cover used when a listing is created without an upload.
pub const DEFAULT_COVER_URL: &str = "https://shelfpay99.s3.ap-south-1.amazonaws.com/shelfpaylogo.png";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub uploads: UploadSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parse_environment(&environment)?;

        Ok(settings)
    }
}

fn parse_environment(value: &str) -> anyhow::Result<Environment> {
    match value {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Where the document store snapshot lives and how often it is flushed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "StorageSettings::default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "StorageSettings::default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,
    #[serde(default = "StorageSettings::default_seed_sample_data")]
    pub seed_sample_data: bool,
}

impl StorageSettings {
    fn default_snapshot_path() -> PathBuf {
        PathBuf::from("db.json")
    }

    fn default_autosave_interval_ms() -> u64 {
        5000
    }

    fn default_seed_sample_data() -> bool {
        true
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            snapshot_path: Self::default_snapshot_path(),
            autosave_interval_ms: Self::default_autosave_interval_ms(),
            seed_sample_data: Self::default_seed_sample_data(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How a bearer credential is turned into a user identity.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
    /// HS256 JWT carrying the user id as `sub`, with expiry.
    #[default]
    Signed,
    /// The bearer value is the raw numeric user id.
    UserId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub token_mode: TokenMode,
    /// Empty means a random per-process secret is generated at startup.
    #[serde(default)]
    pub token_secret: String,
    #[serde(default = "AuthSettings::default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl AuthSettings {
    fn default_token_ttl_hours() -> u64 {
        24
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_mode: TokenMode::default(),
            token_secret: String::new(),
            token_ttl_hours: Self::default_token_ttl_hours(),
        }
    }
}

/// Authorization policy switches.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PolicySettings {
    /// Require book ownership for status changes and refuse to let a second
    /// owner take over an answered request.
    #[serde(default)]
    pub strict_ownership: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "UploadSettings::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "UploadSettings::default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "UploadSettings::default_cover_url")]
    pub default_cover_url: String,
    #[serde(default = "UploadSettings::default_max_bytes")]
    pub max_bytes: usize,
}

impl UploadSettings {
    fn default_dir() -> PathBuf {
        PathBuf::from("uploads")
    }

    fn default_public_base_url() -> String {
        "/uploads".to_string()
    }

    fn default_cover_url() -> String {
        DEFAULT_COVER_URL.to_string()
    }

    fn default_max_bytes() -> usize {
        5 * 1024 * 1024
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            public_base_url: Self::default_public_base_url(),
            default_cover_url: Self::default_cover_url(),
            max_bytes: Self::default_max_bytes(),
        }
    }
}
