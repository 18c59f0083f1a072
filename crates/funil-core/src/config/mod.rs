mod channels;
mod defaults;
mod providers;


pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::ProductEntry;
use crate::error::FunilError;
use defaults::*;

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub funnel: FunnelConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl BotConfig {
    /// Expanded data directory.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.data_dir))
    }

    /// Scratch directory for downloaded media.
    pub fn temp_dir(&self) -> PathBuf {
        self.data_path().join("temp")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

/// HTTP server configuration: health check, payment webhook and the
/// WhatsApp inbound route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token required on `/webhook`. Empty = no auth.
    #[serde(default)]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_api_host(),
            port: default_api_port(),
            api_key: String::new(),
        }
    }
}

/// Sales funnel tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelConfig {
    /// Turns kept per conversation.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Age at which an open lead counts as an abandoned checkout.
    #[serde(default = "default_lead_ttl_hours")]
    pub lead_ttl_hours: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            lead_ttl_hours: default_lead_ttl_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Periodic encrypted metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_report_interval_hours")]
    pub interval_hours: u64,
    /// Passphrase the AES-256 key is derived from. Empty = reports are skipped.
    #[serde(default)]
    pub secret: String,
    /// Channel to deliver the report on.
    #[serde(default = "default_report_channel")]
    pub channel: String,
    /// Platform-specific recipient (phone number for WhatsApp).
    #[serde(default)]
    pub recipient: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: default_report_interval_hours(),
            secret: String::new(),
            channel: default_report_channel(),
            recipient: String::new(),
        }
    }
}

/// Product catalog. An empty list means the built-in products.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

impl Config {
    /// Overlay credentials and deployment settings from the environment.
    ///
    /// Non-empty variables win over the file. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.provider.openai.api_key = v;
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.provider.openai.model = v;
        }
        if let Some(v) = get("HUGGINGFACE_API_TOKEN") {
            self.provider.huggingface.api_token = v;
        }
        if let Some(v) = get("GOOGLE_VISION_API_KEY") {
            self.provider.vision.api_key = v;
        }
        if let Some(v) = get("DEEPGRAM_API_KEY") {
            self.provider.speech.api_key = v;
        }

        let token = get("WHATSAPP_ACCESS_TOKEN");
        let phone_id = get("WHATSAPP_PHONE_NUMBER_ID");
        let verify = get("WHATSAPP_VERIFY_TOKEN");
        if token.is_some() || phone_id.is_some() || verify.is_some() {
            let wa = self.channel.whatsapp.get_or_insert_with(|| WhatsAppConfig {
                enabled: true,
                ..Default::default()
            });
            if let Some(v) = token {
                wa.access_token = v;
            }
            if let Some(v) = phone_id {
                wa.phone_number_id = v;
            }
            if let Some(v) = verify {
                wa.verify_token = v;
            }
        }

        if let Some(v) = get("REPORT_SECRET") {
            self.report.secret = v;
        }
        if let Some(v) = get("REPORT_RECIPIENT") {
            self.report.recipient = v;
        }
        if let Some(v) = get("API_KEY") {
            self.api.api_key = v;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.api.port = port;
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, FunilError> {
    let mut config = read_file(Path::new(path))?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn read_file(path: &Path) -> Result<Config, FunilError> {
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| FunilError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| FunilError::Config(format!("failed to parse config: {}", e)))
}
