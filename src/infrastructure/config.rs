//! Configuration infrastructure
//!
//! Contains configuration loading and management for the bill connector.
//!
//! The configuration is loaded once at startup and handed to the components
//! that need it. Every section carries defaults, so a partial `config.json`
//! only needs to name what differs.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;
use url::Url;

use crate::domain::account::AccountFields;
use crate::infrastructure::parsing::SelectorConfig;
use crate::infrastructure::simple_http_client::HttpClientConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vendor: VendorConfig,
    pub http: HttpClientConfig,
    pub selectors: SelectorConfig,
    pub run: RunConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reject configurations the connector cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.vendor.name.trim().is_empty() {
            bail!("vendor.name must not be empty");
        }
        for (field, value) in [
            ("vendor.login_url", &self.vendor.login_url),
            ("vendor.orders_list_url", &self.vendor.orders_list_url),
        ] {
            Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", field, value))?;
        }
        if self.run.detail_max_concurrent == 0 {
            bail!("run.detail_max_concurrent must be at least 1");
        }
        if self.http.max_requests_per_second == 0 {
            bail!("http.max_requests_per_second must be at least 1");
        }
        Ok(())
    }
}

/// Where the vendor portal lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Vendor identifier used in filenames and as persistence identifier
    pub name: String,
    pub login_url: String,
    pub orders_list_url: String,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            name: thomann::VENDOR.to_string(),
            login_url: thomann::LOGIN_URL.to_string(),
            orders_list_url: thomann::ORDERS_LIST_URL.to_string(),
        }
    }
}

/// What to do with an order whose summary text does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedOrderPolicy {
    /// Abort the whole run
    #[default]
    Abort,
    /// Log and leave the order out
    Skip,
}

/// What to do with an order whose detail page has no invoice link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInvoicePolicy {
    /// Abort the whole run
    #[default]
    Fail,
    /// Log and leave the order out
    Skip,
}

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Detail pages fetched at once; 1 keeps the run strictly sequential
    pub detail_max_concurrent: usize,
    pub on_malformed_order: MalformedOrderPolicy,
    pub on_missing_invoice: MissingInvoicePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            detail_max_concurrent: defaults::DETAIL_MAX_CONCURRENT,
            on_malformed_order: MalformedOrderPolicy::default(),
            on_missing_invoice: MissingInvoicePolicy::default(),
        }
    }
}

/// Filesystem bill store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    /// JSON index of stored bills, relative to `output_dir`
    pub index_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let output_dir = ConfigManager::get_app_data_dir()
            .map(|dir| dir.join("bills"))
            .unwrap_or_else(|_| PathBuf::from("bills"));
        Self {
            output_dir,
            index_file: defaults::INDEX_FILE_NAME.to_string(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `logs` in the application data directory
    pub log_dir: Option<PathBuf>,

    /// Name of the active log file
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: HashMap::new(),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Manager for `config.json` in the platform config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Manager for an explicit configuration file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file {:?}", self.config_path))?;
        config.validate()?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountFile {
    Wrapped { fields: AccountFields },
    Bare(AccountFields),
}

/// Load account credentials handed over by the host harness.
///
/// Accepts `{"fields": {"login": .., "password": ..}}` as well as the bare
/// inner object.
pub async fn load_account_fields(path: &Path) -> Result<AccountFields> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read account fields from {:?}", path))?;

    let fields = match serde_json::from_str::<AccountFile>(&content)
        .with_context(|| format!("{:?} does not contain login and password fields", path))?
    {
        AccountFile::Wrapped { fields } | AccountFile::Bare(fields) => fields,
    };

    if fields.login.trim().is_empty() {
        bail!("Account login in {:?} is empty", path);
    }
    Ok(fields)
}

/// Thomann portal constants
pub mod thomann {
    /// Vendor identifier
    pub const VENDOR: &str = "thomann";

    pub const LOGIN_URL: &str = "https://www.thomann.de/intl/mythomann_login.html";

    pub const ORDERS_LIST_URL: &str = "https://www.thomann.de/intl/mythomann_orderlist.html";
}

/// Default configuration values
pub mod defaults {
    /// Directory name below the platform config/data directories
    pub const APP_DIR_NAME: &str = "thomann-bills";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default request rate towards the portal
    pub const MAX_REQUESTS_PER_SECOND: u32 = 2;

    pub const USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    /// Sequential detail fetching
    pub const DETAIL_MAX_CONCURRENT: usize = 1;

    pub const INDEX_FILE_NAME: &str = "bills.json";

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = true;

    pub const LOG_FILE_NAME: &str = "thomann-bills.log";
}
