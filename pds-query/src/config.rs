use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const BASE_URL_ENV: &str = "PDS_API_BASE_URL";

/// Settings of the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Sort key, also the value used to continue after a page
    #[serde(default = "default_sort_property")]
    pub sort_property: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout(),
            sort_property: default_sort_property(),
            user_agent: default_user_agent(),
        }
    }
}

impl RegistryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid registry configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PDS_API_BASE_URL` when set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        Ok(())
    }
}

// Default functions
fn default_base_url() -> String {
    "https://pds.nasa.gov/api/search/1".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_timeout() -> u64 {
    60
}

fn default_sort_property() -> String {
    "ops:Harvest_Info.ops:harvest_date_time".to_string()
}

fn default_user_agent() -> String {
    format!("pds-query/{}", env!("CARGO_PKG_VERSION"))
}
