use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HarnessConfig {
    #[serde(default)]
    pub bmc: BmcConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Connection settings for the BMC under test.
#[derive(Debug, Clone, Deserialize)]
pub struct BmcConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub http_timeout_seconds: u64,
}

impl BmcConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Versioned Redfish service root, e.g. `https://host:2443/redfish/v1`.
    pub fn redfish_root(&self) -> String {
        format!("{}/redfish/v1", self.base_url.trim_end_matches('/'))
    }
}

impl Default for BmcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:2443".into(),
            username: "root".into(),
            password: "0penBmc".into(),
            http_timeout_seconds: 10,
        }
    }
}

/// Settings for the browser campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub webdriver_url: String,
    pub base_url: String,
    pub headless: bool,
    pub page_settle_seconds: u64,
    pub element_wait_seconds: u64,
    pub max_login_attempts: u32,
    pub screenshot_dir: PathBuf,
    pub invalid_username: String,
    pub invalid_password: String,
}

impl UiConfig {
    pub fn page_settle(&self) -> Duration {
        Duration::from_secs(self.page_settle_seconds)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_seconds)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            base_url: "https://127.0.0.1:2443/".into(),
            headless: false,
            page_settle_seconds: 2,
            element_wait_seconds: 15,
            max_login_attempts: 3,
            screenshot_dir: PathBuf::from("reports/screenshots"),
            invalid_username: "invalid_user".into(),
            invalid_password: "wrong_password".into(),
        }
    }
}

impl HarnessConfig {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("HARNESS__").split("__"));
        Ok(figment.extract()?)
    }
}
