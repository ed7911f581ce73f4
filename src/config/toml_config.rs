use crate::core::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub session: Option<SessionConfig>,
    pub qr: Option<QrConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    pub link_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PRECAST_API_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.api.token.as_deref().filter(|t| !t.is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn username(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.username.as_deref())
    }

    /// Falls back to the API base URL.
    fn qr_link_base(&self) -> &str {
        self.qr
            .as_ref()
            .map(|q| q.link_base.as_str())
            .unwrap_or(self.api.base_url.as_str())
    }

    fn output_path(&self) -> &str {
        self.report
            .as_ref()
            .map(|r| r.output_path.as_str())
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_provider(self)
    }
}
