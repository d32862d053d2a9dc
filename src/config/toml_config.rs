use crate::utils::error::{AdminError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// `searchdesk.toml`; every key is optional and command-line flags win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub max_file_size_mb: Option<usize>,
    pub strict_types: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdminError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TYPESENSE_API_KEY})；找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = match PLACEHOLDER.get() {
            Some(re) => re,
            None => {
                let compiled = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdminError::ConfigError {
                    message: format!("Invalid placeholder pattern: {}", e),
                })?;
                PLACEHOLDER.get_or_init(|| compiled)
            }
        };

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

/// 仍含有 `${...}` 表示環境變數沒有設定
pub fn is_unresolved_placeholder(value: &str) -> bool {
    value.contains("${")
}
