use crate::config::toml_config::{is_unresolved_placeholder, TomlConfig};
use crate::core::ConfigProvider;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};

pub const DEFAULT_CONFIG_PATH: &str = "searchdesk.toml";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8108;
pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;

/// Values given on the command line; each one overrides the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_file_size_mb: Option<usize>,
    pub strict_types: bool,
    pub verbose: bool,
    pub json_logs: bool,
}

/// Fully resolved configuration: flag > file > default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub max_file_size_mb: usize,
    pub strict_types: bool,
    pub verbose: bool,
    pub json_logs: bool,
    service_url: String,
}

impl Settings {
    pub fn merge(overrides: SettingsOverrides, file: TomlConfig) -> Self {
        let host = overrides
            .host
            .or(file.service.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = overrides.port.or(file.service.port).unwrap_or(DEFAULT_PORT);
        let protocol = overrides
            .protocol
            .or(file.service.protocol)
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        let service_url = format!("{}://{}:{}", protocol, host, port);

        Self {
            host,
            port,
            protocol,
            api_key: overrides.api_key.or(file.service.api_key),
            timeout_seconds: overrides
                .timeout_seconds
                .or(file.service.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            max_file_size_mb: overrides
                .max_file_size_mb
                .or(file.import.max_file_size_mb)
                .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB),
            strict_types: overrides.strict_types || file.import.strict_types.unwrap_or(false),
            verbose: overrides.verbose || file.logging.verbose.unwrap_or(false),
            json_logs: overrides.json_logs || file.logging.json.unwrap_or(false),
            service_url,
        }
    }

    /// 未指定設定檔時，若工作目錄有 `searchdesk.toml` 就使用它
    pub fn load(config_path: Option<&str>, overrides: SettingsOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => TomlConfig::from_file(path)?,
            None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                TomlConfig::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => TomlConfig::default(),
        };
        Ok(Self::merge(overrides, file))
    }
}

impl ConfigProvider for Settings {
    fn service_url(&self) -> &str {
        &self.service_url
    }

    fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    fn strict_types(&self) -> bool {
        self.strict_types
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        let api_key = validate_required_field("service.api_key", &self.api_key)?;
        if is_unresolved_placeholder(api_key) {
            return Err(AdminError::MissingConfigError {
                field: format!("service.api_key (environment variable in '{}')", api_key),
            });
        }
        validate_non_empty_string("service.api_key", api_key)?;
        validate_non_empty_string("service.host", &self.host)?;

        if !matches!(self.protocol.as_str(), "http" | "https") {
            return Err(AdminError::InvalidConfigValueError {
                field: "service.protocol".to_string(),
                value: self.protocol.clone(),
                reason: "Protocol must be http or https".to_string(),
            });
        }

        validate_url("service.url", &self.service_url)?;
        validate_range("service.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_positive_number("import.max_file_size_mb", self.max_file_size_mb, 1)?;

        Ok(())
    }
}
