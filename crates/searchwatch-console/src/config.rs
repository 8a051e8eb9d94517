/*
[INPUT]:  YAML configuration file and SEARCHWATCH__* environment variables
[OUTPUT]: Parsed console configuration and derived client/poll settings
[POS]:    Configuration layer - console setup
[UPDATE]: When adding new configuration options
[UPDATE]: 2026-09-21 Layer file and environment through the config crate
*/

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use searchwatch_adapter::{ClientConfig, Credentials, DEFAULT_BASE_URL, PollConfig, SearchwatchClient};

const ENV_PREFIX: &str = "SEARCHWATCH";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration for the console
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,
    /// Run Now polling
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Log filter and optional log directory
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer key; usually supplied through SEARCHWATCH__API__API_KEY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_max_attempts() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConsoleConfig {
    /// `<config_dir>/searchwatch/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("searchwatch").join("config.yaml"))
    }

    /// Load from an explicit file (must exist) or the default path (optional),
    /// then apply process environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_env(explicit, None)
    }

    /// Like [`load`](Self::load) but reads overrides from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("config file not found: {}", path.display()));
                }
                builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder
                        .add_source(File::from(path).format(FileFormat::Yaml).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("api.base_url '{}' is not a valid URL", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("api.base_url must use http or https"));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        if self.preview.poll_interval_ms == 0 {
            return Err(anyhow!("preview.poll_interval_ms must be greater than zero"));
        }
        if self.preview.max_attempts == 0 {
            return Err(anyhow!("preview.max_attempts must be greater than zero"));
        }
        Ok(())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.preview.poll_interval_ms),
            max_attempts: self.preview.max_attempts,
        }
    }

    /// HTTP client for this configuration, with credentials when a key is set.
    pub fn build_client(&self) -> Result<SearchwatchClient> {
        let client =
            SearchwatchClient::with_config_and_base_url(self.client_config(), &self.api.base_url)
                .context("create API client")?;
        Ok(match self.api_key() {
            Some(key) => client.with_credentials(Credentials {
                api_key: key.to_string(),
            }),
            None => client,
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_yaml()?)
            .with_context(|| format!("failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write yaml");
        file
    }

    #[test]
    fn defaults_apply_to_missing_sections() {
        let file = yaml_file("api:\n  base_url: https://watch.example.com/api/v1\n");
        let config = ConsoleConfig::load_with_env(Some(file.path()), Some(HashMap::new()))
            .expect("load config");

        assert_eq!(config.api.base_url, "https://watch.example.com/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.preview, PreviewConfig::default());
        assert_eq!(config.poll_config(), PollConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = yaml_file(
            "api:\n  base_url: https://watch.example.com\n  api_key: from-file\npreview:\n  max_attempts: 10\n",
        );
        let env = HashMap::from([
            ("SEARCHWATCH__API__API_KEY".to_string(), "from-env".to_string()),
            ("SEARCHWATCH__PREVIEW__POLL_INTERVAL_MS".to_string(), "250".to_string()),
        ]);

        let config = ConsoleConfig::load_with_env(Some(file.path()), Some(env)).expect("load config");

        assert_eq!(config.api_key(), Some("from-env"));
        assert_eq!(config.preview.max_attempts, 10);
        assert_eq!(config.poll_config().interval, Duration::from_millis(250));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ConsoleConfig::load_with_env(
            Some(Path::new("/definitely/not/here.yaml")),
            Some(HashMap::new()),
        )
        .expect_err("missing file");
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = yaml_file("api:\n  base_url: ftp://watch.example.com\n");
        assert!(ConsoleConfig::load_with_env(Some(file.path()), Some(HashMap::new())).is_err());

        let file = yaml_file("preview:\n  max_attempts: 0\n");
        assert!(ConsoleConfig::load_with_env(Some(file.path()), Some(HashMap::new())).is_err());
    }

    #[test]
    fn written_yaml_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = ConsoleConfig::default();
        config.api.api_key = Some("sk-written".to_string());
        config.logging.directory = Some(dir.path().join("logs"));

        config.write_to(&path).expect("write config");
        let loaded = ConsoleConfig::load_with_env(Some(&path), Some(HashMap::new())).expect("load");

        assert_eq!(loaded, config);
    }
}
