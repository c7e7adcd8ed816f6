//! Loader for workspace configuration with YAML + environment overlays.
//!
//! `adlift.yaml` configures the HTTP server, the feed output directory, and
//! the optional browser collaborator. `ADLIFT_`-prefixed environment
//! variables override file values, and `${VAR}` placeholders inside values
//! are expanded recursively (with a depth cap so cycles terminate).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct AdliftConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Present only when the browser collaborator is enabled.
    #[serde(default)]
    pub browser: Option<BrowserConfig>,
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory all feed files are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// WebDriver session settings for the browser collaborator.
#[derive(Debug, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub headless: bool,
    /// `ip:port` or `user:pass@ip:port`.
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    pub login: String,
    pub password: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_output_dir() -> String {
    "out_xml".into()
}
fn default_webdriver_url() -> String {
    "http://localhost:4444/wd/hub".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct AdliftConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for AdliftConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AdliftConfigLoader {
    /// Start with sensible defaults: YAML file + `ADLIFT_` env overrides.
    ///
    /// ```
    /// use adlift_config::AdliftConfigLoader;
    ///
    /// let config = AdliftConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.server.port, 8080);
    /// assert_eq!(config.storage.output_dir, "out_xml");
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("ADLIFT").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent; pure-environment deployments skip it.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders first.
    ///
    /// ```
    /// use adlift_config::AdliftConfigLoader;
    ///
    /// unsafe { std::env::set_var("MARKET_PASSWORD", "injected-from-env"); }
    ///
    /// let config = AdliftConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// storage:
    ///   output_dir: "feeds"
    /// credentials:
    ///   login: "seller@example.com"
    ///   password: "${MARKET_PASSWORD}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.storage.output_dir, "feeds");
    /// assert_eq!(config.credentials.unwrap().password, "injected-from-env");
    ///
    /// unsafe { std::env::remove_var("MARKET_PASSWORD"); }
    /// ```
    pub fn load(self) -> Result<AdliftConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: AdliftConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
