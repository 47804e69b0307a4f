//! Loader for harvester configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional `w3c.yaml` (or any file the
//! `config` crate recognises by suffix), inline YAML snippets, then
//! `W3C__`-prefixed environment variables using `__` as the nesting
//! separator (`W3C__BROWSER__HEADLESS=false`). String values may reference
//! `${VAR}`; references are expanded after merging.
//!
//! Every section has defaults, so an empty source set yields a usable
//! configuration pointed at a local Chromedriver.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "w3c.yaml";
pub const DEFAULT_INDEX_URL: &str = "https://www.w3.org/TR/";

#[derive(Debug, Deserialize)]
pub struct HarvestConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub harvest: HarvestLimits,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WebDriver session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
            extra_args: Vec::new(),
        }
    }
}

/// Traversal settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "default_index_url")]
    pub index_url: String,
    /// Ceiling for waiting on a document body.
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,
    /// Ceiling for waiting on the rendered commit timeline.
    #[serde(default = "default_commit_timeout_secs")]
    pub commit_timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            element_timeout_secs: default_element_timeout_secs(),
            commit_timeout_secs: default_commit_timeout_secs(),
        }
    }
}

/// Host-side acceptance policy.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestLimits {
    /// `null` in YAML disables the cap.
    #[serde(default = "default_max_count_documents")]
    pub max_count_documents: Option<usize>,
    /// Fingerprint of the newest document seen by a previous run.
    #[serde(default)]
    pub last_document_fingerprint: Option<String>,
    /// JSON-lines output path; stdout when unset.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            max_count_documents: default_max_count_documents(),
            last_document_fingerprint: None,
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub format: LogFormatSetting,
    #[serde(default = "default_true")]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            dir: None,
            format: LogFormatSetting::Text,
            emit_stderr: true,
            filter: default_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_index_url() -> String {
    DEFAULT_INDEX_URL.into()
}
fn default_element_timeout_secs() -> u64 {
    20
}
fn default_commit_timeout_secs() -> u64 {
    10
}
fn default_max_count_documents() -> Option<usize> {
    Some(50)
}
fn default_app_name() -> String {
    "w3c-harvest".into()
}
fn default_filter() -> String {
    "info".into()
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

impl HarvestConfig {
    /// Reject values that would only fail later, mid-run.
    fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.parser.index_url).map_err(|e| {
            ConfigError::Message(format!(
                "parser.index_url `{}` is not a URL: {e}",
                self.parser.index_url
            ))
        })?;
        if self.parser.element_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "parser.element_timeout_secs must be positive".into(),
            ));
        }
        if self.harvest.max_count_documents == Some(0) {
            return Err(ConfigError::Message(
                "harvest.max_count_documents must be positive or null".into(),
            ));
        }
        Ok(())
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct HarvestConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for HarvestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestConfigLoader {
    /// Start with no file sources; `W3C__` environment overrides are always
    /// applied last.
    ///
    /// ```
    /// use w3c_config::HarvestConfigLoader;
    ///
    /// let config = HarvestConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.parser.index_url, "https://www.w3.org/TR/");
    /// assert_eq!(config.harvest.max_count_documents, Some(50));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use w3c_config::{HarvestConfigLoader, LogFormatSetting};
    ///
    /// let cfg = HarvestConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// browser:
    ///   headless: false
    ///   extra_args: ["--proxy-server=socks5://127.0.0.1:1080"]
    /// harvest:
    ///   max_count_documents: 10
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!cfg.browser.headless);
    /// assert_eq!(cfg.browser.extra_args.len(), 1);
    /// assert_eq!(cfg.harvest.max_count_documents, Some(10));
    /// assert_eq!(cfg.logging.format, LogFormatSetting::Json);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use w3c_config::HarvestConfigLoader;
    ///
    /// unsafe { std::env::set_var("CHROMEDRIVER_HOST", "chromedriver.internal"); }
    ///
    /// let config = HarvestConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// browser:
    ///   webdriver_url: "http://${CHROMEDRIVER_HOST}:9515"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.browser.webdriver_url, "http://chromedriver.internal:9515");
    ///
    /// unsafe { std::env::remove_var("CHROMEDRIVER_HOST"); }
    /// ```
    pub fn load(self) -> Result<HarvestConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("W3C")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: HarvestConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
