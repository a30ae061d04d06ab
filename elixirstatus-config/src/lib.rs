//! Loader for ElixirStatus configuration: YAML file + environment overlays.
//!
//! Precedence, lowest first: YAML sources in the order they were added, then
//! `ELIXIRSTATUS__`-prefixed environment variables (`__` separates nesting, so
//! `ELIXIRSTATUS__TWITTER__HASHTAG=elixir` overrides `twitter.hashtag`). After merging,
//! `${VAR}` placeholders in string values are expanded from the process environment.
use config::{Config, ConfigError, Environment as EnvSource, File, FileFormat};
use elixirstatus_common::Environment;
use elixirstatus_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "ELIXIRSTATUS";
const SECRET_KEYS: &[(&str, &str)] = &[("twitter", "access_token")];

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub environment: Environment,
    pub site: SiteConfig,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Canonical public URL, e.g. `https://elixirstatus.com`.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    /// User-context OAuth 2.0 token. Only required when `environment` is `prod`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_token: Option<String>,
    #[serde(default = "default_twitter_api_base")]
    pub api_base: String,
    /// Account that gets a direct message for every new posting.
    #[serde(default, deserialize_with = "lenient_string")]
    pub direct_message_recipient: Option<String>,
    /// Appended as `#tag` when the tweet has room. Empty disables it.
    #[serde(default = "default_hashtag", deserialize_with = "lenient_string")]
    pub hashtag: Option<String>,
    #[serde(default = "default_max_tweet_length")]
    pub max_tweet_length: usize,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: default_twitter_api_base(),
            direct_message_recipient: None,
            hashtag: default_hashtag(),
            max_tweet_length: default_max_tweet_length(),
        }
    }
}

impl TwitterConfig {
    /// Hashtag without a leading `#`, or `None` when disabled.
    pub fn hashtag(&self) -> Option<&str> {
        self.hashtag
            .as_deref()
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self, app_name: &str) -> LogConfig {
        LogConfig {
            app_name: app_name.to_string(),
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

/// Env overrides go through `try_parsing`, so `ELIXIRSTATUS__TWITTER__HASHTAG=2024`
/// arrives as a number. Text fields take scalars back as strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

fn default_database_url() -> String {
    "sqlite://elixirstatus.db?mode=rwc".into()
}
fn default_twitter_api_base() -> String {
    "https://api.twitter.com".into()
}
fn default_hashtag() -> Option<String> {
    Some("elixirlang".into())
}
fn default_max_tweet_length() -> usize {
    140
}
fn default_log_filter() -> String {
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
                        Err(_) => break,
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

/// A secret whose `${VAR}` could not be expanded counts as unset, so it can never be
/// sent as a literal placeholder.
fn clear_unresolved_secrets(v: &mut Value) {
    for (section, key) in SECRET_KEYS {
        if let Some(slot) = v.get_mut(*section).and_then(|s| s.get_mut(*key)) {
            if slot.as_str().is_some_and(|s| s.contains("${")) {
                *slot = Value::Null;
            }
        }
    }
}

/// Builder over the `config` crate wiring.
pub struct StatusConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for StatusConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusConfigLoader {
    /// Start an empty loader; environment overrides are applied last in [`Self::load`].
    ///
    /// ```
    /// use elixirstatus_config::StatusConfigLoader;
    ///
    /// let config = StatusConfigLoader::new()
    ///     .with_yaml_str("site:\n  base_url: https://elixirstatus.com")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.site.base_url, "https://elixirstatus.com");
    /// assert_eq!(config.twitter.max_tweet_length, 140);
    /// assert_eq!(config.twitter.hashtag(), Some("elixirlang"));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for deployments configured purely by env.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    pub fn load(self) -> Result<StatusConfig, ConfigError> {
        // Later sources win, so the environment goes on top of every file.
        let cfg = self
            .builder
            .add_source(
                EnvSource::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);
        clear_unresolved_secrets(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
