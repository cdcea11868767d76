//! Recommendation settings.
//!
//! Settings are read from a TOML file, then individual values may be
//! overridden through `ONTOREC_*` environment variables. Every option has a
//! default, so an empty file (or no file at all) is a valid configuration.
//!
//! ```toml
//! depth = 2
//! family_position = -1
//! filter_by = "range"
//! order = "semantic"
//! order_set = "all"
//! size = 5
//! text_template = "Did you mean {}?"
//! suggestion_prefix_text = "Suggestions:"
//! embedding_model_path = "/models/glove.txt"
//! similarity_threshold = 0.35
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hierarchy::LanguageFilter;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ONTOREC_CONFIG";

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[source] toml::de::Error),

    /// A value is syntactically fine but not acceptable.
    #[error("invalid `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to determine config directory")]
    NoConfigDir,
}

/// Which side of a property is checked against the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterBy {
    Domain,
    Range,
    #[default]
    Both,
}

impl FilterBy {
    pub fn checks_domain(self) -> bool {
        matches!(self, Self::Domain | Self::Both)
    }

    pub fn checks_range(self) -> bool {
        matches!(self, Self::Range | Self::Both)
    }
}

/// How accepted candidates are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Keep traversal order.
    #[default]
    None,
    /// Shuffle uniformly.
    Random,
    /// Rank by label similarity and drop those below the threshold.
    Semantic,
}

/// Which candidate lists the [`Order`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSet {
    #[default]
    None,
    Property,
    Class,
    All,
}

impl OrderSet {
    pub fn orders_properties(self) -> bool {
        matches!(self, Self::Property | Self::All)
    }

    pub fn orders_classes(self) -> bool {
        matches!(self, Self::Class | Self::All)
    }
}

macro_rules! impl_setting_enum {
    ($ty:ty, $key:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(ConfigError::Invalid {
                        key: $key,
                        reason: format!(
                            "`{other}` is not one of {}",
                            [$($name),+].join(", ")
                        ),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $(if *self == $variant {
                    return f.write_str($name);
                })+
                Ok(())
            }
        }
    };
}

impl_setting_enum!(FilterBy, "filter_by", {
    "domain" => FilterBy::Domain,
    "range" => FilterBy::Range,
    "both" => FilterBy::Both,
});

impl_setting_enum!(Order, "order", {
    "none" => Order::None,
    "random" => Order::Random,
    "semantic" => Order::Semantic,
});

impl_setting_enum!(OrderSet, "order_set", {
    "none" => OrderSet::None,
    "property" => OrderSet::Property,
    "class" => OrderSet::Class,
    "all" => OrderSet::All,
});

/// Every recognized recommendation option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationConfig {
    /// Number of tree levels collected below the reference root.
    pub depth: usize,
    /// Signed ancestor offset of the reference root.
    pub family_position: i32,
    pub filter_by: FilterBy,
    pub order: Order,
    pub order_set: OrderSet,
    /// Maximum number of suggestions returned.
    pub size: usize,
    /// Suggestion template; `{}` is replaced with the candidate's label.
    pub text_template: String,
    pub suggestion_prefix_text: String,
    /// word2vec text-format model used by semantic ordering.
    pub embedding_model_path: Option<PathBuf>,
    /// Minimum similarity a candidate needs under semantic ordering.
    pub similarity_threshold: Option<f64>,
    /// Class label language: unset for any, `""` for untagged only.
    pub label_language: Option<String>,
    /// Ollama server used when no local model is configured.
    pub embedding_endpoint: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_timeout_secs: u64,
    /// Fixes the shuffle of random ordering.
    pub seed: Option<u64>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            family_position: -1,
            filter_by: FilterBy::default(),
            order: Order::default(),
            order_set: OrderSet::default(),
            size: 10,
            text_template: "{}".to_string(),
            suggestion_prefix_text: String::new(),
            embedding_model_path: None,
            similarity_threshold: None,
            label_language: None,
            embedding_endpoint: None,
            embedding_model: None,
            embedding_timeout_secs: 30,
            seed: None,
        }
    }
}

impl RecommendationConfig {
    /// Parses TOML text. Missing keys take their defaults; unknown keys are
    /// rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::config::{FilterBy, RecommendationConfig};
    ///
    /// let config = RecommendationConfig::from_toml_str("filter_by = \"range\"\nsize = 3").unwrap();
    /// assert_eq!(config.filter_by, FilterBy::Range);
    /// assert_eq!(config.size, 3);
    /// assert_eq!(config.depth, 2);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Finds, loads, overrides and validates the configuration.
    ///
    /// The file is `explicit` if given, else `$ONTOREC_CONFIG`, else the
    /// default path when it exists; with none of those the defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
                _ => default_config_path().ok().filter(|path| path.exists()),
            },
        };

        let config = match &path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading recommendation config");
                Self::load(path)?
            }
            None => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies `ONTOREC_<KEY>` environment overrides.
    ///
    /// Values that fail to parse are ignored and the current value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        override_parsed("ONTOREC_DEPTH", &mut self.depth);
        override_parsed("ONTOREC_FAMILY_POSITION", &mut self.family_position);
        override_parsed("ONTOREC_FILTER_BY", &mut self.filter_by);
        override_parsed("ONTOREC_ORDER", &mut self.order);
        override_parsed("ONTOREC_ORDER_SET", &mut self.order_set);
        override_parsed("ONTOREC_SIZE", &mut self.size);
        override_parsed("ONTOREC_EMBEDDING_TIMEOUT_SECS", &mut self.embedding_timeout_secs);

        if let Ok(value) = std::env::var("ONTOREC_TEXT_TEMPLATE") {
            self.text_template = value;
        }
        if let Ok(value) = std::env::var("ONTOREC_SUGGESTION_PREFIX_TEXT") {
            self.suggestion_prefix_text = value;
        }
        if let Ok(value) = std::env::var("ONTOREC_LABEL_LANGUAGE") {
            self.label_language = Some(value);
        }
        if let Some(value) = non_empty_var("ONTOREC_EMBEDDING_MODEL_PATH") {
            self.embedding_model_path = Some(PathBuf::from(value));
        }
        if let Some(value) = non_empty_var("ONTOREC_EMBEDDING_ENDPOINT") {
            self.embedding_endpoint = Some(value);
        }
        if let Some(value) = non_empty_var("ONTOREC_EMBEDDING_MODEL") {
            self.embedding_model = Some(value);
        }
        if let Some(value) = parsed_var("ONTOREC_SIMILARITY_THRESHOLD") {
            self.similarity_threshold = Some(value);
        }
        if let Some(value) = parsed_var("ONTOREC_SEED") {
            self.seed = Some(value);
        }
        self
    }

    /// Checks the options against each other.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(invalid("depth", "must be at least 1"));
        }
        if self.size == 0 {
            return Err(invalid("size", "must be at least 1"));
        }
        let placeholders = self.text_template.matches("{}").count();
        if placeholders != 1 {
            return Err(invalid(
                "text_template",
                format!("must contain exactly one `{{}}`, found {placeholders}"),
            ));
        }
        if let Some(threshold) = self.similarity_threshold
            && !(-1.0..=1.0).contains(&threshold)
        {
            return Err(invalid(
                "similarity_threshold",
                format!("{threshold} is outside [-1, 1]"),
            ));
        }
        if self.order == Order::Semantic && self.similarity_threshold.is_none() {
            return Err(invalid(
                "similarity_threshold",
                "required when order is `semantic`",
            ));
        }
        Ok(())
    }

    /// Substitutes `label` into the suggestion template.
    pub fn render(&self, label: &str) -> String {
        self.text_template.replacen("{}", label, 1)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn language_filter(&self) -> LanguageFilter {
        LanguageFilter::from_setting(self.label_language.as_deref())
    }
}

/// Gets the default config path, `{config_dir}/ontorec/recommendation.toml`,
/// where `config_dir` is:
/// - Linux: `~/.config`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("ontorec").join("recommendation.toml"))
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn override_parsed<T: FromStr>(name: &str, slot: &mut T) {
    if let Some(value) = parsed_var(name) {
        *slot = value;
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable override");
            None
        }
    }
}
