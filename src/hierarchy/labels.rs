use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::graph::GraphQueryService;

/// Resolves the display label of an entity when its node is materialized.
pub trait LabelSource {
    fn label_for(&self, uri: &str) -> Option<String>;
}

/// Which `rdfs:label` literals are acceptable for classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageFilter {
    /// Any literal, tagged or not.
    #[default]
    Any,
    /// Only literals without a language tag.
    Untagged,
    /// Only literals tagged exactly with this language.
    Tag(String),
}

impl LanguageFilter {
    /// Builds a filter from an optional config value: `None` accepts any
    /// language, `""` only untagged literals, anything else is an exact tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::hierarchy::LanguageFilter;
    ///
    /// assert_eq!(LanguageFilter::from_setting(None), LanguageFilter::Any);
    /// assert_eq!(LanguageFilter::from_setting(Some("")), LanguageFilter::Untagged);
    /// assert_eq!(LanguageFilter::from_setting(Some("pt")), LanguageFilter::Tag("pt".into()));
    /// ```
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting {
            None => Self::Any,
            Some("") => Self::Untagged,
            Some(tag) => Self::Tag(tag.to_string()),
        }
    }

    pub fn accepts(&self, language: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Untagged => language.is_none(),
            Self::Tag(tag) => language == Some(tag.as_str()),
        }
    }
}

/// Class labels read from the graph's `rdfs:label` literals. First match wins.
pub struct ClassLabels<'g> {
    graph: &'g dyn GraphQueryService,
    filter: LanguageFilter,
}

impl<'g> ClassLabels<'g> {
    pub fn new(graph: &'g dyn GraphQueryService, filter: LanguageFilter) -> Self {
        Self { graph, filter }
    }
}

impl LabelSource for ClassLabels<'_> {
    fn label_for(&self, uri: &str) -> Option<String> {
        self.graph
            .labels(uri)
            .into_iter()
            .find(|literal| self.filter.accepts(literal.language.as_deref()))
            .map(|literal| literal.value)
    }
}

/// Errors raised while loading a property label table.
#[derive(Debug, Error)]
pub enum PropertyLabelsError {
    #[error("failed to read property labels `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid property labels: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Static property URI to display string table.
///
/// Stored as TOML:
///
/// ```toml
/// [properties]
/// "http://example.org/zoo#owns" = "owns"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PropertyLabels {
    #[serde(default)]
    properties: HashMap<String, String>,
}

impl PropertyLabels {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Parses a label table from TOML text.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::hierarchy::{LabelSource, PropertyLabels};
    ///
    /// let labels = PropertyLabels::from_toml_str(r#"
    ///     [properties]
    ///     "http://ex.org#owns" = "is the owner of"
    /// "#).unwrap();
    /// assert_eq!(labels.label_for("http://ex.org#owns").as_deref(), Some("is the owner of"));
    /// assert_eq!(labels.label_for("http://ex.org#name"), None);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, PropertyLabelsError> {
        toml::from_str(text).map_err(PropertyLabelsError::Parse)
    }

    /// Loads a label table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PropertyLabelsError> {
        let text = std::fs::read_to_string(path).map_err(|source| PropertyLabelsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl LabelSource for PropertyLabels {
    fn label_for(&self, uri: &str) -> Option<String> {
        self.properties.get(uri).cloned()
    }
}
