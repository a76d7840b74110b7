//! Generator configuration.
//!
//! Controls the JSON Schema dialect, nullability rendering, and naming of
//! generated definitions. Configuration is plain data and can be loaded
//! from YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! draft: draft-07
//! nullable_style: one-of-null
//! disallow_additional_properties: true
//! qualified_definition_names: false
//! auto_title: false
//! title: Petstore
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON Schema draft the generated documents target.
///
/// # Examples
///
/// ```
/// use typeschema_engine::SchemaDraft;
///
/// assert_eq!(SchemaDraft::default(), SchemaDraft::Draft07);
/// assert_eq!(SchemaDraft::Draft202012.definitions_key(), "$defs");
/// assert!(!SchemaDraft::Draft04.supports_const());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaDraft {
    /// Draft 4.
    #[serde(rename = "draft-04")]
    Draft04,
    /// Draft 6.
    #[serde(rename = "draft-06")]
    Draft06,
    /// Draft 7 (the default).
    #[default]
    #[serde(rename = "draft-07")]
    Draft07,
    /// Draft 2019-09.
    #[serde(rename = "2019-09")]
    Draft201909,
    /// Draft 2020-12.
    #[serde(rename = "2020-12")]
    Draft202012,
}

impl SchemaDraft {
    /// Returns the `$schema` URI of the draft.
    pub fn schema_uri(self) -> &'static str {
        match self {
            Self::Draft04 => "http://json-schema.org/draft-04/schema#",
            Self::Draft06 => "http://json-schema.org/draft-06/schema#",
            Self::Draft07 => "http://json-schema.org/draft-07/schema#",
            Self::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Returns the keyword holding named definitions.
    pub fn definitions_key(self) -> &'static str {
        match self {
            Self::Draft04 | Self::Draft06 | Self::Draft07 => "definitions",
            Self::Draft201909 | Self::Draft202012 => "$defs",
        }
    }

    /// Returns the JSON Pointer prefix of `$ref` values.
    pub fn ref_prefix(self) -> &'static str {
        match self {
            Self::Draft04 | Self::Draft06 | Self::Draft07 => "#/definitions/",
            Self::Draft201909 | Self::Draft202012 => "#/$defs/",
        }
    }

    /// Returns `true` when the draft has the `const` keyword.
    pub fn supports_const(self) -> bool {
        self != Self::Draft04
    }
}

/// How nullable members are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullableStyle {
    /// Nullable members are only left out of `required`.
    #[default]
    Omit,
    /// Nullable members are additionally wrapped in
    /// `{"oneOf": [{"type": "null"}, <node>]}`.
    OneOfNull,
}

/// Errors loading or saving a [`GeneratorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Options for one [`SchemaGenerator`](crate::SchemaGenerator).
///
/// Every field has a default, so a YAML file only needs the keys it changes.
///
/// # Examples
///
/// ```
/// use typeschema_engine::{GeneratorConfig, NullableStyle, SchemaDraft};
///
/// let config: GeneratorConfig = serde_yaml::from_str("draft: 2020-12").unwrap();
/// assert_eq!(config.draft, SchemaDraft::Draft202012);
/// assert_eq!(config.nullable_style, NullableStyle::Omit);
///
/// let config = GeneratorConfig::default()
///     .with_draft(SchemaDraft::Draft04)
///     .with_title("Petstore");
/// assert_eq!(config.title.as_deref(), Some("Petstore"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Target draft.
    pub draft: SchemaDraft,
    /// Rendering of nullable members.
    pub nullable_style: NullableStyle,
    /// Emit `"additionalProperties": false` on every object definition.
    pub disallow_additional_properties: bool,
    /// Name definitions after the full identity instead of the simple name.
    pub qualified_definition_names: bool,
    /// Give definitions without an explicit title their simple name as title.
    pub auto_title: bool,
    /// Top-level document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level document description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be written, or
    /// [`ConfigError::YamlError`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Sets the target draft.
    pub fn with_draft(mut self, draft: SchemaDraft) -> Self {
        self.draft = draft;
        self
    }

    /// Sets the nullable rendering.
    pub fn with_nullable_style(mut self, style: NullableStyle) -> Self {
        self.nullable_style = style;
        self
    }

    /// Forbids undeclared properties on object definitions.
    pub fn with_disallow_additional_properties(mut self, disallow: bool) -> Self {
        self.disallow_additional_properties = disallow;
        self
    }

    /// Names definitions after full identities.
    pub fn with_qualified_definition_names(mut self, qualified: bool) -> Self {
        self.qualified_definition_names = qualified;
        self
    }

    /// Derives missing definition titles from simple names.
    pub fn with_auto_title(mut self, auto_title: bool) -> Self {
        self.auto_title = auto_title;
        self
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the document description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}
