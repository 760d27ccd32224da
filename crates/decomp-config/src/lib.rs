//! Synthesis configuration, loaded from `decomp.toml`.
//!
//! Every key is optional; an empty file yields the defaults the engine has
//! always used.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "decomp.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// DecompConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecompConfig {
    pub naming: NamingConfig,
    pub classification: ClassificationConfig,
    pub cache: CacheConfig,
}

impl DecompConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.naming.validate()?;
        self.classification.validate()?;

        Ok(())
    }
}

///
/// NamingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub class_prefix: String,
    pub dto_suffix: String,
    pub mapper_suffix: String,
    pub dto_package: String,
    pub mapper_package: String,
    pub instance_field: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            class_prefix: String::new(),
            dto_suffix: "DTO".to_string(),
            mapper_suffix: "Mapper".to_string(),
            dto_package: "dto".to_string(),
            mapper_package: "mapper".to_string(),
            instance_field: "INSTANCE".to_string(),
        }
    }
}

impl NamingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.class_prefix.is_empty() {
            check_identifier("naming.class_prefix", &self.class_prefix)?;
        }
        check_identifier("naming.dto_suffix", &self.dto_suffix)?;
        check_identifier("naming.mapper_suffix", &self.mapper_suffix)?;
        check_identifier("naming.dto_package", &self.dto_package)?;
        check_identifier("naming.mapper_package", &self.mapper_package)?;
        check_identifier("naming.instance_field", &self.instance_field)?;

        if self.dto_suffix == self.mapper_suffix {
            return Err(ConfigError::Invalid(
                "naming.dto_suffix and naming.mapper_suffix must differ".to_string(),
            ));
        }
        if self.dto_package == self.mapper_package {
            return Err(ConfigError::Invalid(
                "naming.dto_package and naming.mapper_package must differ".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// ClassificationConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationConfig {
    pub standard_prefixes: Vec<String>,
    pub serializable_marker: String,
    pub collection_marker: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            standard_prefixes: ["java.", "javax.", "jdk.", "sun."]
                .into_iter()
                .map(str::to_string)
                .collect(),
            serializable_marker: "java.io.Serializable".to_string(),
            collection_marker: "java.util.Collection".to_string(),
        }
    }
}

impl ClassificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.standard_prefixes.is_empty() {
            return Err(ConfigError::Invalid(
                "classification.standard_prefixes must list at least one prefix".to_string(),
            ));
        }
        if self.standard_prefixes.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "classification.standard_prefixes contains an empty prefix".to_string(),
            ));
        }
        if self.serializable_marker.is_empty() || self.collection_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "classification markers must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a qualified name falls under a standard-library namespace.
    #[must_use]
    pub fn is_standard(&self, qualified_name: &str) -> bool {
        self.standard_prefixes
            .iter()
            .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }
}

///
/// CacheConfig
///
/// Memoization keys. The defaults reproduce the coarse keys of the original
/// engine: classification ignores generic arguments and codecs are shared by
/// simple name.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub classification_key: ClassificationKey,
    pub codec_key: CodecKey,
}

///
/// ClassificationKey
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKey {
    /// Qualified name without generic arguments.
    #[default]
    Qualified,
    /// Full generic-qualified signature.
    Generic,
}

///
/// CodecKey
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKey {
    #[default]
    Simple,
    Qualified,
}

fn check_identifier(key: &str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be a non-empty identifier, got '{value}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = DecompConfig::from_toml_str("").unwrap();

        assert_eq!(config, DecompConfig::default());
        assert_eq!(config.naming.dto_suffix, "DTO");
        assert_eq!(config.cache.codec_key, CodecKey::Simple);
        assert!(config.classification.is_standard("javax.money.Amount"));
        assert!(!config.classification.is_standard("com.example.Person"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = DecompConfig::from_toml_str(
            r#"
            [naming]
            dto_suffix = "Dto"

            [cache]
            classification_key = "generic"
            codec_key = "qualified"
            "#,
        )
        .unwrap();

        assert_eq!(config.naming.dto_suffix, "Dto");
        assert_eq!(config.naming.mapper_suffix, "Mapper");
        assert_eq!(config.cache.classification_key, ClassificationKey::Generic);
        assert_eq!(config.cache.codec_key, CodecKey::Qualified);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DecompConfig::from_toml_str("[naming]\ndto_sufix = \"X\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = DecompConfig::from_toml_str("[naming]\ndto_package = \"my.dto\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err =
            DecompConfig::from_toml_str("[classification]\nstandard_prefixes = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = DecompConfig::from_toml_str("[naming]\nmapper_suffix = \"DTO\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[naming]\nclass_prefix = \"Remote\"").unwrap();

        let config = DecompConfig::load(file.path()).unwrap();
        assert_eq!(config.naming.class_prefix, "Remote");

        let err = DecompConfig::load("/definitely/not/here/decomp.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
