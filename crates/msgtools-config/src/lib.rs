//! `msgtools.toml` configuration.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "msgtools.toml";

/// Runtime crate generated code calls into unless configured otherwise.
pub const DEFAULT_RUNTIME_CRATE: &str = "msgtools_runtime";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// MsgtoolsConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsgtoolsConfig {
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
}

impl MsgtoolsConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::from)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&text)
    }

    /// Load `path` if given, else `msgtools.toml` under `dir` when present, else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

///
/// GeneratorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Path of the logging backend crate used by generated code.
    pub runtime_crate: String,

    pub skip_translations: bool,

    /// Directory searched for `<Interface>.i18n_<locale>.properties` files;
    /// the source directory when unset.
    pub translation_files_path: Option<PathBuf>,

    /// Emit a "generated code" doc comment on each generated struct.
    pub generated_header: bool,

    /// Properties file for `${key}` substitution in message text.
    pub expression_properties: Option<PathBuf>,

    /// Write a translation skeleton for this locale next to the generated source.
    pub skeleton_locale: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            skip_translations: false,
            translation_files_path: None,
            generated_header: true,
            expression_properties: None,
            skeleton_locale: None,
        }
    }
}

///
/// OutputConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("generated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_takes_defaults() {
        let config = MsgtoolsConfig::from_toml("").unwrap();
        assert_eq!(config, MsgtoolsConfig::default());
        assert_eq!(config.generator.runtime_crate, DEFAULT_RUNTIME_CRATE);
        assert!(config.generator.generated_header);
        assert_eq!(config.output.dir, PathBuf::from("generated"));
    }

    #[test]
    fn sections_override_single_keys() {
        let config = MsgtoolsConfig::from_toml(
            r#"
            [generator]
            runtime_crate = "crate::rt"
            skip_translations = true
            expression_properties = "expr.properties"

            [output]
            dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.runtime_crate, "crate::rt");
        assert!(config.generator.skip_translations);
        assert!(config.generator.generated_header);
        assert_eq!(
            config.generator.expression_properties,
            Some(PathBuf::from("expr.properties"))
        );
        assert_eq!(config.output.dir, PathBuf::from("out"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MsgtoolsConfig::from_toml("[generator]\nruntime = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn discovery_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MsgtoolsConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, MsgtoolsConfig::default());

        fs::write(dir.path().join(CONFIG_FILE), "[generator]\ngenerated_header = false\n").unwrap();
        let config = MsgtoolsConfig::discover(None, dir.path()).unwrap();
        assert!(!config.generator.generated_header);

        let missing = dir.path().join("missing.toml");
        let err = MsgtoolsConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
