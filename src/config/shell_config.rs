use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::data::ColorChoice;
use crate::ext::PathDisplayExt;

const CONFIG_FILE_NAME: &str = "memfs.yaml";

const PROMPT_KEY: &str = "prompt";
const COLOR_KEY: &str = "color";
const LOAD_KEY: &str = "load";
const SAVE_KEY: &str = "save";

/// Settings read from the optional YAML config file.
///
/// ```yaml
/// prompt: "memfs> "
/// color: auto        # auto | always | never
/// load: state.json
/// save: state.json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: Option<String>,
    pub color: Option<ColorChoice>,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

impl ShellConfig {
    /// Reads `path`, or `memfs.yaml` in the working directory when no path is given.
    ///
    /// A missing default file means an empty config; a missing explicit file is an error.
    pub async fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path).await,
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_path(default_path).await
                } else {
                    debug!("No {} found, using default settings", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.lossy_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.lossy_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.lossy_display(),
        })?;

        let config = Self::try_from(contents.as_str())?;
        info!("Loaded config from {}", path.lossy_display());
        Ok(config)
    }

    fn string_value<'a>(
        top_level: &'a LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<&'a str>, ConfigError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .context(NotAStringSnafu { key }),
        }
    }
}

impl TryFrom<&str> for ShellConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };
        if matches!(document, Yaml::Value(Scalar::Null)) {
            return Ok(Self::default());
        }

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let color = Self::string_value(top_level, COLOR_KEY)?
            .map(|value| {
                ColorChoice::from_str(value, true).map_err(|_| ConfigError::InvalidColor {
                    value: value.to_string(),
                })
            })
            .transpose()?;

        Ok(ShellConfig {
            prompt: Self::string_value(top_level, PROMPT_KEY)?.map(str::to_string),
            color,
            load: Self::string_value(top_level, LOAD_KEY)?.map(PathBuf::from),
            save: Self::string_value(top_level, SAVE_KEY)?.map(PathBuf::from),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be a string", key))]
    NotAString { key: &'static str },
    #[snafu(display("Unknown color setting '{}', expected auto, always or never", value))]
    InvalidColor { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[compio::test]
    async fn config_returns_error_on_nonexistent_explicit_file() {
        let result = ShellConfig::read(Some(Path::new("nonexistent.yaml"))).await;
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[compio::test]
    async fn config_reads_all_keys_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(
            file,
            "prompt: \"memfs> \"\ncolor: never\nload: in.json\nsave: out.bin"
        )
        .expect("Failed to write to temp file");

        let config = ShellConfig::read(Some(file.path())).await.unwrap();
        assert_eq!(
            config,
            ShellConfig {
                prompt: Some("memfs> ".to_string()),
                color: Some(ColorChoice::Never),
                load: Some(PathBuf::from("in.json")),
                save: Some(PathBuf::from("out.bin")),
            }
        );
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result = ShellConfig::try_from("invalid: yaml: content: [unclosed");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn config_handles_empty_file() {
        assert_eq!(ShellConfig::try_from("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn config_returns_error_when_top_level_is_not_map() {
        let result = ShellConfig::try_from("- item1\n- item2");
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[test]
    fn config_ignores_unknown_and_null_keys() {
        let config = ShellConfig::try_from("other: value\nprompt:\n").unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn config_rejects_non_string_values() {
        let result = ShellConfig::try_from("prompt:\n  - a\n  - b");
        assert!(matches!(
            result,
            Err(ConfigError::NotAString { key: "prompt" })
        ));
    }

    #[test]
    fn config_rejects_unknown_colors() {
        let result = ShellConfig::try_from("color: rainbow");
        assert!(matches!(result, Err(ConfigError::InvalidColor { .. })));
    }

    #[test]
    fn config_color_is_case_insensitive() {
        let config = ShellConfig::try_from("color: Always").unwrap();
        assert_eq!(config.color, Some(ColorChoice::Always));
    }
}
