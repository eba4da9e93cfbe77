use std::path::PathBuf;

use crate::application::data::ColorChoice;
use crate::cli::Cli;
use crate::config::ShellConfig;

const DEFAULT_PROMPT: &str = "> ";

/// Effective settings for one session. Command-line flags win over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub prompt: String,
    pub color: ColorChoice,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

impl RuntimeConfig {
    pub fn new(cli: Cli, shell_config: ShellConfig) -> Self {
        Self {
            prompt: cli
                .prompt
                .or(shell_config.prompt)
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            color: cli.color.or(shell_config.color).unwrap_or_default(),
            load: cli.load.or(shell_config.load),
            save: cli.save.or(shell_config.save),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("memfs").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_apply_without_flags_or_config() {
        let config = RuntimeConfig::new(cli(&[]), ShellConfig::default());
        assert_eq!(
            config,
            RuntimeConfig {
                prompt: "> ".to_string(),
                color: ColorChoice::Auto,
                load: None,
                save: None,
            }
        );
    }

    #[test]
    fn config_file_fills_in_missing_flags() {
        let shell_config = ShellConfig {
            prompt: Some("fs$ ".to_string()),
            color: Some(ColorChoice::Never),
            load: Some(PathBuf::from("from-config.json")),
            save: Some(PathBuf::from("from-config.json")),
        };
        let config = RuntimeConfig::new(cli(&["--save", "flag.bin"]), shell_config);

        assert_eq!(config.prompt, "fs$ ");
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.load, Some(PathBuf::from("from-config.json")));
        assert_eq!(config.save, Some(PathBuf::from("flag.bin")));
    }

    #[test]
    fn flags_override_the_config_file() {
        let shell_config = ShellConfig {
            prompt: Some("fs$ ".to_string()),
            color: Some(ColorChoice::Never),
            ..ShellConfig::default()
        };
        let config = RuntimeConfig::new(
            cli(&["--prompt", "$ ", "--color", "always", "--load", "in.json"]),
            shell_config,
        );

        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.color, ColorChoice::Always);
        assert_eq!(config.load, Some(PathBuf::from("in.json")));
    }
}
