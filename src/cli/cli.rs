use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};

/// An in-memory filesystem driven by a small command shell
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Snapshot to install as the root at startup (.json or .bin)
    #[clap(long)]
    pub load: Option<PathBuf>,

    /// Snapshot to write the tree to on exit (.json or .bin)
    #[clap(long)]
    pub save: Option<PathBuf>,

    /// YAML config file [default: memfs.yaml when present]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    #[clap(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Text shown before each command
    #[clap(long)]
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_save_flags_take_paths() {
        let cli = Cli::parse_from(["memfs", "--load", "in.json", "--save", "out.bin"]);
        assert_eq!(cli.load, Some(PathBuf::from("in.json")));
        assert_eq!(cli.save, Some(PathBuf::from("out.bin")));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn log_level_accepts_silent() {
        let cli = Cli::parse_from(["memfs", "-l", "silent"]);
        assert_eq!(cli.log_level, LogLevel::Silent);
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert!(Cli::try_parse_from(["memfs", "--color", "rainbow"]).is_err());
    }
}
