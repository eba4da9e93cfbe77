use clap::ValueEnum;
use supports_color::Stream;

/// When `ls` entries and error lines get colored.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when stdout is a terminal that supports it
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Auto => supports_color::on(Stream::Stdout).is_some(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}
