mod color_choice;
mod log_level;

pub use color_choice::ColorChoice;
pub use log_level::LogLevel;
