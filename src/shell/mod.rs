//! Line-oriented command interpreter on top of [`crate::filesystem::FileSystem`].

mod command;
mod output;
mod shell;
mod tokenizer;

pub use output::Output;
pub use shell::{Shell, ShellError};
