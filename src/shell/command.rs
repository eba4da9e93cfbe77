use snafu::prelude::*;

use crate::shell::tokenizer::{TokenizeError, tokenize};

/// Marker that separates the file name from the text in `echo <name> > <text>`.
const REDIRECT: &str = ">";

/// Every command with the usage line shown by `help` and on argument errors.
pub const USAGE: &[(&str, &str)] = &[
    ("mkdir", "mkdir <name>"),
    ("cd", "cd <path>"),
    ("ls", "ls [path]"),
    ("pwd", "pwd"),
    ("grep", "grep <file> <pattern>"),
    ("cat", "cat <file>"),
    ("touch", "touch <name>"),
    ("echo", "echo <name> [>] <text>"),
    ("mv", "mv <source> <destination>"),
    ("cp", "cp <source> <destination>"),
    ("rm", "rm <path>"),
    ("help", "help"),
    ("exit", "exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir { path: String },
    Cd { path: String },
    Ls { path: Option<String> },
    Pwd,
    Grep { path: String, pattern: String },
    Cat { path: String },
    Touch { path: String },
    Echo { path: String, text: String },
    Mv { source: String, destination: String },
    Cp { source: String, destination: String },
    Rm { path: String },
    Help,
    Exit,
}

impl Command {
    pub fn usage(name: &str) -> Option<&'static str> {
        USAGE
            .iter()
            .find(|(command, _)| *command == name)
            .map(|(_, usage)| *usage)
    }

    /// `echo <name> <text...>` and `echo <name> > <text...>` both append the joined text.
    fn echo_text(words: &[String]) -> String {
        let words = match words {
            [redirect, text @ ..] if redirect == REDIRECT => text,
            _ => words,
        };
        words.join(" ")
    }

    fn is_exit(name: &str) -> bool {
        name.eq_ignore_ascii_case("exit") || name.eq_ignore_ascii_case("quit")
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandParseError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let words = tokenize(line).context(TokenizeSnafu)?;
        let (name, arguments) = words.split_first().context(EmptySnafu)?;

        let command = match (name.as_str(), arguments) {
            ("pwd", []) => Command::Pwd,
            ("help", []) => Command::Help,
            (exit, []) if Self::is_exit(exit) => Command::Exit,
            ("ls", []) => Command::Ls { path: None },
            ("ls", [path]) => Command::Ls {
                path: Some(path.clone()),
            },
            ("mkdir", [path]) => Command::Mkdir { path: path.clone() },
            ("cd", [path]) => Command::Cd { path: path.clone() },
            ("cat", [path]) => Command::Cat { path: path.clone() },
            ("touch", [path]) => Command::Touch { path: path.clone() },
            ("rm", [path]) => Command::Rm { path: path.clone() },
            ("echo", [path, text @ ..]) => Command::Echo {
                path: path.clone(),
                text: Self::echo_text(text),
            },
            ("grep", [path, pattern]) => Command::Grep {
                path: path.clone(),
                pattern: pattern.clone(),
            },
            ("mv", [source, destination]) => Command::Mv {
                source: source.clone(),
                destination: destination.clone(),
            },
            ("cp", [source, destination]) => Command::Cp {
                source: source.clone(),
                destination: destination.clone(),
            },
            (other, _) => {
                return match Command::usage(other) {
                    Some(usage) => WrongArgumentsSnafu { usage }.fail(),
                    None => UnknownCommandSnafu { name: other }.fail(),
                };
            }
        };

        Ok(command)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum CommandParseError {
    #[snafu(display("Failed to split the command line: {}", source))]
    TokenizeError { source: TokenizeError },
    #[snafu(display("Empty command"))]
    Empty,
    #[snafu(display("Unknown command: {}", name))]
    UnknownCommand { name: String },
    #[snafu(display("Usage: {}", usage))]
    WrongArguments { usage: &'static str },
}
