use std::io::{BufRead, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::filesystem::{FileSystem, FileSystemError};
use crate::shell::command::{Command, CommandParseError, USAGE};
use crate::shell::output::Output;

/// What the read loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The command interpreter: owns the filesystem it operates on and the output it writes to.
pub struct Shell<W: Write> {
    file_system: FileSystem,
    output: Output<W>,
}

impl<W: Write> Shell<W> {
    pub fn new(file_system: FileSystem, output: Output<W>) -> Self {
        Self {
            file_system,
            output,
        }
    }

    pub fn file_system(&self) -> &FileSystem {
        &self.file_system
    }

    pub fn into_inner(self) -> (FileSystem, W) {
        (self.file_system, self.output.into_inner())
    }

    /// Reads commands from `input` until `exit` or end of input.
    ///
    /// Bad commands and failed lookups are reported and the loop goes on;
    /// only a broken terminal stops it early. Bytes that are not UTF-8 are
    /// replaced rather than ending the session.
    pub fn run<R: BufRead>(&mut self, mut input: R, prompt: &str) -> Result<(), ShellError> {
        let mut buffer = Vec::new();

        loop {
            self.output.prompt(prompt).context(TerminalSnafu)?;
            buffer.clear();
            if input.read_until(b'\n', &mut buffer).context(TerminalSnafu)? == 0 {
                info!("End of input reached");
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buffer);
            if self.handle_line(line.trim_end_matches(['\n', '\r']))? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Reads commands through a line editor with history.
    ///
    /// Ctrl-C drops the current line, Ctrl-D ends the session like `exit`.
    pub fn run_interactive(
        &mut self,
        editor: &mut DefaultEditor,
        prompt: &str,
    ) -> Result<(), ShellError> {
        loop {
            let line = match editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    debug!("Line interrupted");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    info!("End of input reached");
                    return Ok(());
                }
                Err(error) => return Err(error).context(EditorSnafu),
            };

            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str()).context(EditorSnafu)?;
            }
            if self.handle_line(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Runs one line, writing any recoverable error to the output.
    fn handle_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        match self.execute_line(line) {
            Ok(flow) => Ok(flow),
            Err(ShellError::CommandError {
                source: CommandParseError::Empty,
            }) => Ok(Flow::Continue),
            Err(error @ (ShellError::TerminalError { .. } | ShellError::EditorError { .. })) => {
                Err(error)
            }
            Err(error) => {
                debug!("Command '{}' failed: {:?}", line, error);
                self.output.error(&error).context(TerminalSnafu)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let command = Command::try_from(line).context(CommandSnafu)?;
        debug!("Parsed command: {:?}", command);
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        let fs = &mut self.file_system;

        match command {
            Command::Mkdir { path } => fs.mkdir(&path).context(FileSystemSnafu)?,
            Command::Cd { path } => fs.cd(&path).context(FileSystemSnafu)?,
            Command::Ls { path } => {
                let entries = fs.ls(path.as_deref()).context(FileSystemSnafu)?;
                self.output.entries(&entries).context(TerminalSnafu)?;
            }
            Command::Pwd => {
                let current = fs.pwd().context(FileSystemSnafu)?;
                self.output
                    .lines(&[current.to_string()])
                    .context(TerminalSnafu)?;
            }
            Command::Grep { path, pattern } => {
                let matches = fs.grep(&path, &pattern).context(FileSystemSnafu)?;
                self.output.lines(&matches).context(TerminalSnafu)?;
            }
            Command::Cat { path } => {
                let lines = fs.cat(&path).context(FileSystemSnafu)?;
                self.output.lines(&lines).context(TerminalSnafu)?;
            }
            Command::Touch { path } => fs.touch(&path).context(FileSystemSnafu)?,
            Command::Echo { path, text } => fs.echo(&path, &text).context(FileSystemSnafu)?,
            Command::Mv {
                source,
                destination,
            } => {
                fs.mv(&source, &destination).context(FileSystemSnafu)?;
            }
            Command::Cp {
                source,
                destination,
            } => {
                fs.cp(&source, &destination).context(FileSystemSnafu)?;
            }
            Command::Rm { path } => fs.rm(&path).context(FileSystemSnafu)?,
            Command::Help => {
                let usages = USAGE.iter().map(|(_, usage)| *usage).collect::<Vec<_>>();
                self.output.lines(&usages).context(TerminalSnafu)?;
            }
            Command::Exit => return Ok(Flow::Exit),
        }

        Ok(Flow::Continue)
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("{}", source))]
    CommandError { source: CommandParseError },
    #[snafu(display("{}", source))]
    FileSystemError { source: FileSystemError },
    #[snafu(display("Failed to talk to the terminal"))]
    TerminalError { source: std::io::Error },
    #[snafu(display("Line editor failed"))]
    EditorError { source: ReadlineError },
}
