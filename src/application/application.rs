use std::io::{self, IsTerminal, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{ConfigError, ShellConfig};
use crate::filesystem::FileSystem;
use crate::shell::{Output, Shell, ShellError};
use crate::snapshot::{Snapshot, SnapshotError};

pub struct Application;

impl Application {
    /// Loads settings and the optional snapshot, runs the shell on stdin/stdout
    /// and writes the snapshot back when asked to.
    pub async fn run(cli_args: Cli) -> Result<(), ApplicationError> {
        let shell_config = ShellConfig::read(cli_args.config.as_deref())
            .await
            .context(ConfigSnafu)?;
        let runtime_config = RuntimeConfig::new(cli_args, shell_config);
        debug!("Runtime config: {:?}", runtime_config);

        let stdin = io::stdin();
        if stdin.is_terminal() {
            let mut editor = DefaultEditor::new().context(EditorSnafu)?;
            Self::run_session(&runtime_config, io::stdout(), |shell, prompt| {
                shell.run_interactive(&mut editor, prompt)
            })
            .await
        } else {
            Self::run_session(&runtime_config, io::stdout(), |shell, prompt| {
                shell.run(stdin.lock(), prompt)
            })
            .await
        }
    }

    /// Loads the snapshot, hands the shell to `drive` and saves afterwards.
    ///
    /// The snapshot is written even when `drive` fails, so a broken terminal
    /// does not lose the session.
    pub async fn run_session<W, F>(
        runtime_config: &RuntimeConfig,
        output: W,
        drive: F,
    ) -> Result<(), ApplicationError>
    where
        W: Write,
        F: FnOnce(&mut Shell<W>, &str) -> Result<(), ShellError>,
    {
        let file_system = match &runtime_config.load {
            Some(path) => FileSystem::with_root(Snapshot::load(path).await.context(LoadSnafu)?),
            None => FileSystem::new(),
        };

        let colored = runtime_config.color.should_colorize();
        if colored {
            colored::control::set_override(true);
        }

        let mut shell = Shell::new(file_system, Output::new(output, colored));
        let outcome = drive(&mut shell, &runtime_config.prompt);

        if let Some(path) = &runtime_config.save {
            Snapshot::save(path, shell.file_system().root())
                .await
                .context(SaveSnafu)?;
        }

        outcome.context(ShellSnafu)?;
        info!("Session finished");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the configuration"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while loading the snapshot"))]
    LoadError { source: SnapshotError },
    #[snafu(display("Critical failure encountered while running the shell"))]
    ShellError { source: ShellError },
    #[snafu(display("Failed to save the snapshot"))]
    SaveError { source: SnapshotError },
    #[snafu(display("Critical failure encountered while opening the line editor"))]
    EditorError { source: ReadlineError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data::ColorChoice;
    use tempfile::TempDir;

    fn runtime_config(temp_dir: &TempDir, load: Option<&str>, save: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            prompt: String::new(),
            color: ColorChoice::Never,
            load: load.map(|name| temp_dir.path().join(name)),
            save: save.map(|name| temp_dir.path().join(name)),
        }
    }

    async fn run_script(
        config: &RuntimeConfig,
        script: &[u8],
        written: &mut Vec<u8>,
    ) -> Result<(), ApplicationError> {
        Application::run_session(config, written, |shell, prompt| shell.run(script, prompt)).await
    }

    async fn session(config: &RuntimeConfig, script: &str) -> String {
        let mut written = Vec::new();
        run_script(config, script.as_bytes(), &mut written)
            .await
            .unwrap();
        String::from_utf8(written).unwrap()
    }

    #[compio::test]
    async fn saved_state_is_restored_by_the_next_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let first = runtime_config(&temp_dir, None, Some("state.json"));
        session(&first, "mkdir docs\ncd docs\necho notes.txt hello\nexit\n").await;

        let second = runtime_config(&temp_dir, Some("state.json"), None);
        let output = session(&second, "pwd\nls\ncat docs/notes.txt\n").await;
        assert_eq!(output, "/\ndocs\nhello\n");
    }

    #[compio::test]
    async fn binary_snapshots_work_the_same_way() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let first = runtime_config(&temp_dir, None, Some("state.bin"));
        session(&first, "touch a\ntouch b\n").await;

        let second = runtime_config(&temp_dir, Some("state.bin"), None);
        assert_eq!(session(&second, "ls\n").await, "a  b\n");
    }

    #[compio::test]
    async fn missing_snapshot_fails_the_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = runtime_config(&temp_dir, Some("missing.json"), None);

        let result = run_script(&config, b"", &mut Vec::new()).await;
        assert!(matches!(result, Err(ApplicationError::LoadError { .. })));
    }

    #[compio::test]
    async fn invalid_utf8_input_still_saves_the_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let first = runtime_config(&temp_dir, None, Some("state.json"));
        run_script(
            &first,
            b"mkdir docs\necho f \xff\xfe\nmkdir more\nexit\n",
            &mut Vec::new(),
        )
        .await
        .unwrap();

        let second = runtime_config(&temp_dir, Some("state.json"), None);
        assert_eq!(session(&second, "ls\n").await, "docs  f  more\n");
    }

    #[compio::test]
    async fn failing_terminal_still_saves_the_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = runtime_config(&temp_dir, None, Some("state.json"));

        let result = Application::run_session(&config, Vec::new(), |shell, _| {
            shell.execute_line("mkdir kept")?;
            Err(ShellError::TerminalError {
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            })
        })
        .await;
        assert!(matches!(result, Err(ApplicationError::ShellError { .. })));

        let second = runtime_config(&temp_dir, Some("state.json"), None);
        assert_eq!(session(&second, "ls\n").await, "kept\n");
    }
}
