use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

use crate::filesystem::NodeKind;

/// Separator between names printed by `ls`
const ENTRY_SEPARATOR: &str = "  ";

/// Formats command results onto a writer, optionally colored.
pub struct Output<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Self { writer, colored }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()
    }

    /// All entries on one line. Nothing is printed for an empty listing.
    pub fn entries(&mut self, entries: &[(String, NodeKind)]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let names = entries
            .iter()
            .map(|(name, kind)| match (self.colored, kind) {
                (true, NodeKind::Directory) => name.blue().bold().to_string(),
                _ => name.clone(),
            })
            .collect::<Vec<_>>();
        writeln!(self.writer, "{}", names.join(ENTRY_SEPARATOR))
    }

    pub fn lines<S: AsRef<str>>(&mut self, lines: &[S]) -> io::Result<()> {
        for line in lines {
            writeln!(self.writer, "{}", line.as_ref())?;
        }
        Ok(())
    }

    pub fn error(&mut self, error: &dyn Display) -> io::Result<()> {
        let message = format!("Error: {error}");
        if self.colored {
            writeln!(self.writer, "{}", message.red())
        } else {
            writeln!(self.writer, "{message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(output: Output<Vec<u8>>) -> String {
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn entries_share_one_line() {
        let mut output = Output::new(Vec::new(), false);
        output
            .entries(&[
                ("docs".to_string(), NodeKind::Directory),
                ("notes.txt".to_string(), NodeKind::File),
            ])
            .unwrap();
        assert_eq!(written(output), "docs  notes.txt\n");
    }

    #[test]
    fn empty_listing_prints_nothing() {
        let mut output = Output::new(Vec::new(), false);
        output.entries(&[]).unwrap();
        assert_eq!(written(output), "");
    }

    #[test]
    fn lines_are_newline_terminated() {
        let mut output = Output::new(Vec::new(), false);
        output.lines(&["alpha", "beta"]).unwrap();
        assert_eq!(written(output), "alpha\nbeta\n");
    }

    #[test]
    fn errors_are_prefixed() {
        let mut output = Output::new(Vec::new(), false);
        output.error(&"No such file or directory: x").unwrap();
        assert_eq!(written(output), "Error: No such file or directory: x\n");
    }

    #[test]
    fn colored_directories_are_wrapped_in_escape_codes() {
        colored::control::set_override(true);
        let mut output = Output::new(Vec::new(), true);
        output
            .entries(&[
                ("docs".to_string(), NodeKind::Directory),
                ("notes.txt".to_string(), NodeKind::File),
            ])
            .unwrap();

        let text = written(output);
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("docs"));
        assert!(text.ends_with("  notes.txt\n"));
    }
}
