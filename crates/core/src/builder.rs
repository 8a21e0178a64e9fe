//! The seam between the generator and whatever turns an outline into a deck.

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

/// Builds a deck from an outline file.
///
/// Implementations receive the path of a UTF-8 outline file and are expected
/// to write exactly one deck file into the configured output directory. The
/// generator finds that file by scanning the directory afterwards.
pub trait DeckBuilder {
    /// Build a deck from the outline at `outline_path`.
    fn build(&self, outline_path: &Path) -> Result<()>;
}

impl<B: DeckBuilder + ?Sized> DeckBuilder for Box<B> {
    fn build(&self, outline_path: &Path) -> Result<()> {
        (**self).build(outline_path)
    }
}

impl<B: DeckBuilder + ?Sized> DeckBuilder for std::sync::Arc<B> {
    fn build(&self, outline_path: &Path) -> Result<()> {
        (**self).build(outline_path)
    }
}

/// Runs an external program as the deck builder.
///
/// The outline path is appended as the final argument. A non-zero exit is a
/// [`Error::BuilderError`] carrying the exit status and stderr.
#[derive(Debug, Clone)]
pub struct CommandDeckBuilder {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandDeckBuilder {
    /// Create a builder that runs `program`.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    /// Add an argument placed before the outline path.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add several arguments placed before the outline path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }
}

impl DeckBuilder for CommandDeckBuilder {
    fn build(&self, outline_path: &Path) -> Result<()> {
        let program = self.program.to_string_lossy();
        log::debug!("Running deck builder: {} {}", program, outline_path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(outline_path)
            .output()
            .map_err(|e| Error::BuilderError(format!("failed to run {}: {}", program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{} stdout: {}", program, stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::BuilderError(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_outline_path_is_last_argument() {
        let tmp = tempfile::TempDir::new().unwrap();
        let outline = tmp.path().join("deck.md");
        std::fs::write(&outline, "# T").unwrap();

        // With `sh -c`, the first trailing argument becomes $0.
        let builder = CommandDeckBuilder::new("sh").args(["-c", "test -s \"$0\""]);
        builder.build(&outline).unwrap();

        let missing = tmp.path().join("missing.md");
        assert!(builder.build(&missing).is_err());
    }

    #[test]
    fn test_failure_reports_stderr() {
        let builder = CommandDeckBuilder::new("sh")
            .arg("-c")
            .arg("echo 'no template found' >&2; exit 3");

        let err = builder.build(Path::new("outline.md")).unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, Error::BuilderError(_)));
        assert!(message.contains("no template found"), "{message}");
    }

    #[test]
    fn test_missing_program() {
        let builder = CommandDeckBuilder::new("/nonexistent/chatppt-builder");
        let err = builder.build(Path::new("outline.md")).unwrap_err();

        assert!(err.to_string().contains("failed to run"));
    }
}
