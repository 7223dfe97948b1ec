//! Producers of raw module graph text.
//!
//! The forest builder only consumes an edge list; this module hides where it
//! comes from. [`GoModSource`] runs the Go toolchain inside a checkout and
//! [`TextSource`] serves text that is already at hand.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Errors that can occur while producing module graph text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The checkout has no `go.mod` at its root.
    #[error("go.mod not found at path: {0}")]
    MissingGoMod(PathBuf),

    /// The command could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Reading a file or stdin failed.
    #[error("failed to read module graph: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Anything that can hand over a `go mod graph` style edge list.
pub trait GraphSource {
    /// Returns the raw edge list text.
    fn mod_graph(&self) -> SourceResult<String>;
}

/// Runs `go mod tidy` and `go mod graph` in a module checkout.
#[derive(Debug, Clone)]
pub struct GoModSource {
    repo_path: PathBuf,
    tidy: bool,
}

impl GoModSource {
    /// Creates a source for the module rooted at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            tidy: true,
        }
    }

    /// Controls whether `go mod tidy` runs before the graph is dumped.
    pub fn with_tidy(mut self, tidy: bool) -> Self {
        self.tidy = tidy;
        self
    }

    /// Path of the module checkout.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Fails unless the checkout has a `go.mod` at its root.
    pub fn ensure_go_mod(&self) -> SourceResult<()> {
        let go_mod = self.repo_path.join("go.mod");
        if go_mod.is_file() {
            Ok(())
        } else {
            Err(SourceError::MissingGoMod(go_mod))
        }
    }

    /// Runs `go mod tidy` to settle the requirement set.
    pub fn run_tidy(&self) -> SourceResult<()> {
        self.run_go(&["mod", "tidy"]).map(|_| ())
    }

    /// Runs `go mod graph` and returns its stdout.
    pub fn run_graph(&self) -> SourceResult<String> {
        self.run_go(&["mod", "graph"])
    }

    fn run_go(&self, args: &[&str]) -> SourceResult<String> {
        let command = format!("go {}", args.join(" "));
        debug!(command = %command, dir = %self.repo_path.display(), "running go toolchain");

        let output = Command::new("go")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|source| SourceError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GraphSource for GoModSource {
    fn mod_graph(&self) -> SourceResult<String> {
        self.ensure_go_mod()?;
        if self.tidy {
            self.run_tidy()?;
        }
        self.run_graph()
    }
}

/// An edge list read from memory, a file, or stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Text already in memory
    Inline(String),
    /// A file to read
    File(PathBuf),
    /// Standard input
    Stdin,
}

impl TextSource {
    /// Maps a CLI path argument to a source; `None` and `-` mean stdin.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => TextSource::Stdin,
            Some(path) if path == Path::new("-") => TextSource::Stdin,
            Some(path) => TextSource::File(path.to_path_buf()),
        }
    }
}

impl GraphSource for TextSource {
    fn mod_graph(&self) -> SourceResult<String> {
        match self {
            TextSource::Inline(text) => Ok(text.clone()),
            TextSource::File(path) => {
                debug!(path = %path.display(), "reading module graph file");
                Ok(fs::read_to_string(path)?)
            }
            TextSource::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}
